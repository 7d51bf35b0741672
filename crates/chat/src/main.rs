use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use snafu::{ResultExt, Snafu};

use mockchat::chat::layout::{BubbleBody, BubbleCorner, BubbleLayout, ImageDisplay, TextLayout};
use mockchat::chat::{
    ChatSession, Notice, Session, SessionError, TransferError, parse_import, plan_bubbles,
    write_export,
};
use mockchat::settings::SettingsStore;
use mockchat::theme::ThemeTokens;
use mockchat_core::SystemClock;
use mockchat_names::{NameGenerator, StaticNameSource};
use mockchat_store::{ChatMessageStore, ImageSize, Message, Side, StoreError};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compose and inspect fake chat conversations",
    long_about = None
)]
struct Cli {
    /// Settings file to read instead of the per-user config file
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a chat export and print how each bubble would render
    Preview {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Write a demo conversation as a chat export
    ExportSample {
        #[arg(required = true)]
        dir: PathBuf,
        /// Contact name to put in the export instead of the profile's
        #[arg(long)]
        contact: Option<String>,
    },
    /// Suggest contact names
    SuggestName {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("failed to read {path:?} on `{stage}`: {source}"))]
    ReadImport {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{source}"))]
    Transfer {
        stage: &'static str,
        source: TransferError,
    },
    #[snafu(display("{source}"))]
    Store {
        stage: &'static str,
        source: StoreError,
    },
    #[snafu(display("{}", Notice::from(source)))]
    Session {
        stage: &'static str,
        source: SessionError,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = match cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::load(),
    };

    let result = match cli.command {
        Commands::Preview { file } => preview(&file, &settings),
        Commands::ExportSample { dir, contact } => export_sample(&dir, contact, settings),
        Commands::SuggestName { count } => {
            suggest_names(count).await;
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "command failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn preview(file: &Path, settings: &SettingsStore) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(file).context(ReadImportSnafu {
        stage: "preview-read-file",
        path: file.to_path_buf(),
    })?;
    let import = parse_import(&raw).context(TransferSnafu {
        stage: "preview-parse-import",
    })?;

    // Preview never writes the profile, so it works on a bare store.
    let mut store = ChatMessageStore::new(SystemClock::shared());
    let report = store.import_replace(import.records).context(StoreSnafu {
        stage: "preview-import-replace",
    })?;

    let profile = settings.settings();
    let tokens = profile.theme_mode.tokens();
    let contact = import.contact_name.as_deref().unwrap_or(&profile.contact_name);
    println!(
        "{contact} ({} messages, {} theme, background {})",
        report.imported, profile.theme_mode, tokens.chat_background
    );
    for skip in &report.skipped {
        println!("  skipped record {}: {}", skip.index, skip.reason);
    }

    let plan = plan_bubbles(store.messages(), &profile.layout);
    for (message, bubble) in store.messages().iter().zip(&plan) {
        println!("{}", describe_bubble(message, bubble, tokens));
    }
    Ok(())
}

fn describe_bubble(message: &Message, bubble: &BubbleLayout, tokens: &ThemeTokens) -> String {
    let side = match bubble.side {
        Side::Sender => "sent    ",
        Side::Receiver => "received",
    };
    let corner = match bubble.corner {
        BubbleCorner::Tail(_) => "tail",
        BubbleCorner::Flattened => "flat",
    };
    let body = match bubble.body {
        BubbleBody::Text(TextLayout::Inline) => format!("{:?} {}", message.text, message.time),
        BubbleBody::Text(TextLayout::Stacked) => {
            format!("{:?} / {}", message.text, message.time)
        }
        BubbleBody::Image(image) => {
            let dims = match image.display {
                ImageDisplay::Fixed(dims) => format!("{}x{}", dims.width, dims.height),
                ImageDisplay::Native(dims) => format!("fit {}x{}", dims.width, dims.height),
            };
            let caption = if image.show_caption {
                format!(" {:?}", message.text)
            } else {
                String::new()
            };
            format!(
                "[image {dims} {}]{caption} {}",
                message.image_uri().unwrap_or_default(),
                message.time
            )
        }
    };
    format!(
        "{side} {corner} {}/{} top={:?} bottom={:?} {body}",
        tokens.bubble(message.is_received),
        tokens.bubble_text(message.is_received),
        bubble.margin_top,
        bubble.margin_bottom
    )
}

fn export_sample(
    dir: &Path,
    contact: Option<String>,
    settings: SettingsStore,
) -> Result<(), CliError> {
    let mut session = Session::new(settings, SystemClock::shared());
    seed_sample(&mut session).context(SessionSnafu {
        stage: "export-sample-seed",
    })?;

    let mut export = session.export_document();
    if let Some(contact) = contact
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
    {
        export.contact_name = contact;
    }
    let path = write_export(&export, dir).context(TransferSnafu {
        stage: "export-sample-write",
    })?;
    println!("{}", path.display());
    Ok(())
}

fn seed_sample(session: &mut impl ChatSession) -> Result<(), SessionError> {
    let lines = [
        (Side::Receiver, "hey, are we still on for tonight?"),
        (Side::Sender, "yes!"),
        (Side::Sender, "7 at the usual place?"),
        (Side::Receiver, "perfect"),
    ];
    for (side, text) in lines {
        session.arm(side);
        session.update_draft(text);
        session.send_text(None)?;
    }

    session.arm(Side::Sender);
    session.stage_image("https://picsum.photos/seed/mockchat/600/800")?;
    session.confirm_image(ImageSize::Portrait)?;
    session.arm(Side::Sender);
    session.update_draft("see you there");
    session.send_text(None)?;
    Ok(())
}

async fn suggest_names(count: usize) {
    let generator =
        NameGenerator::new(Arc::new(StaticNameSource::default()), SystemClock::shared());
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        if let Some(name) = generator.pick(&mut rng).await {
            println!("{name}");
        }
    }
}
