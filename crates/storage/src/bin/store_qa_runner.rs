use std::collections::HashSet;
use std::env;
use std::sync::Arc;

use snafu::{OptionExt, ResultExt, Snafu};

use mockchat_core::{ManualClock, SystemClock};
use mockchat_store::{
    ChatMessageStore, ImportRecord, MessageId, MessagePatch, NewMessage, Side, StoreError,
};

#[derive(Debug, Clone)]
struct RunnerArgs {
    scenario: Scenario,
    count: usize,
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    IdRoundtrip,
    IdInvalid,
    AppendUnique,
    EditDeleteOrder,
    ClearIdempotent,
    ImportReassign,
    ImportReject,
    All,
}

impl Scenario {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id_roundtrip" => Some(Self::IdRoundtrip),
            "id_invalid" => Some(Self::IdInvalid),
            "append_unique" => Some(Self::AppendUnique),
            "edit_delete_order" => Some(Self::EditDeleteOrder),
            "clear_idempotent" => Some(Self::ClearIdempotent),
            "import_reassign" => Some(Self::ImportReassign),
            "import_reject" => Some(Self::ImportReject),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::IdRoundtrip => "id_roundtrip",
            Self::IdInvalid => "id_invalid",
            Self::AppendUnique => "append_unique",
            Self::EditDeleteOrder => "edit_delete_order",
            Self::ClearIdempotent => "clear_idempotent",
            Self::ImportReassign => "import_reassign",
            Self::ImportReject => "import_reject",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Snafu)]
enum RunnerError {
    #[snafu(display("missing required --scenario argument"))]
    MissingScenario { stage: &'static str },
    #[snafu(display("missing value for argument '{arg}'"))]
    MissingArgumentValue {
        stage: &'static str,
        arg: &'static str,
    },
    #[snafu(display("unknown scenario '{raw}'"))]
    UnknownScenario { stage: &'static str, raw: String },
    #[snafu(display("unknown argument '{raw}'"))]
    UnknownArgument { stage: &'static str, raw: String },
    #[snafu(display("invalid --count value '{raw}'"))]
    InvalidCount {
        stage: &'static str,
        raw: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display("store validation failed: {source}"))]
    StoreValidation {
        stage: &'static str,
        source: StoreError,
    },
    #[snafu(display("scenario '{scenario}' failed: {reason}"))]
    ScenarioFailed {
        stage: &'static str,
        scenario: &'static str,
        reason: String,
    },
}

type RunnerResult<T> = Result<T, RunnerError>;

const DEFAULT_COUNT: usize = 500;

fn main() {
    if let Err(error) = run() {
        println!("runner_ok=false");
        eprintln!("runner_error={error}");
        std::process::exit(1);
    }
}

fn run() -> RunnerResult<()> {
    let args = parse_args(env::args().skip(1))?;
    println!("scenario={}", args.scenario.name());
    println!("count={}", args.count);

    match args.scenario {
        Scenario::IdRoundtrip => run_id_roundtrip(),
        Scenario::IdInvalid => run_id_invalid(),
        Scenario::AppendUnique => run_append_unique(args.count),
        Scenario::EditDeleteOrder => run_edit_delete_order(args.count),
        Scenario::ClearIdempotent => run_clear_idempotent(),
        Scenario::ImportReassign => run_import_reassign(args.count),
        Scenario::ImportReject => run_import_reject(),
        Scenario::All => run_all(args.count),
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> RunnerResult<RunnerArgs> {
    let mut scenario = None;
    let mut count = DEFAULT_COUNT;
    let mut pending = args.into_iter();

    while let Some(argument) = pending.next() {
        match argument.as_str() {
            "--scenario" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-scenario-value",
                    arg: "--scenario",
                })?;

                let parsed = Scenario::parse(&value).context(UnknownScenarioSnafu {
                    stage: "parse-args-scenario",
                    raw: value,
                })?;
                scenario = Some(parsed);
            }
            "--count" => {
                let value = pending.next().context(MissingArgumentValueSnafu {
                    stage: "parse-args-count-value",
                    arg: "--count",
                })?;
                count = value.parse().context(InvalidCountSnafu {
                    stage: "parse-args-count",
                    raw: value.clone(),
                })?;
            }
            _ => {
                return UnknownArgumentSnafu {
                    stage: "parse-args",
                    raw: argument,
                }
                .fail();
            }
        }
    }

    Ok(RunnerArgs {
        scenario: scenario.context(MissingScenarioSnafu {
            stage: "parse-args-scenario-required",
        })?,
        count,
    })
}

fn run_id_roundtrip() -> RunnerResult<()> {
    for raw in ["1700000000000", "imported_1700000000000_3", "custom-id"] {
        let parsed = MessageId::parse(raw).context(StoreValidationSnafu {
            stage: "scenario-id-roundtrip-parse",
        })?;
        if parsed.to_string() != raw {
            return ScenarioFailedSnafu {
                stage: "scenario-id-roundtrip-assert",
                scenario: "id_roundtrip",
                reason: format!("id '{raw}' rendered as '{parsed}'"),
            }
            .fail();
        }
    }

    println!("id_roundtrip=true");
    println!("runner_ok=true");
    Ok(())
}

fn run_id_invalid() -> RunnerResult<()> {
    let invalid_id_error = ["", "   ", "\t"]
        .iter()
        .all(|raw| MessageId::parse(raw).is_err());

    println!("invalid_id_error={invalid_id_error}");
    if !invalid_id_error {
        return ScenarioFailedSnafu {
            stage: "scenario-id-invalid",
            scenario: "id_invalid",
            reason: "a blank id was accepted".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_append_unique(count: usize) -> RunnerResult<()> {
    // A frozen clock forces every id after the first through the bump path.
    let mut store = ChatMessageStore::new(Arc::new(ManualClock::from_millis(1_700_000_000_000)));
    for index in 0..count {
        store.append(alternating_message(index));
    }

    let unique_ids = store
        .messages()
        .iter()
        .map(|message| message.id.clone())
        .collect::<HashSet<_>>();
    let append_unique = unique_ids.len() == store.len();
    println!("append_unique={append_unique}");
    if !append_unique {
        return ScenarioFailedSnafu {
            stage: "scenario-append-unique-assert",
            scenario: "append_unique",
            reason: format!("{} ids for {} messages", unique_ids.len(), store.len()),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_edit_delete_order(count: usize) -> RunnerResult<()> {
    let mut store = ChatMessageStore::new(SystemClock::shared());
    for index in 0..count.max(3) {
        store.append(alternating_message(index));
    }

    let ids = store
        .messages()
        .iter()
        .map(|message| message.id.clone())
        .collect::<Vec<_>>();
    for id in ids.iter().step_by(2) {
        store.edit_by_id(
            id,
            MessagePatch {
                text: Some(format!("edited {id}")),
                ..MessagePatch::default()
            },
        );
    }
    for id in ids.iter().skip(1).step_by(3) {
        store.delete_by_id(id);
    }

    let survivors = store
        .messages()
        .iter()
        .map(|message| message.id.clone())
        .collect::<Vec<_>>();
    let expected = ids
        .iter()
        .filter(|id| survivors.contains(id))
        .cloned()
        .collect::<Vec<_>>();
    let order_preserved = survivors == expected;
    println!("order_preserved={order_preserved}");
    println!("survivors={}", survivors.len());
    if !order_preserved {
        return ScenarioFailedSnafu {
            stage: "scenario-edit-delete-order-assert",
            scenario: "edit_delete_order",
            reason: "surviving messages changed relative order".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_clear_idempotent() -> RunnerResult<()> {
    let mut store = ChatMessageStore::new(SystemClock::shared());
    store.append(alternating_message(0));
    store.clear();
    let first_empty = store.is_empty();
    store.clear();
    let second_empty = store.is_empty();

    println!("clear_idempotent={}", first_empty && second_empty);
    if !(first_empty && second_empty) {
        return ScenarioFailedSnafu {
            stage: "scenario-clear-idempotent-assert",
            scenario: "clear_idempotent",
            reason: "list not empty after clear".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_import_reassign(count: usize) -> RunnerResult<()> {
    let mut store = ChatMessageStore::new(SystemClock::shared());
    let records = (0..count.max(2))
        .map(|index| ImportRecord {
            // Every third record has no id, every other one shares the same id.
            id: match index % 3 {
                0 => None,
                1 => Some("shared".to_string()),
                _ => Some(format!("fixture-{index}")),
            },
            text: Some(format!("imported {index}")),
            is_received: Some(index % 2 == 0),
            time: Some("12:00".to_string()),
            ..ImportRecord::default()
        })
        .collect::<Vec<_>>();

    let report = store
        .import_replace(records)
        .context(StoreValidationSnafu {
            stage: "scenario-import-reassign-import",
        })?;
    let unique_ids = store
        .messages()
        .iter()
        .map(|message| message.id.clone())
        .collect::<HashSet<_>>();

    println!("imported={}", report.imported);
    println!("reassigned_ids={}", report.reassigned_ids);
    if unique_ids.len() != store.len() {
        return ScenarioFailedSnafu {
            stage: "scenario-import-reassign-assert",
            scenario: "import_reassign",
            reason: "import produced duplicate ids".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_import_reject() -> RunnerResult<()> {
    let mut store = ChatMessageStore::new(SystemClock::shared());
    store.append(alternating_message(0));
    let before = store.messages().to_vec();

    let result = store.import_replace(vec![ImportRecord {
        id: Some("1".to_string()),
        ..ImportRecord::default()
    }]);
    let rejected = matches!(result, Err(StoreError::ImportRejected { .. }));
    let untouched = store.messages() == before.as_slice();

    println!("import_rejected={rejected}");
    println!("store_untouched={untouched}");
    if !(rejected && untouched) {
        return ScenarioFailedSnafu {
            stage: "scenario-import-reject-assert",
            scenario: "import_reject",
            reason: "malformed import was applied".to_string(),
        }
        .fail();
    }

    println!("runner_ok=true");
    Ok(())
}

fn run_all(count: usize) -> RunnerResult<()> {
    run_id_roundtrip()?;
    run_id_invalid()?;
    run_append_unique(count)?;
    run_edit_delete_order(count)?;
    run_clear_idempotent()?;
    run_import_reassign(count)?;
    run_import_reject()?;

    println!("all_passed=true");
    Ok(())
}

fn alternating_message(index: usize) -> NewMessage {
    let side = if index % 2 == 0 {
        Side::Sender
    } else {
        Side::Receiver
    };
    NewMessage::text(side, format!("fixture message {index}"), "9:41 AM")
}
