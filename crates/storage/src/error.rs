use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("message id '{raw}' is invalid: {reason}"))]
    InvalidId {
        stage: &'static str,
        raw: String,
        reason: &'static str,
    },
    #[snafu(display("import rejected: the payload contains no messages"))]
    EmptyImport { stage: &'static str },
    #[snafu(display(
        "import rejected: none of the {total} records carried text, isReceived and time"
    ))]
    ImportRejected {
        stage: &'static str,
        total: usize,
        skipped: usize,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
