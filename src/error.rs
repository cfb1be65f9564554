use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    #[diagnostic(code(ledger::invalid_amount))]
    InvalidAmount(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(ledger::invalid_input))]
    InvalidInput(String),

    #[error("Member not found: {0}")]
    #[diagnostic(
        code(ledger::member_not_found),
        help("enroll the member first with `contrib-ledger member add`")
    )]
    MemberNotFound(String),

    #[error("No group configured")]
    #[diagnostic(
        code(ledger::group_not_found),
        help("run `contrib-ledger init` to bootstrap the group")
    )]
    GroupNotFound,

    #[error("No outstanding periods for member {0}")]
    #[diagnostic(code(ledger::no_outstanding_periods))]
    NoOutstandingPeriods(String),

    #[error("Concurrent write conflict for member {member} in {period}")]
    #[diagnostic(code(ledger::conflict), help("retry the operation"))]
    ConcurrencyConflict { member: String, period: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ledger::config))]
    Config(String),

    #[error("CSV error: {0}")]
    #[diagnostic(code(ledger::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(ledger::io))]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(ledger::internal))]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        LedgerError::Internal(Box::new(err))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Internal(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
