use thiserror::Error;

use super::ErrorCode;

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unrecognized command")]
    Unrecognized,
    #[error("`{command}` expects {expected} fields, found {found}")]
    Malformed {
        command: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("unparsable timestamp `{0}`")]
    UnparsableTimestamp(String),
    #[error("unparsable value `{0}`")]
    UnparsableValue(String),
    #[error("invalid number of records `{0}`")]
    InvalidNumRecords(String),
}

impl CommandError {
    /// The code reported back to the client, if this error is visible to it at all
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::InvalidNumRecords(_) => Some(ErrorCode::InvalidNumRecords),
            _ => None,
        }
    }
}
