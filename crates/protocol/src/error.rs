//! Request parsing errors.

use crate::message::RequestId;
use thiserror::Error;

/// Why an input line could not become a [`Request`](crate::Request).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid JSON")]
    InvalidJson,

    #[error("request must be a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("id must be a string or integer")]
    InvalidId,

    #[error("tool must be a string")]
    ToolNotString,

    #[error("args must be a JSON object")]
    ArgsNotObject,

    #[error("line exceeds {max} bytes")]
    LineTooLong { max: usize },
}

/// A line that failed to parse.
///
/// `id` is set when the line was a JSON object carrying a usable id, so the
/// caller can still answer with a correlated failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct RejectedLine {
    pub id: Option<RequestId>,
    pub error: ParseError,
}

impl RejectedLine {
    pub fn anonymous(error: ParseError) -> Self {
        Self { id: None, error }
    }

    pub fn with_id(id: RequestId, error: ParseError) -> Self {
        Self {
            id: Some(id),
            error,
        }
    }
}

impl From<ParseError> for RejectedLine {
    fn from(error: ParseError) -> Self {
        Self::anonymous(error)
    }
}

pub type Result<T> = std::result::Result<T, RejectedLine>;
