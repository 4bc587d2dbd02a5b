use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// Provider failure; the message is passed through untouched.
    #[error("{0}")]
    Provider(String),
}

impl From<daraja::Error> for ToolError {
    fn from(e: daraja::Error) -> Self {
        Self::Provider(e.to_string())
    }
}

/// Errors surfaced by the dispatcher for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
}
