use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("stdio error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
