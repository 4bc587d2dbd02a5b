use thiserror::Error;

/// Errors from Daraja API calls.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Consumer key or secret was not configured.
    #[error("DARAJA_CONSUMER_KEY and DARAJA_CONSUMER_SECRET must be set")]
    MissingCredentials,

    /// The OAuth endpoint refused the credentials or returned no token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The sandbox returned a non-success status.
    #[error("provider rejected request ({status}): {body}")]
    Api { status: u16, body: String },

    /// The sandbox response could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

pub type Result<T> = std::result::Result<T, Error>;
