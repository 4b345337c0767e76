//! Driver error types.

use thiserror::Error;

/// Driver errors.
///
/// A model reply that does not contain a tool call is not an error; drivers
/// hand such text back unchanged. Everything here surfaces to the caller
/// without retries.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a client or server error status.
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The driver was constructed with unusable options.
    #[error("config error: {0}")]
    Config(String),

    /// A tool path could not be turned into a request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// HTTP status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
