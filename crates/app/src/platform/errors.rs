//! Platform errors.

use thiserror::Error;

/// Errors that can occur when communicating with the platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-2xx response.
    #[error("unexpected response from platform: {0}")]
    UnexpectedResponse(String),
}
