//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::{debug, error};

/// Map errors to HTTP status errors, logging the cause.
pub(crate) trait ResultExt<T> {
    /// Logged internal server error.
    fn or_500(self, context: &str) -> Result<T, StatusError>;

    /// Not found, with `brief` shown to the caller.
    fn or_404(self, brief: &str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            error!("{context}: {error}");

            StatusError::internal_server_error()
        })
    }

    fn or_404(self, brief: &str) -> Result<T, StatusError> {
        self.map_err(|error| {
            debug!("{brief}: {error}");

            StatusError::not_found().brief(brief)
        })
    }
}
