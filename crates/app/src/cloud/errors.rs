//! Cloud errors.

use std::fmt::Display;

use thiserror::Error;

/// Cloud provider error variants.
#[derive(Debug, Error)]
pub enum CloudError {
    /// A bucket with the derived name already exists.
    #[error("bucket name {0} is already taken")]
    NameCollision(String),

    /// A provider call was rejected or could not be sent.
    #[error("{operation} failed: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    /// Provider replied without a field the call must return.
    #[error("unexpected response from {operation}: missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// Bucket policy could not be serialized.
    #[error("failed to encode bucket policy")]
    Policy(#[from] serde_json::Error),
}

impl CloudError {
    pub fn request(operation: &'static str, error: impl Display) -> Self {
        Self::Request {
            operation,
            message: error.to_string(),
        }
    }
}
