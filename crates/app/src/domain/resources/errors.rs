//! Resources service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::crypto::CipherError;

/// Resource service error variants.
#[derive(Debug, Error)]
pub enum ResourcesServiceError {
    /// Resource already exists.
    #[error("resource already exists")]
    AlreadyExists,

    /// Resource was not found.
    #[error("resource not found")]
    NotFound,

    /// Owning account does not exist.
    #[error("owning account not found")]
    InvalidReference,

    /// Required data was missing.
    #[error("missing required data")]
    MissingRequiredData,

    /// Provided data failed validation.
    #[error("invalid data")]
    InvalidData,

    /// Owner secret could not be recovered.
    #[error("owner secret access key is not recoverable")]
    Cipher(#[from] CipherError),

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ResourcesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
