//! Accounts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::crypto::CipherError;

/// Account service error variants.
#[derive(Debug, Error)]
pub enum AccountsServiceError {
    /// Account already exists.
    #[error("account already exists")]
    AlreadyExists,

    /// Account was not found.
    #[error("account not found")]
    NotFound,

    /// Account is still referenced by provisioned resources.
    #[error("account is still referenced by resources")]
    InvalidReference,

    /// Required data was missing.
    #[error("missing required data")]
    MissingRequiredData,

    /// Provided data failed validation.
    #[error("invalid data")]
    InvalidData,

    /// Stored secret could not be sealed or recovered.
    #[error("secret access key is not recoverable")]
    Cipher(#[from] CipherError),

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AccountsServiceError {
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
