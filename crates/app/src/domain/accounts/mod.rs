//! Accounts
//!
//! Tenant cloud credentials, with the secret access key sealed at rest.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::AccountsServiceError;
pub use service::*;
