//! Resources
//!
//! Per add-on bucket and identity records and their deletion lifecycle.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ResourcesServiceError;
pub use service::*;
