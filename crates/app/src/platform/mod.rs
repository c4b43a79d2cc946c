//! Marketplace platform client
//!
//! Exchanges add-on OAuth grants for API sessions and uses a session to
//! resolve an add-on's owner, push its config vars and report the outcome of
//! provisioning.

mod client;
mod errors;
mod models;

pub use client::*;
pub use errors::PlatformError;
pub use models::*;
