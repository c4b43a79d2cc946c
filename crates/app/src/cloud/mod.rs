//! Cloud resources
//!
//! Creates and tears down one bucket, scoped identity, access key and bucket
//! policy per provider resource id, using the tenant's own cloud credentials.

mod api;
pub mod aws;
mod controller;
mod errors;
pub mod policy;
mod retry;

pub use api::*;
pub use controller::*;
pub use errors::CloudError;
pub use retry::RetryPolicy;
