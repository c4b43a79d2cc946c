//! Tenant storage provisioning: credential store, cloud controller, platform
//! client and the workflows that tie them together.

pub mod cloud;
pub mod context;
pub mod crypto;
pub mod database;
pub mod domain;
pub mod ids;
pub mod platform;
pub mod provisioning;

#[cfg(test)]
mod test;
