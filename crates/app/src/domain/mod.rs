//! Coffer Domain Concerns

pub mod accounts;
pub mod resources;
