//! Provisioning
//!
//! Drives add-on create and delete workflows across the platform, the cloud
//! provider and the credential store, and runs them on a bounded in-process
//! queue consumed by a fixed pool of workers.

mod errors;
mod events;
mod orchestrator;
mod queue;

pub use errors::{ProvisioningError, QueueError, StoreError};
pub use events::CreateResourceEvent;
pub use orchestrator::*;
pub use queue::*;
