//! Provisioning errors.

use thiserror::Error;

use crate::{
    cloud::{CloudError, TeardownReport},
    domain::{accounts::AccountsServiceError, resources::ResourcesServiceError},
    ids::TenantId,
    platform::PlatformError,
};

/// Credential store failure seen by a workflow.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Accounts(#[from] AccountsServiceError),

    #[error(transparent)]
    Resources(#[from] ResourcesServiceError),
}

/// Workflow error variants.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The add-on grant could not be exchanged for a session.
    #[error("failed to exchange add-on grant")]
    AuthExchange(#[source] PlatformError),

    /// The owner of the add-on could not be resolved.
    #[error("failed to resolve add-on owner")]
    Lookup(#[source] PlatformError),

    /// The owning tenant has no registered cloud account.
    #[error("no cloud account registered for tenant {0}")]
    AccountNotFound(TenantId),

    /// Bucket, identity, key or policy creation failed.
    #[error("failed to provision cloud resources")]
    CloudProvisioning(#[source] CloudError),

    /// Config vars could not be pushed to the add-on.
    #[error("failed to push add-on config")]
    ConfigPush(#[source] PlatformError),

    /// Credential store read or write failed.
    #[error("credential store failure")]
    Persistence(#[from] StoreError),

    /// The outcome could not be reported to the platform.
    #[error("failed to report provisioning outcome: {0}")]
    Report(#[source] PlatformError),

    /// One or more teardown steps failed; the resource stays marked for deletion.
    #[error("teardown incomplete: {0:?}")]
    Teardown(TeardownReport),
}

/// Work queue error variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Every queue slot is taken.
    #[error("work queue is full")]
    Full,

    /// Workers have stopped accepting jobs.
    #[error("work queue is closed")]
    Closed,
}
