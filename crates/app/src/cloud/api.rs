//! Cloud provider primitives.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::{cloud::CloudError, crypto::SecretString};

/// Long-lived credentials owned by a tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

/// Access key minted for a scoped identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessKey {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

#[automock]
#[async_trait]
/// Provider calls made on behalf of one tenant.
pub trait CloudApi: Send + Sync {
    async fn create_bucket(&self, bucket: &str) -> Result<(), CloudError>;

    /// Creates an identity and returns its ARN.
    async fn create_user(&self, user: &str) -> Result<String, CloudError>;

    async fn create_access_key(&self, user: &str) -> Result<AccessKey, CloudError>;

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError>;

    /// Lists one page of object keys.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, CloudError>;

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<(), CloudError>;

    async fn delete_bucket(&self, bucket: &str) -> Result<(), CloudError>;

    async fn delete_access_key(&self, user: &str, access_key_id: &str) -> Result<(), CloudError>;

    async fn delete_user(&self, user: &str) -> Result<(), CloudError>;
}

#[automock]
/// Opens a [`CloudApi`] session with a tenant's credentials.
pub trait CloudConnector: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when a client cannot be built for `credentials`.
    fn connect(&self, credentials: &CloudCredentials) -> Result<Arc<dyn CloudApi>, CloudError>;
}
