//! Bucket lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    cloud::{
        AccessKey, CloudApi, CloudConnector, CloudCredentials, CloudError, RetryPolicy,
        policy::PolicyDocument,
    },
    ids::ProviderResourceId,
};

/// Everything created for one provider resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedBucket {
    pub bucket_name: String,
    pub user_name: String,
    pub user_arn: String,
    pub access_key: AccessKey,
}

/// Outcome of each teardown step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub objects_purged: bool,
    pub bucket_deleted: bool,
    pub access_key_deleted: bool,
    pub user_deleted: bool,
}

impl TeardownReport {
    /// Whether every step completed.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.objects_purged && self.bucket_deleted && self.access_key_deleted && self.user_deleted
    }
}

#[automock]
#[async_trait]
/// Creates and destroys the cloud resources behind a provider resource id.
pub trait ResourceController: Send + Sync {
    /// Creates the bucket, its scoped identity and access key, then attaches
    /// a policy granting that identity access to the bucket.
    async fn create(
        &self,
        credentials: &CloudCredentials,
        resource: &ProviderResourceId,
    ) -> Result<ProvisionedBucket, CloudError>;

    /// Removes everything [`ResourceController::create`] made. Every step is
    /// attempted regardless of earlier failures.
    async fn destroy(
        &self,
        credentials: &CloudCredentials,
        resource: &ProviderResourceId,
        access_key_id: &str,
    ) -> TeardownReport;
}

#[derive(Clone)]
pub struct BucketController {
    connector: Arc<dyn CloudConnector>,
    retry: RetryPolicy,
}

impl BucketController {
    #[must_use]
    pub fn new(connector: Arc<dyn CloudConnector>) -> Self {
        Self {
            connector,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

async fn purge_objects(api: &dyn CloudApi, bucket: &str) -> Result<usize, CloudError> {
    let mut purged = 0;

    loop {
        let keys = api.list_objects(bucket).await?;

        if keys.is_empty() {
            return Ok(purged);
        }

        purged += keys.len();

        api.delete_objects(bucket, keys).await?;
    }
}

#[async_trait]
impl ResourceController for BucketController {
    async fn create(
        &self,
        credentials: &CloudCredentials,
        resource: &ProviderResourceId,
    ) -> Result<ProvisionedBucket, CloudError> {
        let api = self.connector.connect(credentials)?;

        let bucket_name = resource.bucket_name();
        let user_name = resource.user_name();

        api.create_bucket(&bucket_name).await?;

        info!(bucket = %bucket_name, "created bucket");

        let user_arn = api.create_user(&user_name).await?;

        info!(user = %user_name, arn = %user_arn, "created user");

        let access_key = api.create_access_key(&user_name).await?;

        info!(user = %user_name, access_key_id = %access_key.access_key_id, "created access key");

        let policy = PolicyDocument::bucket_access(resource, &bucket_name, &user_arn).to_json()?;

        self.retry
            .run("put_bucket_policy", || {
                api.put_bucket_policy(&bucket_name, &policy)
            })
            .await?;

        info!(bucket = %bucket_name, "attached bucket policy");

        Ok(ProvisionedBucket {
            bucket_name,
            user_name,
            user_arn,
            access_key,
        })
    }

    async fn destroy(
        &self,
        credentials: &CloudCredentials,
        resource: &ProviderResourceId,
        access_key_id: &str,
    ) -> TeardownReport {
        let mut report = TeardownReport::default();

        let api = match self.connector.connect(credentials) {
            Ok(api) => api,
            Err(error) => {
                warn!(provider_resource_id = %resource, "cannot connect for teardown: {error}");

                return report;
            }
        };

        let bucket_name = resource.bucket_name();
        let user_name = resource.user_name();

        match purge_objects(api.as_ref(), &bucket_name).await {
            Ok(purged) => {
                report.objects_purged = true;
                info!(bucket = %bucket_name, purged, "purged bucket objects");
            }
            Err(error) => warn!(bucket = %bucket_name, "failed to purge objects: {error}"),
        }

        match api.delete_bucket(&bucket_name).await {
            Ok(()) => {
                report.bucket_deleted = true;
                info!(bucket = %bucket_name, "deleted bucket");
            }
            Err(error) => warn!(bucket = %bucket_name, "failed to delete bucket: {error}"),
        }

        match api.delete_access_key(&user_name, access_key_id).await {
            Ok(()) => {
                report.access_key_deleted = true;
                info!(user = %user_name, access_key_id, "deleted access key");
            }
            Err(error) => warn!(user = %user_name, "failed to delete access key: {error}"),
        }

        match api.delete_user(&user_name).await {
            Ok(()) => {
                report.user_deleted = true;
                info!(user = %user_name, "deleted user");
            }
            Err(error) => warn!(user = %user_name, "failed to delete user: {error}"),
        }

        report
    }
}
