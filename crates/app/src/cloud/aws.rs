//! AWS implementation of the cloud primitives (S3 buckets, IAM identities).

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_iam as iam;
use aws_sdk_s3::{
    self as s3,
    error::DisplayErrorContext,
    types::{BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier},
};
use tracing::debug;

use crate::cloud::{AccessKey, CloudApi, CloudConnector, CloudCredentials, CloudError};

/// Region where buckets are created without a location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

const CREDENTIALS_PROVIDER: &str = "coffer-tenant";

/// Builds S3 and IAM clients from a tenant's static credentials.
#[derive(Debug, Clone)]
pub struct AwsConnector {
    region: String,
}

impl AwsConnector {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

impl Default for AwsConnector {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl CloudConnector for AwsConnector {
    fn connect(&self, credentials: &CloudCredentials) -> Result<Arc<dyn CloudApi>, CloudError> {
        let s3_config = s3::Config::builder()
            .behavior_version(s3::config::BehaviorVersion::latest())
            .region(s3::config::Region::new(self.region.clone()))
            .credentials_provider(s3::config::Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.expose().to_owned(),
                None,
                None,
                CREDENTIALS_PROVIDER,
            ))
            .build();

        let iam_config = iam::Config::builder()
            .behavior_version(iam::config::BehaviorVersion::latest())
            .region(iam::config::Region::new(self.region.clone()))
            .credentials_provider(iam::config::Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.expose().to_owned(),
                None,
                None,
                CREDENTIALS_PROVIDER,
            ))
            .build();

        Ok(Arc::new(AwsCloudApi {
            region: self.region.clone(),
            s3: s3::Client::from_conf(s3_config),
            iam: iam::Client::from_conf(iam_config),
        }))
    }
}

/// S3 and IAM clients for one tenant.
#[derive(Debug, Clone)]
pub struct AwsCloudApi {
    region: String,
    s3: s3::Client,
    iam: iam::Client,
}

#[async_trait]
impl CloudApi for AwsCloudApi {
    async fn create_bucket(&self, bucket: &str) -> Result<(), CloudError> {
        let mut request = self.s3.create_bucket().bucket(bucket);

        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request.send().await.map_err(|error| {
            let collision = error.as_service_error().is_some_and(|service| {
                service.is_bucket_already_exists() || service.is_bucket_already_owned_by_you()
            });

            if collision {
                CloudError::NameCollision(bucket.to_owned())
            } else {
                CloudError::request("create_bucket", DisplayErrorContext(&error))
            }
        })?;

        Ok(())
    }

    async fn create_user(&self, user: &str) -> Result<String, CloudError> {
        let output = self
            .iam
            .create_user()
            .user_name(user)
            .send()
            .await
            .map_err(|error| CloudError::request("create_user", DisplayErrorContext(&error)))?;

        let created = output.user().ok_or(CloudError::MissingField {
            operation: "create_user",
            field: "user",
        })?;

        Ok(created.arn().to_owned())
    }

    async fn create_access_key(&self, user: &str) -> Result<AccessKey, CloudError> {
        let output = self
            .iam
            .create_access_key()
            .user_name(user)
            .send()
            .await
            .map_err(|error| {
                CloudError::request("create_access_key", DisplayErrorContext(&error))
            })?;

        let key = output.access_key().ok_or(CloudError::MissingField {
            operation: "create_access_key",
            field: "access_key",
        })?;

        Ok(AccessKey {
            access_key_id: key.access_key_id().to_owned(),
            secret_access_key: key.secret_access_key().into(),
        })
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError> {
        self.s3
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|error| {
                CloudError::request("put_bucket_policy", DisplayErrorContext(&error))
            })?;

        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, CloudError> {
        let output = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .map_err(|error| CloudError::request("list_objects", DisplayErrorContext(&error)))?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_owned))
            .collect())
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<(), CloudError> {
        let objects = keys
            .into_iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| CloudError::request("delete_objects", error))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|error| CloudError::request("delete_objects", error))?;

        let output = self
            .s3
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|error| CloudError::request("delete_objects", DisplayErrorContext(&error)))?;

        let failures = output.errors();

        if !failures.is_empty() {
            for failure in failures {
                debug!(
                    bucket,
                    key = failure.key().unwrap_or_default(),
                    code = failure.code().unwrap_or_default(),
                    "object could not be deleted"
                );
            }

            return Err(CloudError::request(
                "delete_objects",
                format!("{} objects could not be deleted", failures.len()),
            ));
        }

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), CloudError> {
        self.s3
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|error| CloudError::request("delete_bucket", DisplayErrorContext(&error)))?;

        Ok(())
    }

    async fn delete_access_key(&self, user: &str, access_key_id: &str) -> Result<(), CloudError> {
        self.iam
            .delete_access_key()
            .user_name(user)
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(|error| {
                CloudError::request("delete_access_key", DisplayErrorContext(&error))
            })?;

        Ok(())
    }

    async fn delete_user(&self, user: &str) -> Result<(), CloudError> {
        self.iam
            .delete_user()
            .user_name(user)
            .send()
            .await
            .map_err(|error| CloudError::request("delete_user", DisplayErrorContext(&error)))?;

        Ok(())
    }
}
