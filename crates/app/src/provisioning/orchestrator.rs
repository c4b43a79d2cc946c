//! Create and delete workflows.

use std::sync::Arc;

use async_trait::async_trait;
use smallvec::smallvec;
use tracing::{error, info, warn};

use crate::{
    cloud::ResourceController,
    domain::{
        accounts::{AccountsService, AccountsServiceError},
        resources::{
            ResourcesService, ResourcesServiceError, data::NewResource, records::ResourceRecord,
        },
    },
    ids::{ProviderResourceId, ResourceId},
    platform::{
        ACCESS_KEY_ID_VAR, BUCKET_NAME_VAR, ConfigVar, PlatformApi, PlatformAuthenticator,
        ProvisioningOutcome, SECRET_ACCESS_KEY_VAR,
    },
    provisioning::{CreateResourceEvent, Job, JobRunner, ProvisioningError, StoreError},
};

/// Result of a delete workflow that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Every cloud resource was removed and the record stamped as deleted.
    Deleted,

    /// No record exists for the provider resource id.
    Missing,
}

/// Sequences the platform, cloud and store calls of each workflow.
#[derive(Clone)]
pub struct Provisioner {
    accounts: Arc<dyn AccountsService>,
    resources: Arc<dyn ResourcesService>,
    platform: Arc<dyn PlatformAuthenticator>,
    cloud: Arc<dyn ResourceController>,
}

impl Provisioner {
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountsService>,
        resources: Arc<dyn ResourcesService>,
        platform: Arc<dyn PlatformAuthenticator>,
        cloud: Arc<dyn ResourceController>,
    ) -> Self {
        Self {
            accounts,
            resources,
            platform,
            cloud,
        }
    }

    /// Provision the bucket and identity for a newly created add-on.
    ///
    /// Every failure after the grant exchange is reported to the platform as a
    /// failed provisioning before it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first workflow step that failed.
    pub async fn create_resource(
        &self,
        event: CreateResourceEvent,
        provider_resource_id: ProviderResourceId,
    ) -> Result<ResourceRecord, ProvisioningError> {
        let session = self
            .platform
            .exchange_grant(event.oauth_grant_code.expose())
            .await
            .map_err(ProvisioningError::AuthExchange)?;

        match self
            .provision(session.as_ref(), &event, &provider_resource_id)
            .await
        {
            Ok(record) => {
                if let Err(error) = report(
                    session.as_ref(),
                    &event.resource_id,
                    ProvisioningOutcome::Provisioned,
                )
                .await
                {
                    warn!(
                        resource_id = %event.resource_id,
                        %provider_resource_id,
                        "provisioned but the platform was not told: {error}"
                    );
                }

                info!(
                    resource_id = %event.resource_id,
                    %provider_resource_id,
                    tenant_id = %record.tenant_id,
                    "provisioned resource"
                );

                Ok(record)
            }
            Err(error) => {
                error!(
                    resource_id = %event.resource_id,
                    %provider_resource_id,
                    "provisioning failed: {error}"
                );

                if let Err(error) = report(
                    session.as_ref(),
                    &event.resource_id,
                    ProvisioningOutcome::Failed,
                )
                .await
                {
                    warn!(
                        resource_id = %event.resource_id,
                        %provider_resource_id,
                        "failed provisioning went unreported: {error}"
                    );
                }

                Err(error)
            }
        }
    }

    async fn provision(
        &self,
        session: &dyn PlatformApi,
        event: &CreateResourceEvent,
        provider_resource_id: &ProviderResourceId,
    ) -> Result<ResourceRecord, ProvisioningError> {
        let tenant_id = session
            .resolve_owner(&event.resource_id)
            .await
            .map_err(ProvisioningError::Lookup)?;

        let account = match self.accounts.find_account(&tenant_id).await {
            Ok(account) => account,
            Err(AccountsServiceError::NotFound) => {
                return Err(ProvisioningError::AccountNotFound(tenant_id));
            }
            Err(error) => return Err(StoreError::from(error).into()),
        };

        let bucket = self
            .cloud
            .create(&account.credentials, provider_resource_id)
            .await
            .map_err(ProvisioningError::CloudProvisioning)?;

        let config = smallvec![
            ConfigVar::new(BUCKET_NAME_VAR, bucket.bucket_name.as_str()),
            ConfigVar::new(ACCESS_KEY_ID_VAR, bucket.access_key.access_key_id.as_str()),
            ConfigVar::new(
                SECRET_ACCESS_KEY_VAR,
                bucket.access_key.secret_access_key.expose()
            ),
        ];

        if let Err(error) = session.push_config(&event.resource_id, config).await {
            warn!(
                %provider_resource_id,
                bucket = %bucket.bucket_name,
                user = %bucket.user_name,
                "cloud resources left orphaned"
            );

            return Err(ProvisioningError::ConfigPush(error));
        }

        self.resources
            .save_resource(NewResource {
                provider_resource_id: provider_resource_id.clone(),
                tenant_id,
                resource_id: event.resource_id.clone(),
                access_key_id: bucket.access_key.access_key_id.clone(),
            })
            .await
            .map_err(|error| {
                warn!(
                    %provider_resource_id,
                    bucket = %bucket.bucket_name,
                    user = %bucket.user_name,
                    "cloud resources left orphaned"
                );

                StoreError::from(error).into()
            })
    }

    /// Tear down the cloud resources behind a resource already marked for deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::Teardown`] when any teardown step failed,
    /// leaving the record marked for deletion with no deletion timestamp.
    pub async fn delete_resource(
        &self,
        provider_resource_id: &ProviderResourceId,
    ) -> Result<DeletionOutcome, ProvisioningError> {
        let owned = match self
            .resources
            .find_resource_and_owner(provider_resource_id)
            .await
        {
            Ok(owned) => owned,
            Err(ResourcesServiceError::NotFound) => {
                info!(%provider_resource_id, "no resource to delete");

                return Ok(DeletionOutcome::Missing);
            }
            Err(error) => return Err(StoreError::from(error).into()),
        };

        let report = self
            .cloud
            .destroy(
                &owned.owner.credentials,
                provider_resource_id,
                &owned.resource.access_key_id,
            )
            .await;

        if !report.succeeded() {
            warn!(
                %provider_resource_id,
                resource_id = %owned.resource.resource_id,
                ?report,
                "teardown incomplete; resource stays marked for deletion"
            );

            return Err(ProvisioningError::Teardown(report));
        }

        self.resources
            .set_deleted(provider_resource_id)
            .await
            .map_err(StoreError::from)?;

        info!(
            %provider_resource_id,
            resource_id = %owned.resource.resource_id,
            "deleted resource"
        );

        Ok(DeletionOutcome::Deleted)
    }
}

async fn report(
    session: &dyn PlatformApi,
    resource: &ResourceId,
    outcome: ProvisioningOutcome,
) -> Result<(), ProvisioningError> {
    session
        .report_outcome(resource, outcome)
        .await
        .map_err(ProvisioningError::Report)
}

#[async_trait]
impl JobRunner for Provisioner {
    async fn run(&self, job: Job) -> Result<(), ProvisioningError> {
        match job {
            Job::Create {
                event,
                provider_resource_id,
            } => self
                .create_resource(event, provider_resource_id)
                .await
                .map(|_| ()),
            Job::Delete {
                provider_resource_id,
            } => self
                .delete_resource(&provider_resource_id)
                .await
                .map(|_| ()),
        }
    }
}
