//! Resources service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    crypto::KeyRing,
    domain::resources::{
        data::NewResource,
        errors::ResourcesServiceError,
        records::{OwnedResourceRecord, ResourceRecord},
        repository::PgResourcesRepository,
    },
    ids::ProviderResourceId,
};

#[derive(Debug, Clone)]
pub struct PgResourcesService {
    repository: PgResourcesRepository,
    keys: KeyRing,
}

impl PgResourcesService {
    #[must_use]
    pub fn new(pool: PgPool, keys: KeyRing) -> Self {
        Self {
            repository: PgResourcesRepository::new(pool),
            keys,
        }
    }
}

#[async_trait]
impl ResourcesService for PgResourcesService {
    async fn save_resource(
        &self,
        resource: NewResource,
    ) -> Result<ResourceRecord, ResourcesServiceError> {
        self.repository
            .create_resource(resource)
            .await
            .map_err(Into::into)
    }

    async fn find_resource_and_owner(
        &self,
        resource: &ProviderResourceId,
    ) -> Result<OwnedResourceRecord, ResourcesServiceError> {
        let owned = self.repository.find_resource_and_owner(resource).await?;

        Ok(OwnedResourceRecord {
            resource: owned.resource,
            owner: owned.owner.open(&self.keys)?,
        })
    }

    async fn mark_for_deletion(
        &self,
        resource: &ProviderResourceId,
    ) -> Result<(), ResourcesServiceError> {
        let rows_affected = self.repository.mark_for_deletion(resource).await?;

        if rows_affected != 1 {
            warn!(
                provider_resource_id = %resource,
                rows_affected,
                "expected to mark exactly one resource for deletion"
            );
        }

        Ok(())
    }

    async fn set_deleted(&self, resource: &ProviderResourceId) -> Result<(), ResourcesServiceError> {
        let rows_affected = self.repository.set_deleted(resource).await?;

        if rows_affected != 1 {
            warn!(
                provider_resource_id = %resource,
                rows_affected,
                "expected to set exactly one resource as deleted"
            );
        }

        Ok(())
    }

    async fn list_pending_deletions(&self) -> Result<Vec<ResourceRecord>, ResourcesServiceError> {
        self.repository
            .list_pending_deletions()
            .await
            .map_err(Into::into)
    }
}

#[automock]
#[async_trait]
/// Provisioned resource persistence.
pub trait ResourcesService: Send + Sync {
    /// Records a newly provisioned resource.
    async fn save_resource(
        &self,
        resource: NewResource,
    ) -> Result<ResourceRecord, ResourcesServiceError>;

    /// Loads a resource and its owner's unsealed account in one read.
    async fn find_resource_and_owner(
        &self,
        resource: &ProviderResourceId,
    ) -> Result<OwnedResourceRecord, ResourcesServiceError>;

    /// Flags a resource for deletion. Affecting no rows is logged, not an error.
    async fn mark_for_deletion(
        &self,
        resource: &ProviderResourceId,
    ) -> Result<(), ResourcesServiceError>;

    /// Stamps a resource as deleted. Affecting no rows is logged, not an error.
    async fn set_deleted(&self, resource: &ProviderResourceId) -> Result<(), ResourcesServiceError>;

    /// Resources marked for deletion whose teardown has not completed.
    async fn list_pending_deletions(&self) -> Result<Vec<ResourceRecord>, ResourcesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        ids::{ResourceId, TenantId},
        test::TestContext,
    };

    use super::*;

    async fn save_resource(ctx: &TestContext, tenant: &str) -> TestResult<ProviderResourceId> {
        let provider_resource_id = ProviderResourceId::generate();

        ctx.resources
            .save_resource(NewResource {
                provider_resource_id: provider_resource_id.clone(),
                tenant_id: TenantId::from(tenant),
                resource_id: ResourceId::from("add-123"),
                access_key_id: "AKIARESOURCE".to_string(),
            })
            .await?;

        Ok(provider_resource_id)
    }

    #[tokio::test]
    async fn find_resource_and_owner_joins_the_account() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.register_account("T1").await?;

        let id = save_resource(&ctx, "T1").await?;

        let owned = ctx.resources.find_resource_and_owner(&id).await?;

        assert_eq!(owned.resource.provider_resource_id, id);
        assert_eq!(owned.resource.resource_id, ResourceId::from("add-123"));
        assert_eq!(owned.resource.access_key_id, "AKIARESOURCE");
        assert!(!owned.resource.marked_for_deletion);
        assert!(owned.resource.deleted_at.is_none());
        assert_eq!(owned.owner.tenant_id, TenantId::from("T1"));
        assert_eq!(owned.owner.credentials.access_key_id, "AKIAT1");
        assert_eq!(owned.owner.credentials.secret_access_key.expose(), "secret-T1");

        Ok(())
    }

    #[tokio::test]
    async fn find_resource_and_owner_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .resources
            .find_resource_and_owner(&ProviderResourceId::generate())
            .await;

        assert!(
            matches!(result, Err(ResourcesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn save_resource_without_account_is_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .resources
            .save_resource(NewResource {
                provider_resource_id: ProviderResourceId::generate(),
                tenant_id: TenantId::from("T2"),
                resource_id: ResourceId::from("add-456"),
                access_key_id: "AKIARESOURCE".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(ResourcesServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn mark_for_deletion_twice_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.register_account("T1").await?;

        let id = save_resource(&ctx, "T1").await?;

        ctx.resources.mark_for_deletion(&id).await?;
        ctx.resources.mark_for_deletion(&id).await?;

        let owned = ctx.resources.find_resource_and_owner(&id).await?;

        assert!(owned.resource.marked_for_deletion);
        assert!(owned.resource.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn mark_for_deletion_unknown_id_is_not_an_error() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.resources
            .mark_for_deletion(&ProviderResourceId::generate())
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn set_deleted_stamps_the_resource_once() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.register_account("T1").await?;

        let id = save_resource(&ctx, "T1").await?;

        ctx.resources.mark_for_deletion(&id).await?;
        ctx.resources.set_deleted(&id).await?;

        let first = ctx.resources.find_resource_and_owner(&id).await?;

        ctx.resources.set_deleted(&id).await?;

        let second = ctx.resources.find_resource_and_owner(&id).await?;

        assert!(first.resource.deleted_at.is_some());
        assert_eq!(
            first.resource.deleted_at, second.resource.deleted_at,
            "deleted_at must keep its first value"
        );

        Ok(())
    }

    #[tokio::test]
    async fn pending_deletions_exclude_completed_teardowns() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.register_account("T1").await?;

        let pending = save_resource(&ctx, "T1").await?;
        let completed = save_resource(&ctx, "T1").await?;
        let _untouched = save_resource(&ctx, "T1").await?;

        ctx.resources.mark_for_deletion(&pending).await?;
        ctx.resources.mark_for_deletion(&completed).await?;
        ctx.resources.set_deleted(&completed).await?;

        let listed = ctx.resources.list_pending_deletions().await?;

        let ids: Vec<_> = listed
            .iter()
            .map(|record| record.provider_resource_id.clone())
            .collect();

        assert_eq!(ids, vec![pending]);

        Ok(())
    }
}
