//! Resources Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    domain::{
        accounts::repository::SealedAccount,
        resources::{data::NewResource, records::ResourceRecord},
    },
    ids::{ProviderResourceId, ResourceId, TenantId},
};

const CREATE_RESOURCE_SQL: &str = include_str!("sql/create_resource.sql");
const FIND_RESOURCE_AND_OWNER_SQL: &str = include_str!("sql/find_resource_and_owner.sql");
const MARK_FOR_DELETION_SQL: &str = include_str!("sql/mark_for_deletion.sql");
const SET_DELETED_SQL: &str = include_str!("sql/set_deleted.sql");
const LIST_PENDING_DELETIONS_SQL: &str = include_str!("sql/list_pending_deletions.sql");

/// Resource joined with its owner's sealed account.
#[derive(Debug, Clone)]
pub(crate) struct OwnedResource {
    pub(crate) resource: ResourceRecord,
    pub(crate) owner: SealedAccount,
}

#[derive(Debug, Clone)]
/// PostgreSQL-backed resources repository.
pub(crate) struct PgResourcesRepository {
    pool: PgPool,
}

impl PgResourcesRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_resource(
        &self,
        resource: NewResource,
    ) -> Result<ResourceRecord, sqlx::Error> {
        query_as::<Postgres, ResourceRecord>(CREATE_RESOURCE_SQL)
            .bind(resource.provider_resource_id.as_str())
            .bind(resource.tenant_id.as_str())
            .bind(resource.resource_id.as_str())
            .bind(resource.access_key_id)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_resource_and_owner(
        &self,
        resource: &ProviderResourceId,
    ) -> Result<OwnedResource, sqlx::Error> {
        query_as::<Postgres, OwnedResource>(FIND_RESOURCE_AND_OWNER_SQL)
            .bind(resource.as_str())
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn mark_for_deletion(
        &self,
        resource: &ProviderResourceId,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_FOR_DELETION_SQL)
            .bind(resource.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_deleted(&self, resource: &ProviderResourceId) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_DELETED_SQL)
            .bind(resource.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_pending_deletions(&self) -> Result<Vec<ResourceRecord>, sqlx::Error> {
        query_as::<Postgres, ResourceRecord>(LIST_PENDING_DELETIONS_SQL)
            .fetch_all(&self.pool)
            .await
    }
}

fn provider_resource_id(row: &PgRow) -> sqlx::Result<ProviderResourceId> {
    let value: String = row.try_get("provider_resource_id")?;

    ProviderResourceId::parse(&value).map_err(|e| sqlx::Error::ColumnDecode {
        index: "provider_resource_id".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for ResourceRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            provider_resource_id: provider_resource_id(row)?,
            tenant_id: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            resource_id: ResourceId::new(row.try_get::<String, _>("resource_id")?),
            access_key_id: row.try_get("access_key_id")?,
            marked_for_deletion: row.try_get("marked_for_deletion")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OwnedResource {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let resource = ResourceRecord::from_row(row)?;

        let owner = SealedAccount {
            tenant_id: resource.tenant_id.clone(),
            access_key_id: row.try_get("owner_access_key_id")?,
            secret_access_key_token: row.try_get("owner_secret_access_key_token")?,
            created_at: row.try_get::<SqlxTimestamp, _>("owner_created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("owner_updated_at")?.to_jiff(),
        };

        Ok(Self { resource, owner })
    }
}
