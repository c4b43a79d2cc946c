//! Accounts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::{
    cloud::CloudCredentials,
    crypto::{CipherError, KeyRing, SecretString},
    domain::accounts::records::AccountRecord,
    ids::TenantId,
};

const UPSERT_ACCOUNT_SQL: &str = include_str!("sql/upsert_account.sql");
const FIND_ACCOUNT_SQL: &str = include_str!("sql/find_account.sql");
const FIND_ACCOUNTS_SQL: &str = include_str!("sql/find_accounts.sql");
const DELETE_ACCOUNT_SQL: &str = include_str!("sql/delete_account.sql");

/// Account row as stored, with the secret still sealed.
#[derive(Debug, Clone)]
pub(crate) struct SealedAccount {
    pub(crate) tenant_id: TenantId,
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key_token: String,
    pub(crate) created_at: Timestamp,
    pub(crate) updated_at: Timestamp,
}

impl SealedAccount {
    /// Decrypt the stored secret with any key in `keys`.
    pub(crate) fn open(self, keys: &KeyRing) -> Result<AccountRecord, CipherError> {
        let secret = keys.decrypt(&self.secret_access_key_token)?;
        let secret = String::from_utf8(secret).map_err(|_ignored| CipherError::Malformed)?;

        Ok(AccountRecord {
            tenant_id: self.tenant_id,
            credentials: CloudCredentials {
                access_key_id: self.access_key_id,
                secret_access_key: SecretString::from(secret),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
/// PostgreSQL-backed accounts repository.
pub(crate) struct PgAccountsRepository {
    pool: PgPool,
}

impl PgAccountsRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn upsert_account(
        &self,
        tenant: &TenantId,
        access_key_id: &str,
        secret_access_key_token: &str,
    ) -> Result<SealedAccount, sqlx::Error> {
        query_as::<Postgres, SealedAccount>(UPSERT_ACCOUNT_SQL)
            .bind(tenant.as_str())
            .bind(access_key_id)
            .bind(secret_access_key_token)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_account(&self, tenant: &TenantId) -> Result<SealedAccount, sqlx::Error> {
        query_as::<Postgres, SealedAccount>(FIND_ACCOUNT_SQL)
            .bind(tenant.as_str())
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_accounts(
        &self,
        tenants: &[TenantId],
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        let tenants: Vec<String> = tenants.iter().map(ToString::to_string).collect();

        query_as::<Postgres, (String, String)>(FIND_ACCOUNTS_SQL)
            .bind(tenants)
            .fetch_all(&self.pool)
            .await
    }

    pub(crate) async fn delete_account(&self, tenant: &TenantId) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ACCOUNT_SQL)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for SealedAccount {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            tenant_id: TenantId::new(row.try_get::<String, _>("tenant_id")?),
            access_key_id: row.try_get("access_key_id")?,
            secret_access_key_token: row.try_get("secret_access_key_token")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
