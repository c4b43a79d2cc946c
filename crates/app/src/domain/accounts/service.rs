//! Accounts service.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    crypto::KeyRing,
    domain::accounts::{
        data::NewAccount, errors::AccountsServiceError, records::AccountRecord,
        repository::PgAccountsRepository,
    },
    ids::TenantId,
};

#[derive(Debug, Clone)]
pub struct PgAccountsService {
    repository: PgAccountsRepository,
    keys: KeyRing,
}

impl PgAccountsService {
    #[must_use]
    pub fn new(pool: PgPool, keys: KeyRing) -> Self {
        Self {
            repository: PgAccountsRepository::new(pool),
            keys,
        }
    }
}

#[async_trait]
impl AccountsService for PgAccountsService {
    async fn save_account(&self, account: NewAccount) -> Result<AccountRecord, AccountsServiceError> {
        let token = self
            .keys
            .encrypt(account.secret_access_key.expose().as_bytes())?;

        let sealed = self
            .repository
            .upsert_account(&account.tenant_id, &account.access_key_id, &token)
            .await?;

        Ok(sealed.open(&self.keys)?)
    }

    async fn find_account(&self, tenant: &TenantId) -> Result<AccountRecord, AccountsServiceError> {
        let sealed = self.repository.find_account(tenant).await?;

        Ok(sealed.open(&self.keys)?)
    }

    async fn find_accounts(
        &self,
        tenants: &[TenantId],
    ) -> Result<FxHashMap<TenantId, String>, AccountsServiceError> {
        let rows = self.repository.find_accounts(tenants).await?;

        Ok(rows
            .into_iter()
            .map(|(tenant, access_key_id)| (TenantId::new(tenant), access_key_id))
            .collect())
    }

    async fn delete_account(&self, tenant: &TenantId) -> Result<(), AccountsServiceError> {
        let rows_affected = self.repository.delete_account(tenant).await?;

        if rows_affected != 1 {
            warn!(
                tenant_id = %tenant,
                rows_affected,
                "expected to delete exactly one account"
            );
        }

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Tenant cloud credential persistence.
pub trait AccountsService: Send + Sync {
    /// Seals the secret and stores the account, replacing any previous registration.
    async fn save_account(&self, account: NewAccount) -> Result<AccountRecord, AccountsServiceError>;

    /// Loads and unseals the account registered for `tenant`.
    async fn find_account(&self, tenant: &TenantId) -> Result<AccountRecord, AccountsServiceError>;

    /// Maps each registered tenant among `tenants` to its access key id.
    async fn find_accounts(
        &self,
        tenants: &[TenantId],
    ) -> Result<FxHashMap<TenantId, String>, AccountsServiceError>;

    /// Removes the account registered for `tenant`.
    async fn delete_account(&self, tenant: &TenantId) -> Result<(), AccountsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        crypto::{CipherError, CipherKey, SecretString},
        domain::resources::{ResourcesService, data::NewResource},
        ids::{ProviderResourceId, ResourceId},
        test::TestContext,
    };

    use super::*;

    fn new_account(tenant: &str, access_key_id: &str, secret: &str) -> NewAccount {
        NewAccount {
            tenant_id: TenantId::from(tenant),
            access_key_id: access_key_id.to_string(),
            secret_access_key: SecretString::from(secret),
        }
    }

    #[tokio::test]
    async fn save_then_find_round_trips_the_secret() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.accounts
            .save_account(new_account("T1", "AKIAT1", "secret-one"))
            .await?;

        let account = ctx.accounts.find_account(&TenantId::from("T1")).await?;

        assert_eq!(account.tenant_id, TenantId::from("T1"));
        assert_eq!(account.credentials.access_key_id, "AKIAT1");
        assert_eq!(account.credentials.secret_access_key.expose(), "secret-one");

        Ok(())
    }

    #[tokio::test]
    async fn secret_is_not_stored_in_plaintext() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.accounts
            .save_account(new_account("T1", "AKIAT1", "secret-one"))
            .await?;

        let stored: String =
            sqlx::query_scalar("SELECT secret_access_key_token FROM accounts WHERE tenant_id = $1")
                .bind("T1")
                .fetch_one(ctx.db.pool())
                .await?;

        assert!(
            !stored.contains("secret-one"),
            "stored token must not contain the plaintext secret"
        );

        Ok(())
    }

    #[tokio::test]
    async fn re_registration_replaces_the_account() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.accounts
            .save_account(new_account("T1", "AKIAOLD", "old-secret"))
            .await?;
        ctx.accounts
            .save_account(new_account("T1", "AKIANEW", "new-secret"))
            .await?;

        let account = ctx.accounts.find_account(&TenantId::from("T1")).await?;

        assert_eq!(account.credentials.access_key_id, "AKIANEW");
        assert_eq!(account.credentials.secret_access_key.expose(), "new-secret");

        Ok(())
    }

    #[tokio::test]
    async fn find_account_unknown_tenant_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.accounts.find_account(&TenantId::from("T2")).await;

        assert!(
            matches!(result, Err(AccountsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn find_account_with_foreign_key_ring_is_not_recoverable() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.accounts
            .save_account(new_account("T1", "AKIAT1", "secret-one"))
            .await?;

        let other = PgAccountsService::new(
            ctx.db.pool().clone(),
            KeyRing::single(CipherKey::generate()),
        );

        let result = other.find_account(&TenantId::from("T1")).await;

        assert!(
            matches!(
                result,
                Err(AccountsServiceError::Cipher(CipherError::Undecryptable))
            ),
            "expected Undecryptable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn find_accounts_lists_only_registered_tenants() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.accounts
            .save_account(new_account("T1", "AKIAT1", "s1"))
            .await?;
        ctx.accounts
            .save_account(new_account("T3", "AKIAT3", "s3"))
            .await?;

        let accounts = ctx
            .accounts
            .find_accounts(&[
                TenantId::from("T1"),
                TenantId::from("T2"),
                TenantId::from("T3"),
            ])
            .await?;

        assert_eq!(accounts.len(), 2);
        assert_eq!(
            accounts.get(&TenantId::from("T1")).map(String::as_str),
            Some("AKIAT1")
        );
        assert_eq!(
            accounts.get(&TenantId::from("T3")).map(String::as_str),
            Some("AKIAT3")
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_account_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.accounts
            .save_account(new_account("T1", "AKIAT1", "s1"))
            .await?;

        ctx.accounts.delete_account(&TenantId::from("T1")).await?;
        ctx.accounts.delete_account(&TenantId::from("T1")).await?;

        let result = ctx.accounts.find_account(&TenantId::from("T1")).await;

        assert!(
            matches!(result, Err(AccountsServiceError::NotFound)),
            "expected NotFound after delete, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_account_with_resources_is_refused() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.register_account("T1").await?;

        ctx.resources
            .save_resource(NewResource {
                provider_resource_id: ProviderResourceId::generate(),
                tenant_id: TenantId::from("T1"),
                resource_id: ResourceId::from("add-123"),
                access_key_id: "AKIARESOURCE".to_string(),
            })
            .await?;

        let result = ctx.accounts.delete_account(&TenantId::from("T1")).await;

        assert!(
            matches!(result, Err(AccountsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        let account = ctx.accounts.find_account(&TenantId::from("T1")).await?;

        assert_eq!(account.credentials.access_key_id, "AKIAT1");

        Ok(())
    }
}
