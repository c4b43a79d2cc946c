//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    cloud::ResourceController,
    crypto::KeyRing,
    database,
    domain::{
        accounts::{AccountsService, PgAccountsService},
        resources::{PgResourcesService, ResourcesService},
    },
    platform::PlatformAuthenticator,
    provisioning::Provisioner,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub accounts: Arc<dyn AccountsService>,
    pub resources: Arc<dyn ResourcesService>,
}

impl AppContext {
    /// Build application context from a database URL, applying migrations
    /// when `migrate` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(
        url: &str,
        keys: KeyRing,
        migrate: bool,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if migrate {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;
        }

        Ok(Self {
            accounts: Arc::new(PgAccountsService::new(pool.clone(), keys.clone())),
            resources: Arc::new(PgResourcesService::new(pool, keys)),
        })
    }

    /// Build the workflow runner over this context's stores.
    #[must_use]
    pub fn provisioner(
        &self,
        platform: Arc<dyn PlatformAuthenticator>,
        cloud: Arc<dyn ResourceController>,
    ) -> Provisioner {
        Provisioner::new(
            Arc::clone(&self.accounts),
            Arc::clone(&self.resources),
            platform,
            cloud,
        )
    }
}
