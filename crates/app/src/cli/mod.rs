use clap::{Args, Parser, Subcommand};
use coffer_app::{
    crypto::KeyRing,
    database,
    domain::{accounts::PgAccountsService, resources::PgResourcesService},
};

mod account;
mod key;
mod resource;

#[derive(Debug, Parser)]
#[command(name = "coffer-app", about = "Coffer CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Account(account::AccountCommand),
    Resource(resource::ResourceCommand),
    Key(key::KeyCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Account(command) => account::run(command).await,
            Commands::Resource(command) => resource::run(command).await,
            Commands::Key(command) => key::run(command),
        }
    }
}

/// Connection settings shared by every store command.
#[derive(Debug, Args)]
pub(crate) struct StoreArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Comma-separated secret keys, newest first
    #[arg(long, env = "COFFER_SECRET_KEYS", hide_env_values = true)]
    secret_keys: KeyRing,
}

impl StoreArgs {
    pub(crate) async fn accounts(&self) -> Result<PgAccountsService, String> {
        let pool = database::connect(&self.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        Ok(PgAccountsService::new(pool, self.secret_keys.clone()))
    }

    pub(crate) async fn resources(&self) -> Result<PgResourcesService, String> {
        let pool = database::connect(&self.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        Ok(PgResourcesService::new(pool, self.secret_keys.clone()))
    }
}
