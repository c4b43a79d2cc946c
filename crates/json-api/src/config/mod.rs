//! Server configuration module

use clap::Parser;

use crate::config::{
    addon::AddonAuthConfig,
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    platform::PlatformSettings,
    provisioning::{CloudConfig, QueueConfig, SecretsConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod addon;
pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod platform;
pub(crate) mod provisioning;
pub(crate) mod server;

/// Coffer add-on webhook server configuration
#[derive(Debug, Parser)]
#[command(name = "coffer-json", about = "Coffer add-on webhook server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Platform API settings.
    #[command(flatten)]
    pub platform: PlatformSettings,

    /// Webhook Basic auth settings.
    #[command(flatten)]
    pub addon: AddonAuthConfig,

    /// Secrets-at-rest settings.
    #[command(flatten)]
    pub secrets: SecretsConfig,

    /// Cloud provider settings.
    #[command(flatten)]
    pub cloud: CloudConfig,

    /// Work queue settings.
    #[command(flatten)]
    pub queue: QueueConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::{CommandFactory, FromArgMatches};
    use testresult::TestResult;

    use super::*;

    /// Parse `args` with every environment fallback switched off.
    fn parse_args<I, T>(args: I) -> Result<ServerConfig, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = ServerConfig::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)?;

        ServerConfig::from_arg_matches(&matches)
    }

    const REQUIRED: [&str; 9] = [
        "coffer-json",
        "--database-url",
        "postgres://localhost/coffer",
        "--heroku-client-secret",
        "client-secret",
        "--addon-password",
        "addon-password",
        "--secret-keys",
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
    ];

    #[test]
    fn defaults_fill_optional_settings() -> TestResult {
        let config = parse_args(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.platform.heroku_api_url, "https://api.heroku.com");
        assert_eq!(config.addon.addon_manifest_id, "coffer");
        assert_eq!(config.cloud.aws_region, "us-east-1");
        assert_eq!(config.queue.workers, 4);
        assert_eq!(config.queue.queue_capacity, 256);
        assert!(!config.database.migrate);

        Ok(())
    }

    #[test]
    fn missing_client_secret_is_rejected() {
        let args = REQUIRED
            .iter()
            .enumerate()
            .filter(|(index, _)| !matches!(index, 3 | 4))
            .map(|(_, arg)| *arg);

        assert!(
            parse_args(args).is_err(),
            "expected a missing client secret to fail parsing"
        );
    }
}
