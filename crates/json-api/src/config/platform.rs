//! Platform Config

use clap::Args;
use coffer_app::platform::{DEFAULT_API_URL, DEFAULT_ID_URL, PlatformConfig};

/// Platform API settings.
#[derive(Debug, Args)]
pub struct PlatformSettings {
    /// Add-on OAuth client secret
    #[arg(long, env = "HEROKU_CLIENT_SECRET", hide_env_values = true)]
    pub heroku_client_secret: String,

    /// Identity service address
    #[arg(long, env = "HEROKU_ID_URL", default_value = DEFAULT_ID_URL)]
    pub heroku_id_url: String,

    /// Platform API address
    #[arg(long, env = "HEROKU_API_URL", default_value = DEFAULT_API_URL)]
    pub heroku_api_url: String,
}

impl PlatformSettings {
    /// Client configuration for these settings.
    #[must_use]
    pub fn client_config(&self) -> PlatformConfig {
        PlatformConfig {
            id_url: self.heroku_id_url.trim_end_matches('/').to_string(),
            api_url: self.heroku_api_url.trim_end_matches('/').to_string(),
            client_secret: self.heroku_client_secret.as_str().into(),
        }
    }
}
