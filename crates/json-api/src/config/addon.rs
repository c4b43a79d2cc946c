//! Add-on Auth Config

use clap::Args;

/// Credentials the platform presents on every webhook.
#[derive(Debug, Args)]
pub struct AddonAuthConfig {
    /// Add-on manifest id, used as the Basic auth user
    #[arg(long, env = "ADDON_MANIFEST_ID", default_value = "coffer")]
    pub addon_manifest_id: String,

    /// Add-on manifest password
    #[arg(long, env = "ADDON_PASSWORD", hide_env_values = true)]
    pub addon_password: String,
}
