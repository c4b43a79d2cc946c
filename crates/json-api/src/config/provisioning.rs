//! Provisioning Config

use clap::Args;
use coffer_app::{
    cloud::aws::DEFAULT_REGION,
    crypto::KeyRing,
    provisioning::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS},
};

/// Secrets-at-rest settings.
#[derive(Debug, Args)]
pub struct SecretsConfig {
    /// Comma-separated secret keys, newest first
    #[arg(long, env = "COFFER_SECRET_KEYS", hide_env_values = true)]
    pub secret_keys: KeyRing,
}

/// Cloud provider settings.
#[derive(Debug, Args)]
pub struct CloudConfig {
    /// Region buckets are created in
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub aws_region: String,
}

/// Work queue settings.
#[derive(Debug, Args)]
pub struct QueueConfig {
    /// Number of provisioning workers
    #[arg(long, env = "COFFER_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Maximum number of jobs waiting for a worker
    #[arg(long, env = "COFFER_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,
}
