use clap::Args;
use coffer_app::{
    crypto::SecretString,
    domain::accounts::{AccountsService, data::NewAccount},
    ids::TenantId,
};

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct RegisterAccountArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Platform tenant id that owns the credentials
    #[arg(long)]
    tenant_id: String,

    /// Cloud access key id
    #[arg(long)]
    access_key_id: String,

    /// Cloud secret access key
    #[arg(long, env = "COFFER_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: String,
}

pub(crate) async fn run(args: RegisterAccountArgs) -> Result<(), String> {
    if args.tenant_id.trim().is_empty() {
        return Err("tenant-id cannot be empty".to_string());
    }

    if args.access_key_id.trim().is_empty() || args.secret_access_key.trim().is_empty() {
        return Err("access key id and secret access key cannot be empty".to_string());
    }

    let service = args.store.accounts().await?;

    let account = service
        .save_account(NewAccount {
            tenant_id: TenantId::new(args.tenant_id),
            access_key_id: args.access_key_id,
            secret_access_key: SecretString::new(args.secret_access_key),
        })
        .await
        .map_err(|error| format!("failed to register account: {error}"))?;

    println!("tenant_id: {}", account.tenant_id);
    println!("access_key_id: {}", account.credentials.access_key_id);
    println!("updated_at: {}", account.updated_at);

    Ok(())
}
