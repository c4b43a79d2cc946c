use clap::Args;
use coffer_app::{domain::accounts::AccountsService, ids::TenantId};

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct ListAccountsArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Tenant ids to look up
    #[arg(long = "tenant-id", required = true, num_args = 1..)]
    tenant_ids: Vec<String>,
}

pub(crate) async fn run(args: ListAccountsArgs) -> Result<(), String> {
    let service = args.store.accounts().await?;

    let tenants: Vec<TenantId> = args.tenant_ids.into_iter().map(TenantId::new).collect();

    let accounts = service
        .find_accounts(&tenants)
        .await
        .map_err(|error| format!("failed to list accounts: {error}"))?;

    for tenant in &tenants {
        println!(
            "{tenant}: {}",
            accounts
                .get(tenant)
                .map_or("not registered", String::as_str)
        );
    }

    Ok(())
}
