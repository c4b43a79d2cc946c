use clap::Args;
use coffer_app::{
    domain::accounts::{AccountsService, AccountsServiceError},
    ids::TenantId,
};

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct DeleteAccountArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Tenant id whose credentials should be removed
    #[arg(long)]
    tenant_id: String,
}

pub(crate) async fn run(args: DeleteAccountArgs) -> Result<(), String> {
    let service = args.store.accounts().await?;

    let tenant_id = TenantId::new(args.tenant_id);

    match service.delete_account(&tenant_id).await {
        Ok(()) => {
            println!("deleted account: {tenant_id}");

            Ok(())
        }
        Err(AccountsServiceError::InvalidReference) => Err(format!(
            "tenant {tenant_id} still owns resources; delete them first"
        )),
        Err(error) => Err(format!("failed to delete account: {error}")),
    }
}
