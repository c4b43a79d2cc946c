use clap::Args;
use coffer_app::domain::resources::ResourcesService;

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct PendingArgs {
    #[command(flatten)]
    store: StoreArgs,
}

pub(crate) async fn run(args: PendingArgs) -> Result<(), String> {
    let service = args.store.resources().await?;

    let pending = service
        .list_pending_deletions()
        .await
        .map_err(|error| format!("failed to list pending deletions: {error}"))?;

    if pending.is_empty() {
        println!("no pending deletions");
        return Ok(());
    }

    for resource in pending {
        println!("provider_resource_id: {}", resource.provider_resource_id);
        println!("tenant_id: {}", resource.tenant_id);
        println!("resource_id: {}", resource.resource_id);
        println!("bucket: {}", resource.provider_resource_id.bucket_name());
        println!("user: {}", resource.provider_resource_id.user_name());
        println!("created_at: {}", resource.created_at);
        println!();
    }

    Ok(())
}
