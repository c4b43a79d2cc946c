use clap::{Args, Subcommand};

mod pending;

#[derive(Debug, Args)]
pub(crate) struct ResourceCommand {
    #[command(subcommand)]
    command: ResourceSubcommand,
}

#[derive(Debug, Subcommand)]
enum ResourceSubcommand {
    /// List resources whose teardown has not completed
    Pending(pending::PendingArgs),
}

pub(crate) async fn run(command: ResourceCommand) -> Result<(), String> {
    match command.command {
        ResourceSubcommand::Pending(args) => pending::run(args).await,
    }
}
