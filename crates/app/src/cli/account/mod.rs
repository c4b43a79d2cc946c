use clap::{Args, Subcommand};

mod delete;
mod list;
mod register;

#[derive(Debug, Args)]
pub(crate) struct AccountCommand {
    #[command(subcommand)]
    command: AccountSubcommand,
}

#[derive(Debug, Subcommand)]
enum AccountSubcommand {
    Register(register::RegisterAccountArgs),
    List(list::ListAccountsArgs),
    Delete(delete::DeleteAccountArgs),
}

pub(crate) async fn run(command: AccountCommand) -> Result<(), String> {
    match command.command {
        AccountSubcommand::Register(args) => register::run(args).await,
        AccountSubcommand::List(args) => list::run(args).await,
        AccountSubcommand::Delete(args) => delete::run(args).await,
    }
}
