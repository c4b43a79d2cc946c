use clap::{Args, Subcommand};
use coffer_app::crypto::CipherKey;

#[derive(Debug, Args)]
pub(crate) struct KeyCommand {
    #[command(subcommand)]
    command: KeySubcommand,
}

#[derive(Debug, Subcommand)]
enum KeySubcommand {
    /// Print a fresh secret key for COFFER_SECRET_KEYS
    Generate,
}

pub(crate) fn run(command: KeyCommand) -> Result<(), String> {
    match command.command {
        KeySubcommand::Generate => {
            println!("{}", CipherKey::generate().encode());
            println!("prepend it to COFFER_SECRET_KEYS to rotate; keep older keys until re-sealed");

            Ok(())
        }
    }
}
