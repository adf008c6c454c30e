//! Routes a parsed subcommand to its handler.

use crate::adapter::inbound::cli::command::Commands;
use crate::adapter::inbound::cli::{cache, health, history, snapshot};
use crate::error::Result;

/// Run one subcommand to completion.
pub async fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Snapshot => snapshot::execute().await,
        Commands::History(args) => history::execute(args),
        Commands::Health(args) => health::execute(args.hours),
        Commands::Cache(cmd) => cache::execute(cmd),
    }
}
