//! Handler for the `cache` command group.

use serde_json::json;

use crate::adapter::inbound::cli::command::CacheCommand;
use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;

/// Execute a cache subcommand.
pub fn execute(command: &CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Clear => clear(),
    }
}

fn clear() -> Result<()> {
    let removed = operator::operator()?.clear_cache()?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cache.clear",
            "removed": removed,
        }));
        return Ok(());
    }

    output::success(&format!("Removed {removed} cached entries"));
    Ok(())
}
