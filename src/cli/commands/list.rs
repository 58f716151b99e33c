//! `ledgervault list` — display all vaults in a table.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let unlocked = unlock(cli)?;

    output::info(&format!("{} vault(s)", unlocked.list.vaults.len()));
    output::print_vault_table(&unlocked.list);

    Ok(())
}
