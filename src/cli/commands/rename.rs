//! `ledgervault rename` — change a vault's display name.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `rename` command.
pub fn execute(cli: &Cli, id: u32, name: &str) -> Result<()> {
    let mut unlocked = unlock(cli)?;

    let mut descriptor = unlocked.vault(id)?;
    let old_name = std::mem::replace(&mut descriptor.name, name.trim().to_string());

    unlocked
        .session
        .modify_vault(&unlocked.key, &mut unlocked.list, descriptor)?;

    output::success(&format!("Renamed vault '{old_name}' to '{}'", name.trim()));

    Ok(())
}
