//! `ledgervault delete` — remove a vault and its encrypted document.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::{LedgerVaultError, Result};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: u32, force: bool) -> Result<()> {
    let mut unlocked = unlock(cli)?;
    let descriptor = unlocked.vault(id)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete vault '{}' and all of its data?",
                descriptor.name
            ))
            .default(false)
            .interact()
            .map_err(|e| LedgerVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let removed = unlocked
        .session
        .delete_vault(&unlocked.key, &mut unlocked.list, id)?;

    output::success(&format!("Deleted vault '{}'", removed.name));

    Ok(())
}
