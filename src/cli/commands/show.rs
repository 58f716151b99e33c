//! `ledgervault show` — print a vault's decrypted document.

use crate::cli::{unlock, Cli};
use crate::errors::{LedgerVaultError, Result};

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: u32) -> Result<()> {
    let unlocked = unlock(cli)?;
    let descriptor = unlocked.vault(id)?;

    let data = unlocked
        .session
        .read_vault_data(&unlocked.key, &descriptor.file)?;
    let pretty = serde_json::to_string_pretty(&data)
        .map_err(|e| LedgerVaultError::SerializationError(format!("vault document: {e}")))?;

    println!("{pretty}");

    Ok(())
}
