//! `ledgervault export` — write a vault's decrypted document as JSON.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{resolve_path, unlock, Cli};
use crate::errors::{LedgerVaultError, Result};

/// Execute the `export` command.
pub fn execute(cli: &Cli, id: u32, output_path: Option<&str>) -> Result<()> {
    let unlocked = unlock(cli)?;
    let descriptor = unlocked.vault(id)?;

    let data = unlocked
        .session
        .read_vault_data(&unlocked.key, &descriptor.file)?;
    let content = serde_json::to_string_pretty(&data)
        .map_err(|e| LedgerVaultError::SerializationError(format!("JSON export: {e}")))?;

    // Write to file or stdout.
    match output_path {
        Some(dest) => {
            let dest_path = resolve_path(dest)?;

            // Safety: refuse to write plaintext into the vault directory.
            if is_inside(&dest_path, unlocked.session.vault_dir()) {
                return Err(LedgerVaultError::CommandFailed(
                    "refusing to export into the vault directory".into(),
                ));
            }

            fs::write(&dest_path, format!("{content}\n")).map_err(|e| {
                LedgerVaultError::CommandFailed(format!("failed to write export file: {e}"))
            })?;

            output::success(&format!(
                "Exported vault '{}' to {}",
                descriptor.name, dest
            ));
        }
        None => {
            // Write to stdout (no success message, just raw output).
            println!("{content}");
        }
    }

    Ok(())
}

/// Whether `path` lies under `dir`, using canonical paths when both exist.
fn is_inside(path: &Path, dir: &Path) -> bool {
    let parent = path.parent().unwrap_or(path);
    match (parent.canonicalize(), dir.canonicalize()) {
        (Ok(parent), Ok(dir)) => parent.starts_with(dir),
        _ => path.starts_with(dir),
    }
}
