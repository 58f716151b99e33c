//! `ledgervault import` — replace a vault's document with a JSON file.
//!
//! The file may hold any JSON value; the store does not impose a schema.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{resolve_path, unlock, Cli};
use crate::errors::{LedgerVaultError, Result};
use crate::vault::VaultData;

/// Execute the `import` command.
pub fn execute(cli: &Cli, id: u32, file_path: &str) -> Result<()> {
    let source = resolve_path(file_path)?;

    if !source.exists() {
        return Err(LedgerVaultError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    // Parse before asking for the password so a bad file costs no attempt.
    let data = parse_json_file(&source)?;

    let mut unlocked = unlock(cli)?;
    let descriptor = unlocked.vault(id)?;

    unlocked
        .session
        .save_vault_data(&unlocked.key, &descriptor.file, &data)?;

    output::success(&format!(
        "Imported {} into vault '{}'",
        source.display(),
        descriptor.name
    ));

    Ok(())
}

/// Read a file and parse it as a JSON document.
fn parse_json_file(path: &Path) -> Result<VaultData> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        LedgerVaultError::CommandFailed(format!("invalid JSON in {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_object() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"{"accounts": [{"bank": "ACME", "balance": 12.5}]}"#).unwrap();

        let data = parse_json_file(&path).unwrap();
        assert_eq!(data.0["accounts"][0]["bank"], "ACME");
    }

    #[test]
    fn parse_json_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "not json {").unwrap();

        let err = parse_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
