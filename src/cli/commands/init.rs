//! `ledgervault init` — create a new vault store protected by a password.

use crate::cli::output;
use crate::cli::{open_session, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{LedgerVaultError, Result};
use crate::session::UnlockOutcome;
use crate::vault::VAULT_LIST_FILE;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut session = open_session(cli)?;
    let list_path = session.vault_dir().join(VAULT_LIST_FILE);

    // 1. Refuse to overwrite an existing store.
    if session.is_initialised() {
        output::tip("Use `ledgervault list` to see the vaults in the existing store.");
        return Err(LedgerVaultError::VaultAlreadyExists(list_path));
    }

    // 2. Choose the password and derive the key.
    let password = prompt_new_password(PASSWORD_ENV)?;
    let key = session.derive_key(password.as_bytes())?;

    // 3. Unlocking an empty directory bootstraps it.
    match session.unlock(&key)? {
        UnlockOutcome::Unlocked { .. } => {}
        UnlockOutcome::Rejected { .. } => return Err(LedgerVaultError::AuthenticationFailed),
        UnlockOutcome::Destroyed => return Err(LedgerVaultError::VaultDestroyed),
    }

    output::success(&format!(
        "Vault store created at {}",
        session.vault_dir().display()
    ));
    output::tip("Run `ledgervault create <NAME>` to add a vault.");
    output::tip("Run `ledgervault list` to see all vaults.");

    Ok(())
}
