//! `ledgervault rotate-key` — change the vault password.
//!
//! Unlocks with the current password, derives a key from the new one
//! (same installation salt), and re-encrypts the vault list and every
//! vault document.  A failure part-way is rolled back where possible;
//! anything left mixed is listed file by file.

use crate::cli::output;
use crate::cli::{prompt_new_password, unlock, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;
use crate::vault::RotationStatus;

/// Execute the `rotate-key` command.
pub fn execute(cli: &Cli) -> Result<()> {
    // 1. Unlock with the current password.
    output::info("Enter your current vault password.");
    let mut unlocked = unlock(cli)?;

    // 2. Choose and derive the new key.
    output::info("Choose your new vault password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;
    let new_key = unlocked.session.derive_key(new_password.as_bytes())?;

    // 3. Re-encrypt everything.
    let report = unlocked
        .session
        .rotate(&unlocked.key, &new_key, &unlocked.list);

    if report.status != RotationStatus::Success {
        output::print_rotation_report(&report);
        if report.status == RotationStatus::PartialFailure {
            output::warning("Files marked 'old' still open with the previous password.");
        }
    }

    let report = report.into_result()?;

    output::success(&format!(
        "Password rotated ({} file(s) re-encrypted)",
        report.rotated_count()
    ));

    Ok(())
}
