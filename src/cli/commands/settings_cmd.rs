//! `ledgervault settings` — view or change the lockout thresholds.
//!
//! Viewing needs no password; changing a threshold requires unlocking
//! first so the limits cannot be raised by someone without it.

use crate::cli::output;
use crate::cli::{open_session, unlock, Cli};
use crate::errors::Result;

/// Execute the `settings` command.
pub fn execute(cli: &Cli, fail_attempts: Option<u32>, lockout_retries: Option<u32>) -> Result<()> {
    let session = if fail_attempts.is_some() || lockout_retries.is_some() {
        let mut session = unlock(cli)?.session;
        session.update_thresholds(fail_attempts, lockout_retries)?;
        output::success("Settings saved.");
        session
    } else {
        open_session(cli)?
    };

    let settings = session.settings();
    output::info(&format!(
        "Lockout after {} failed attempt(s); data destroyed after {} lockout(s).",
        settings.num_fail_attempts, settings.num_lockout_retries
    ));

    Ok(())
}
