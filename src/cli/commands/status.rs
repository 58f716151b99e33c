//! `ledgervault status` — show lockout counters and thresholds.
//!
//! Reads only the plain settings file, so it needs no password.

use console::style;

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::Result;
use crate::security::LockoutState;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    let settings = session.settings();

    let state = match session.lockout_state() {
        LockoutState::Unlocked => style("unlocked").green().to_string(),
        LockoutState::SoftLocked { .. } => style("locked").yellow().to_string(),
        LockoutState::Destroyed => style("pending destruction").red().to_string(),
    };

    println!("{} {}", style("Vault directory:").bold(), session.vault_dir().display());
    println!(
        "{} {}",
        style("Initialised:").bold(),
        if session.is_initialised() { "yes" } else { "no" }
    );
    println!("{} {state}", style("Login:").bold());
    if let Some(since) = settings.lock_login_time {
        println!(
            "{} {}",
            style("Locked since:").bold(),
            since.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!(
        "{} {} / {}",
        style("Failed attempts:").bold(),
        settings.fail_attempt_count,
        settings.num_fail_attempts
    );
    println!(
        "{} {} / {}",
        style("Lockouts:").bold(),
        settings.lock_out_count,
        settings.num_lockout_retries
    );

    if !session.is_initialised() {
        output::tip("Run `ledgervault init` to create a vault store.");
    }

    Ok(())
}
