//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::crypto::CryptoKey;
use crate::errors::{LedgerVaultError, Result};
use crate::security::{LockoutDecision, LockoutState};
use crate::session::{Session, UnlockOutcome};
use crate::vault::{VaultDescriptor, VaultList, VAULT_LIST_FILE};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable checked before prompting for the password.
pub const PASSWORD_ENV: &str = "LEDGERVAULT_PASSWORD";

/// Environment variable checked before prompting for a replacement password.
pub const NEW_PASSWORD_ENV: &str = "LEDGERVAULT_NEW_PASSWORD";

/// LedgerVault CLI: encrypted personal-data vaults.
#[derive(Parser)]
#[command(
    name = "ledgervault",
    about = "Encrypted personal-data vault store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the encrypted vault files
    #[arg(long, default_value = ".ledgervault/vault", global = true)]
    pub vault_dir: String,

    /// Directory holding settings and the audit log
    #[arg(long, default_value = ".ledgervault/settings", global = true)]
    pub settings_dir: String,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault store
    Init,

    /// List all vaults
    List,

    /// Create a new, empty vault
    Create {
        /// Display name for the vault
        name: String,
    },

    /// Rename a vault
    Rename {
        /// Vault id (see `list`)
        id: u32,
        /// New display name
        name: String,
    },

    /// Delete a vault and its data
    Delete {
        /// Vault id
        id: u32,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print a vault's decrypted JSON document
    Show {
        /// Vault id
        id: u32,
    },

    /// Replace a vault's document with the contents of a JSON file
    Import {
        /// Vault id
        id: u32,
        /// Path to the JSON file
        file: String,
    },

    /// Export a vault's document as JSON
    Export {
        /// Vault id
        id: u32,
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Re-encrypt every vault under a new password
    RotateKey,

    /// Show lockout status
    Status,

    /// Change lockout thresholds
    Settings {
        /// Failed attempts before a lockout
        #[arg(long)]
        fail_attempts: Option<u32>,
        /// Lockouts before all vault data is destroyed
        #[arg(long)]
        lockout_retries: Option<u32>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },

    /// View the audit log of vault operations
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// An unlocked store: the session, the key and the decrypted vault list.
pub struct Unlocked {
    pub session: Session,
    pub key: CryptoKey,
    pub list: VaultList,
}

impl Unlocked {
    /// Look up a vault by id.
    pub fn vault(&self, id: u32) -> Result<VaultDescriptor> {
        self.list
            .find(id)
            .cloned()
            .ok_or(LedgerVaultError::VaultNotFound(id))
    }
}

/// Get the vault password: `LEDGERVAULT_PASSWORD`, else an interactive prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| LedgerVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` is checked first for scripted use.  Enforces a minimum
/// length either way.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(LedgerVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| LedgerVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Resolve the two directories against the working directory.
pub fn open_session(cli: &Cli) -> Result<Session> {
    let cwd = std::env::current_dir()?;
    Session::open(cwd.join(&cli.vault_dir), cwd.join(&cli.settings_dir))
}

/// Ask for the password and unlock an existing store.
///
/// A wrong password is reported with how close the user is to the next
/// lockout and turned into `AuthenticationFailed`; a wipe becomes
/// `VaultDestroyed`.
pub fn unlock(cli: &Cli) -> Result<Unlocked> {
    let mut session = open_session(cli)?;

    if !session.is_initialised() && session.lockout_state() != LockoutState::Destroyed {
        output::tip("Run `ledgervault init` to create a vault store.");
        return Err(LedgerVaultError::NotFound(
            session.vault_dir().join(VAULT_LIST_FILE),
        ));
    }

    if let LockoutState::SoftLocked { since } = session.lockout_state() {
        let since = since.map_or_else(
            || "earlier".to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        output::warning(&format!(
            "Login locked since {since} after repeated failures ({} of {} lockouts used).",
            session.settings().lock_out_count,
            session.settings().num_lockout_retries
        ));
    }

    let password = prompt_password("Enter vault password")?;
    let key = session.derive_key(password.as_bytes())?;

    match session.unlock(&key)? {
        UnlockOutcome::Unlocked { list, .. } => Ok(Unlocked { session, key, list }),
        UnlockOutcome::Rejected { decision } => {
            report_rejection(&session, decision);
            Err(LedgerVaultError::AuthenticationFailed)
        }
        UnlockOutcome::Destroyed => Err(LedgerVaultError::VaultDestroyed),
    }
}

fn report_rejection(session: &Session, decision: LockoutDecision) {
    let settings = session.settings();
    match decision {
        LockoutDecision::RetryAllowed { remaining } => {
            output::warning(&format!("{remaining} attempt(s) left before lockout."));
        }
        LockoutDecision::LockedOut { lock_out_count } => {
            let left = settings.num_lockout_retries.saturating_sub(lock_out_count);
            if left == 0 {
                output::warning(
                    "Lockout limit reached — the next unlock attempt will destroy all vault data.",
                );
            } else {
                output::warning(&format!(
                    "Too many failed attempts — login locked ({left} lockout(s) left before data is destroyed)."
                ));
            }
        }
    }
}

/// Resolve a user-supplied path against the working directory.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(path))
}
