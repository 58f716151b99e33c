//! The caller-facing context for one vault store.
//!
//! A `Session` owns the two directories and the current `Settings`;
//! nothing in the crate keeps state anywhere else.  Each method is a
//! straight pipeline of fallible steps that stops at the first error.
//! The key is passed into every call and never stored.
//!
//! Methods that write take `&mut self`, so while `rotate` runs nothing
//! else can use the same session.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::Settings;
use crate::crypto::{self, CryptoKey};
use crate::errors::{LedgerVaultError, Result};
use crate::security::{EntryCheck, LockoutDecision, LockoutPolicy, LockoutState};
use crate::vault::list::{read_vault_list, vault_file_name};
use crate::vault::{
    self, rotate_crypto, DirStatus, RotationReport, VaultData, VaultDescriptor, VaultList,
    VAULT_LIST_FILE,
};

/// Result of `Session::unlock`.
#[derive(Debug)]
pub enum UnlockOutcome {
    /// The key opened the vault list.  `first_run` is set when the
    /// store was bootstrapped by this call.
    Unlocked { list: VaultList, first_run: bool },
    /// The key was wrong; counters were updated and saved.
    Rejected { decision: LockoutDecision },
    /// Lockout retries were exhausted: the vault directory was wiped.
    Destroyed,
}

/// Vault directory, settings directory and loaded settings.
#[derive(Debug)]
pub struct Session {
    vault_dir: PathBuf,
    settings_dir: PathBuf,
    settings: Settings,
}

impl Session {
    /// Load the settings for a vault store.
    pub fn open(vault_dir: impl Into<PathBuf>, settings_dir: impl Into<PathBuf>) -> Result<Self> {
        let settings_dir = settings_dir.into();
        let settings = Settings::load(&settings_dir)?;
        Ok(Self {
            vault_dir: vault_dir.into(),
            settings_dir,
            settings,
        })
    }

    /// Directory holding the encrypted vault files.
    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    /// Directory holding `settings.toml` and the audit log.
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Settings as last loaded or saved.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Where the lockout policy currently stands.
    pub fn lockout_state(&self) -> LockoutState {
        LockoutPolicy::state(&self.settings)
    }

    /// Whether the vault list exists on disk.
    pub fn is_initialised(&self) -> bool {
        self.vault_dir.join(VAULT_LIST_FILE).is_file()
    }

    /// Stretch a password into the document key.
    ///
    /// Generates and saves the installation's KDF salt on first use.
    pub fn derive_key(&mut self, password: &[u8]) -> Result<CryptoKey> {
        if self.settings.ensure_kdf_salt() {
            self.settings.save(&self.settings_dir)?;
        }
        let salt = self
            .settings
            .kdf_salt()?
            .ok_or_else(|| LedgerVaultError::ConfigError("missing kdfSalt".into()))?;
        crypto::derive_key(password, &salt, &self.settings.argon2_params())
    }

    /// Try `key` against the vault list, applying the lockout policy.
    ///
    /// 1. If lockout retries are exhausted, wipe the vault directory,
    ///    reset the counters and report `Destroyed`.
    /// 2. Create the directory and bootstrap an empty store when it
    ///    holds neither a vault list nor any vault document.  Documents
    ///    without a list are `NotFound`: they are never overwritten.
    /// 3. Read the vault list.  Success clears the counters; a wrong key
    ///    counts as a failed attempt.  Settings are saved either way.
    pub fn unlock(&mut self, key: &CryptoKey) -> Result<UnlockOutcome> {
        if LockoutPolicy::check_entry(&self.settings) == EntryCheck::Destroy {
            return self.destroy();
        }

        let status = vault::ensure_directory(&self.vault_dir)?;
        let first_run = status == DirStatus::Created || !self.is_initialised();
        if first_run && vault::holds_vault_documents(&self.vault_dir)? {
            tracing::warn!(path = %self.vault_dir.display(), "vault documents present without a vault list");
            return Err(LedgerVaultError::NotFound(
                self.vault_dir.join(VAULT_LIST_FILE),
            ));
        }
        if first_run {
            tracing::info!(path = %self.vault_dir.display(), "bootstrapping empty vault store");
            vault::init_vault_list(&self.vault_dir, key)?;
            vault::init_vault_data(&self.vault_dir, &vault_file_name(0), key)?;
        }

        match read_vault_list(&self.vault_dir.join(VAULT_LIST_FILE), key) {
            Ok(list) => {
                LockoutPolicy::record_success(&mut self.settings);
                self.settings.save(&self.settings_dir)?;
                self.audit("unlock", None, first_run.then_some("initialised"));
                Ok(UnlockOutcome::Unlocked { list, first_run })
            }
            Err(LedgerVaultError::AuthenticationFailed) => {
                let decision = LockoutPolicy::record_failure(&mut self.settings, Utc::now());
                self.settings.save(&self.settings_dir)?;
                match decision {
                    LockoutDecision::RetryAllowed { remaining } => self.audit(
                        "unlock-failed",
                        None,
                        Some(&format!("{remaining} attempt(s) before lockout")),
                    ),
                    LockoutDecision::LockedOut { lock_out_count } => self.audit(
                        "lockout",
                        None,
                        Some(&format!(
                            "lockout {lock_out_count} of {}",
                            self.settings.num_lockout_retries
                        )),
                    ),
                }
                Ok(UnlockOutcome::Rejected { decision })
            }
            Err(e) => Err(e),
        }
    }

    /// The only caller of `scrub_content`.
    fn destroy(&mut self) -> Result<UnlockOutcome> {
        tracing::warn!(path = %self.vault_dir.display(), "lockout retries exhausted, destroying vault data");
        let removed = vault::scrub_content(&self.vault_dir)?;

        LockoutPolicy::record_destroyed(&mut self.settings);
        self.settings.save(&self.settings_dir)?;
        self.audit(
            "lockout-destroy",
            None,
            Some(&format!("{removed} file(s) destroyed")),
        );
        Ok(UnlockOutcome::Destroyed)
    }

    /// Add a vault named `name`: assign an id and file, write the empty
    /// document, then save the list.
    ///
    /// `list` is only updated once both writes succeeded.
    pub fn create_vault(
        &mut self,
        key: &CryptoKey,
        list: &mut VaultList,
        name: &str,
    ) -> Result<(VaultDescriptor, VaultData)> {
        let name = validate_vault_name(name)?;
        let next = list.next_vault_file();
        let descriptor = VaultDescriptor {
            id: next.id,
            file: next.file_name,
            path: self.vault_dir.display().to_string(),
            name: name.to_string(),
        };

        let mut updated = list.clone();
        updated.insert(descriptor.clone())?;

        // The file is not in the list, so anything already there is the
        // bootstrap placeholder or a leftover from an interrupted create.
        let data = VaultData::empty(&descriptor.file);
        vault::save_vault(&self.document_path(&descriptor.file)?, &data, key)?;
        self.save_list(key, &updated)?;
        *list = updated;

        self.audit("vault-create", Some(&descriptor.file), None);
        Ok((descriptor, data))
    }

    /// Replace a descriptor (e.g. a rename) and save the list.
    pub fn modify_vault(
        &mut self,
        key: &CryptoKey,
        list: &mut VaultList,
        descriptor: VaultDescriptor,
    ) -> Result<()> {
        validate_vault_name(&descriptor.name)?;
        self.document_path(&descriptor.file)?;

        let file = descriptor.file.clone();
        let mut updated = list.clone();
        updated.update(descriptor)?;
        self.save_list(key, &updated)?;
        *list = updated;

        self.audit("vault-modify", Some(&file), None);
        Ok(())
    }

    /// Drop a vault from the list, save the list, then delete its file.
    pub fn delete_vault(
        &mut self,
        key: &CryptoKey,
        list: &mut VaultList,
        id: u32,
    ) -> Result<VaultDescriptor> {
        let mut updated = list.clone();
        let removed = updated.remove(id)?;
        let path = self.document_path(&removed.file)?;

        self.save_list(key, &updated)?;
        *list = updated;
        vault::delete_vault(&path)?;

        self.audit("vault-delete", Some(&removed.file), None);
        Ok(removed)
    }

    /// Encrypt and store a vault document.
    pub fn save_vault_data(&mut self, key: &CryptoKey, file: &str, data: &VaultData) -> Result<()> {
        let path = self.document_path(file)?;
        vault::save_vault(&path, data, key)?;
        self.audit("vault-save", Some(file), None);
        Ok(())
    }

    /// Read and decrypt a vault document.
    pub fn read_vault_data(&self, key: &CryptoKey, file: &str) -> Result<VaultData> {
        let path = self.document_path(file)?;
        vault::read_vault(&path, key)
    }

    /// Re-encrypt the whole store from `old_key` to `new_key`.
    pub fn rotate(
        &mut self,
        old_key: &CryptoKey,
        new_key: &CryptoKey,
        list: &VaultList,
    ) -> RotationReport {
        let report = rotate_crypto(&self.vault_dir, old_key, new_key, list);
        self.audit(
            "rotate-key",
            None,
            Some(&format!(
                "{:?}: {} of {} file(s) re-encrypted",
                report.status,
                report.rotated_count(),
                report.files.len()
            )),
        );
        report
    }

    /// Change the lockout thresholds and save them.
    pub fn update_thresholds(
        &mut self,
        num_fail_attempts: Option<u32>,
        num_lockout_retries: Option<u32>,
    ) -> Result<()> {
        let mut updated = self.settings.clone();
        if let Some(n) = num_fail_attempts {
            updated.num_fail_attempts = n;
        }
        if let Some(n) = num_lockout_retries {
            updated.num_lockout_retries = n;
        }
        updated.save(&self.settings_dir)?;
        self.settings = updated;

        self.audit("settings", None, None);
        Ok(())
    }

    fn save_list(&self, key: &CryptoKey, list: &VaultList) -> Result<()> {
        vault::save_vault(&self.vault_dir.join(VAULT_LIST_FILE), list, key)
    }

    /// Resolve a document file name, refusing anything but a bare name.
    fn document_path(&self, file: &str) -> Result<PathBuf> {
        let bare = Path::new(file).file_name().and_then(|n| n.to_str()) == Some(file);
        if !bare || file == VAULT_LIST_FILE {
            return Err(LedgerVaultError::CorruptData(format!(
                "invalid vault file name '{file}'"
            )));
        }
        Ok(self.vault_dir.join(file))
    }

    fn audit(&self, op: &str, vault_file: Option<&str>, details: Option<&str>) {
        #[cfg(feature = "audit-log")]
        crate::audit::log_audit(&self.settings_dir, op, vault_file, details);

        #[cfg(not(feature = "audit-log"))]
        let _ = (op, vault_file, details);
    }
}

/// Display names must contain something besides whitespace.
fn validate_vault_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerVaultError::CommandFailed(
            "vault name cannot be empty".into(),
        ));
    }
    if trimmed.chars().count() > 128 {
        return Err(LedgerVaultError::CommandFailed(
            "vault name cannot exceed 128 characters".into(),
        ));
    }
    Ok(trimmed)
}
