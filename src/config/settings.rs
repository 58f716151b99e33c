use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{generate_salt, Argon2Params};
use crate::errors::{LedgerVaultError, Result};
use crate::vault::format::write_atomic;

/// Persisted lockout state and key-derivation parameters, stored as
/// `<settings_dir>/settings.toml`.
///
/// Lives outside the vault directory so a destructive wipe of the
/// vaults leaves it in place.  Every field has a default, so a missing
/// file means "first run".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Consecutive failed unlocks since the last success or lockout.
    #[serde(default)]
    pub fail_attempt_count: u32,

    /// Failures that trigger a lockout (default: 5).
    #[serde(default = "default_num_fail_attempts")]
    pub num_fail_attempts: u32,

    /// Lockouts since the last successful unlock.
    #[serde(default)]
    pub lock_out_count: u32,

    /// Lockouts that trigger the destructive wipe (default: 3).
    #[serde(default = "default_num_lockout_retries")]
    pub num_lockout_retries: u32,

    /// Set when the last failure crossed `num_fail_attempts`.
    #[serde(default)]
    pub lock_login: bool,

    /// When `lock_login` was last set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_login_time: Option<DateTime<Utc>>,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Base64 salt for password derivation; generated on first use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf_salt: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_num_fail_attempts() -> u32 {
    5
}

fn default_num_lockout_retries() -> u32 {
    3
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            fail_attempt_count: 0,
            num_fail_attempts: default_num_fail_attempts(),
            lock_out_count: 0,
            num_lockout_retries: default_num_lockout_retries(),
            lock_login: false,
            lock_login_time: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            kdf_salt: None,
        }
    }
}

impl Settings {
    /// Name of the settings file inside the settings directory.
    pub const FILE_NAME: &'static str = "settings.toml";

    /// Full path of the settings file.
    pub fn path(settings_dir: &Path) -> PathBuf {
        settings_dir.join(Self::FILE_NAME)
    }

    /// Load settings from `<settings_dir>/settings.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If it exists but cannot be parsed or holds zero thresholds, an
    /// error is returned.
    pub fn load(settings_dir: &Path) -> Result<Self> {
        let config_path = Self::path(settings_dir);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            LedgerVaultError::ConfigError(format!(
                "Failed to parse {}: {e}",
                config_path.display()
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Write settings atomically, creating the directory if needed.
    pub fn save(&self, settings_dir: &Path) -> Result<()> {
        self.validate()?;
        std::fs::create_dir_all(settings_dir)?;

        let contents = toml::to_string_pretty(self)
            .map_err(|e| LedgerVaultError::ConfigError(format!("Failed to encode settings: {e}")))?;

        write_atomic(&Self::path(settings_dir), contents.as_bytes())?;
        tracing::debug!(dir = %settings_dir.display(), "settings saved");
        Ok(())
    }

    /// Both thresholds must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.num_fail_attempts == 0 {
            return Err(LedgerVaultError::ConfigError(
                "numFailAttempts must be at least 1".into(),
            ));
        }
        if self.num_lockout_retries == 0 {
            return Err(LedgerVaultError::ConfigError(
                "numLockoutRetries must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Decode the stored KDF salt, if one has been generated.
    pub fn kdf_salt(&self) -> Result<Option<Vec<u8>>> {
        self.kdf_salt
            .as_deref()
            .map(|s| {
                BASE64
                    .decode(s)
                    .map_err(|e| LedgerVaultError::ConfigError(format!("invalid kdfSalt: {e}")))
            })
            .transpose()
    }

    /// Generate a salt if none is stored.  Returns `true` when the
    /// settings changed and need saving.
    pub fn ensure_kdf_salt(&mut self) -> bool {
        if self.kdf_salt.is_some() {
            return false;
        }
        self.kdf_salt = Some(BASE64.encode(generate_salt()));
        true
    }
}

// ── Tests ────────────────────────────────────────────────────────────
