use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in LedgerVault.
#[derive(Debug, Error)]
pub enum LedgerVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// The only password check there is: the key did not open the document.
    #[error("Decryption failed — wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Storage errors ---
    #[error("File not found at {0}")]
    NotFound(PathBuf),

    #[error("Vault with id {0} not found in the vault list")]
    VaultNotFound(u32),

    #[error("Vault list already has an entry with {0}")]
    DuplicateVault(String),

    #[error("Vault store already initialised at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Corrupt vault data: {0}")]
    CorruptData(String),

    #[error("Scrub incomplete — {} file(s) could not be removed", .0.len())]
    ScrubIncomplete(Vec<PathBuf>),

    // --- Rotation errors ---
    #[error("Key rotation aborted, no files were changed: {0}")]
    RotationFailed(String),

    #[error(
        "Key rotation partially failed — {} file(s) use the new key, {} still use the old key",
        .rotated.len(),
        .pending.len()
    )]
    PartialRotation {
        rotated: Vec<String>,
        pending: Vec<String>,
    },

    // --- Lockout ---
    #[error("Lock out retries exhausted — your vault data has been destroyed")]
    VaultDestroyed,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for LedgerVault results.
pub type Result<T> = std::result::Result<T, LedgerVaultError>;
