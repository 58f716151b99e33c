//! On-disk envelope for encrypted documents, and the atomic writer.
//!
//! Every encrypted file has this layout:
//!
//! ```text
//! [LVLT: 4 bytes][version: 1 byte][nonce: 12 bytes][ciphertext + tag]
//! ```
//!
//! - **Magic** (`LVLT`): identifies the file as a LedgerVault document.
//! - **Version**: format version (currently `1`).
//! - **Payload**: output of `crypto::encrypt` over the document's JSON.
//!
//! The envelope holds no salt, key or key hash.  A bad magic or version
//! is `CorruptData`; a payload that fails its tag is
//! `AuthenticationFailed`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, CryptoKey};
use crate::errors::{LedgerVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every encrypted document.
const MAGIC: &[u8; 4] = b"LVLT";

/// Current envelope version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Sealing
// ---------------------------------------------------------------------------

/// Serialize `document` to JSON and seal it into an envelope.
pub fn seal<T: Serialize + ?Sized>(document: &T, key: &CryptoKey) -> Result<Vec<u8>> {
    let json = Zeroizing::new(
        serde_json::to_vec(document)
            .map_err(|e| LedgerVaultError::SerializationError(format!("document: {e}")))?,
    );
    seal_bytes(&json, key)
}

/// Seal already-serialized plaintext into an envelope.
pub fn seal_bytes(plaintext: &[u8], key: &CryptoKey) -> Result<Vec<u8>> {
    let payload = encrypt(key, plaintext)?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Check the envelope and decrypt its payload.
pub fn open_bytes(data: &[u8], key: &CryptoKey) -> Result<Zeroizing<Vec<u8>>> {
    if data.len() < PREFIX_LEN {
        return Err(LedgerVaultError::CorruptData(
            "file too small to be a vault document".into(),
        ));
    }
    if &data[0..4] != MAGIC {
        return Err(LedgerVaultError::CorruptData(
            "missing LVLT magic bytes".into(),
        ));
    }
    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(LedgerVaultError::CorruptData(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    decrypt(key, &data[PREFIX_LEN..]).map(Zeroizing::new)
}

/// Open an envelope and parse the JSON document inside.
pub fn open<T: DeserializeOwned>(data: &[u8], key: &CryptoKey) -> Result<T> {
    let plaintext = open_bytes(data, key)?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| LedgerVaultError::CorruptData(format!("document JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Atomic write
// ---------------------------------------------------------------------------

/// Write `bytes` to `path` **atomically**.
///
/// 1. Write to a hidden temp file in the same directory.
/// 2. Flush it to disk.
/// 3. Rename it over the target.
///
/// Readers see either the old file or the new one, never a mix.  On
/// error the temp file is removed and the target is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let written = write_and_sync(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = create_private(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Create (or truncate) a file readable only by its owner.
#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
