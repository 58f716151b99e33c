//! File-level vault operations.
//!
//! Each function takes the paths and key it needs and touches nothing
//! else; there is no cached state between calls.  Callers must not run
//! two writers against the same vault directory at once.

use std::fs;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::data::VaultData;
use super::format::{self, write_atomic};
use super::list::{parse_vault_file_name, VaultList, VAULT_LIST_FILE};
use crate::crypto::CryptoKey;
use crate::errors::{LedgerVaultError, Result};

/// Outcome of `ensure_directory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    /// The directory did not exist and was created (first run).
    Created,
    /// The directory was already there.
    AlreadyExisted,
}

/// Create the vault directory if it does not exist yet.
pub fn ensure_directory(path: &Path) -> Result<DirStatus> {
    if path.is_dir() {
        return Ok(DirStatus::AlreadyExisted);
    }
    fs::create_dir_all(path)?;
    tracing::info!(path = %path.display(), "created vault directory");
    Ok(DirStatus::Created)
}

/// Encrypt `document` under `key` and write it atomically to `path`.
///
/// On any error the previous file at `path`, if there was one, is left
/// exactly as it was.
pub fn save_vault<T: Serialize + ?Sized>(path: &Path, document: &T, key: &CryptoKey) -> Result<()> {
    let sealed = format::seal(document, key)?;
    write_atomic(path, &sealed)?;
    tracing::debug!(path = %path.display(), bytes = sealed.len(), "saved encrypted document");
    Ok(())
}

/// Read and decrypt the document at `path`.
pub fn read_vault<T: DeserializeOwned>(path: &Path, key: &CryptoKey) -> Result<T> {
    let data = read_raw(path)?;
    format::open(&data, key)
}

/// Read a file's raw bytes, mapping a missing file to `NotFound`.
pub fn read_raw(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LedgerVaultError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a vault document.  A file that is already gone counts as
/// deleted.
pub fn delete_vault(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "deleted vault document");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Irreversibly destroy everything under `directory`.
///
/// Each regular file is overwritten with zeros and then removed;
/// sub-directories are emptied and removed.  The walk carries on past
/// individual failures and reports all of them together.  `directory`
/// itself is kept.  Returns the number of files removed.
pub fn scrub_content(directory: &Path) -> Result<usize> {
    let mut removed = 0;
    let mut failed = Vec::new();

    scrub_dir(directory, &mut removed, &mut failed)?;

    if failed.is_empty() {
        tracing::warn!(path = %directory.display(), removed, "vault directory scrubbed");
        Ok(removed)
    } else {
        tracing::error!(
            path = %directory.display(),
            removed,
            failed = failed.len(),
            "vault directory scrub incomplete"
        );
        Err(LedgerVaultError::ScrubIncomplete(failed))
    }
}

fn scrub_dir(dir: &Path, removed: &mut usize, failed: &mut Vec<PathBuf>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(_) => {
                failed.push(dir.to_path_buf());
                continue;
            }
        };

        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(_) => {
                failed.push(path);
                continue;
            }
        };

        if meta.is_dir() {
            let before = failed.len();
            if scrub_dir(&path, removed, failed).is_err() {
                failed.push(path);
                continue;
            }
            if failed.len() == before && fs::remove_dir(&path).is_err() {
                failed.push(path);
            }
            continue;
        }

        if meta.is_file() {
            // Best effort: a file we cannot overwrite may still be removable.
            if let Err(e) = overwrite_with_zeros(&path, meta.len()) {
                tracing::debug!(path = %path.display(), error = %e, "zero pass skipped");
            }
        }
        match fs::remove_file(&path) {
            Ok(()) => *removed += 1,
            Err(_) => failed.push(path),
        }
    }
    Ok(())
}

fn overwrite_with_zeros(path: &Path, len: u64) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(0))?;

    let zeros = [0u8; 4096];
    let mut left = len;
    while left > 0 {
        let n = usize::try_from(left.min(zeros.len() as u64)).unwrap_or(zeros.len());
        file.write_all(&zeros[..n])?;
        left -= n as u64;
    }
    file.sync_all()
}

/// Whether `directory` holds any `zvault-<n>.json` document.
///
/// A missing directory holds none.
pub fn holds_vault_documents(directory: &Path) -> Result<bool> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let name = entry?.file_name();
        if parse_vault_file_name(&name.to_string_lossy()).is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Write an empty vault list to `<directory>/vaultlist.json`.
///
/// Refuses to replace an existing list.
pub fn init_vault_list(directory: &Path, key: &CryptoKey) -> Result<VaultList> {
    let path = directory.join(VAULT_LIST_FILE);
    refuse_existing(&path)?;
    let list = VaultList::default();
    save_vault(&path, &list, key)?;
    Ok(list)
}

/// Write an empty vault document to `<directory>/<file_name>`.
///
/// Refuses to replace an existing document.
pub fn init_vault_data(directory: &Path, file_name: &str, key: &CryptoKey) -> Result<VaultData> {
    let path = directory.join(file_name);
    refuse_existing(&path)?;
    let data = VaultData::empty(file_name);
    save_vault(&path, &data, key)?;
    Ok(data)
}

fn refuse_existing(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(LedgerVaultError::VaultAlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> CryptoKey {
        CryptoKey::from_bytes([5u8; 32])
    }

    #[test]
    fn ensure_directory_reports_first_run() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("vault");
        assert_eq!(ensure_directory(&dir).unwrap(), DirStatus::Created);
        assert_eq!(ensure_directory(&dir).unwrap(), DirStatus::AlreadyExisted);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = read_vault::<VaultData>(&tmp.path().join("zvault-0.json"), &key()).unwrap_err();
        assert!(matches!(err, LedgerVaultError::NotFound(_)));
    }

    #[test]
    fn delete_missing_file_is_ok() {
        let tmp = TempDir::new().unwrap();
        assert!(delete_vault(&tmp.path().join("nothing.json")).is_ok());
    }

    #[test]
    fn scrub_removes_nested_content_but_keeps_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("a.json"), b"aaaa").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("b.json"), b"bb").unwrap();

        let removed = scrub_content(root).unwrap();
        assert_eq!(removed, 2);
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(root).unwrap().count(), 0);
    }

    #[test]
    fn scrub_of_missing_directory_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(scrub_content(&tmp.path().join("gone")).unwrap(), 0);
    }

    #[test]
    fn init_refuses_to_replace_existing_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let doc = serde_json::json!({"keep": true});
        save_vault(&dir.join("zvault-0.json"), &doc, &key()).unwrap();
        let before = fs::read(dir.join("zvault-0.json")).unwrap();

        let other = CryptoKey::from_bytes([6u8; 32]);
        assert!(matches!(
            init_vault_data(dir, "zvault-0.json", &other),
            Err(LedgerVaultError::VaultAlreadyExists(_))
        ));
        assert_eq!(fs::read(dir.join("zvault-0.json")).unwrap(), before);

        init_vault_list(dir, &key()).unwrap();
        assert!(matches!(
            init_vault_list(dir, &other),
            Err(LedgerVaultError::VaultAlreadyExists(_))
        ));
    }

    #[test]
    fn holds_vault_documents_ignores_other_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        assert!(!holds_vault_documents(&dir.join("missing")).unwrap());

        fs::write(dir.join(".zvault-0.json.tmp"), b"x").unwrap();
        fs::write(dir.join("notes.txt"), b"x").unwrap();
        assert!(!holds_vault_documents(dir).unwrap());

        fs::write(dir.join("zvault-3.json"), b"x").unwrap();
        assert!(holds_vault_documents(dir).unwrap());
    }
}
