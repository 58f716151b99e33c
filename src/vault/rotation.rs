//! Re-encrypting every vault file under a new key.
//!
//! Rotation runs in three passes:
//!
//! 1. **Verify**: read and decrypt every file under the old key.  One
//!    failure aborts the rotation before anything is written.
//! 2. **Seal**: encrypt every plaintext under the new key, in memory.
//! 3. **Commit**: write the files one by one, vault list first.  If a
//!    write fails, every file already rotated is restored from its
//!    original bytes.
//!
//! The report lists which key each file is under when rotation returns,
//! so a caller can recover by hand if a rollback itself fails.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use super::format::{self, write_atomic};
use super::list::{parse_vault_file_name, VaultList, VAULT_LIST_FILE};
use super::store::read_raw;
use crate::crypto::CryptoKey;
use crate::errors::{LedgerVaultError, Result};

/// Overall outcome of a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStatus {
    /// Every file is under the new key.
    Success,
    /// Some files are under the new key and some under the old one.
    PartialFailure,
    /// Every file is still under the old key.
    Failure,
}

/// Which key a file is encrypted under after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Old,
    New,
}

/// Per-file result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: String,
    pub key: KeyState,
    pub error: Option<String>,
}

/// Result of `rotate_crypto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub status: RotationStatus,
    pub files: Vec<FileOutcome>,
}

impl RotationReport {
    fn from_files(files: Vec<FileOutcome>) -> Self {
        let rotated = files.iter().filter(|f| f.key == KeyState::New).count();
        let status = if rotated == files.len() && files.iter().all(|f| f.error.is_none()) {
            RotationStatus::Success
        } else if rotated == 0 {
            RotationStatus::Failure
        } else {
            RotationStatus::PartialFailure
        };
        Self { status, files }
    }

    /// Number of files now under the new key.
    pub fn rotated_count(&self) -> usize {
        self.files.iter().filter(|f| f.key == KeyState::New).count()
    }

    /// First error recorded in the report.
    pub fn first_error(&self) -> Option<&str> {
        self.files.iter().find_map(|f| f.error.as_deref())
    }

    /// Turn a non-successful report into the matching error.
    pub fn into_result(self) -> Result<Self> {
        match self.status {
            RotationStatus::Success => Ok(self),
            RotationStatus::Failure => Err(LedgerVaultError::RotationFailed(
                self.first_error().unwrap_or("unknown error").to_string(),
            )),
            RotationStatus::PartialFailure => {
                let (rotated, pending): (Vec<_>, Vec<_>) =
                    self.files.into_iter().partition(|f| f.key == KeyState::New);
                Err(LedgerVaultError::PartialRotation {
                    rotated: rotated.into_iter().map(|f| f.file).collect(),
                    pending: pending.into_iter().map(|f| f.file).collect(),
                })
            }
        }
    }
}

/// A file read and verified under the old key.
struct Pending {
    file: String,
    original: Vec<u8>,
    plaintext: Zeroizing<Vec<u8>>,
}

/// Re-encrypt the vault list and every vault document in `directory`
/// from `old_key` to `new_key`.
///
/// The file set is `vaultlist.json`, then every file named in `list`,
/// then any other `zvault-<n>.json` in the directory.
pub fn rotate_crypto(
    directory: &Path,
    old_key: &CryptoKey,
    new_key: &CryptoKey,
    list: &VaultList,
) -> RotationReport {
    let files = match collect_files(directory, list) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(error = %e, "rotation aborted while listing files");
            return RotationReport {
                status: RotationStatus::Failure,
                files: vec![FileOutcome {
                    file: VAULT_LIST_FILE.to_string(),
                    key: KeyState::Old,
                    error: Some(e.to_string()),
                }],
            };
        }
    };

    // 1. Verify every file opens under the old key.
    let mut pending = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        let path = directory.join(file);
        let opened = read_raw(&path)
            .and_then(|raw| format::open_bytes(&raw, old_key).map(|plain| (raw, plain)));
        match opened {
            Ok((original, plaintext)) => pending.push(Pending {
                file: file.clone(),
                original,
                plaintext,
            }),
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "rotation aborted: file does not open under old key");
                return abort(&files, i, &e);
            }
        }
    }

    // 2. Seal everything under the new key before touching the disk.
    let mut sealed = Vec::with_capacity(pending.len());
    for (i, p) in pending.iter().enumerate() {
        match format::seal_bytes(&p.plaintext, new_key) {
            Ok(bytes) => sealed.push(bytes),
            Err(e) => return abort(&files, i, &e),
        }
    }

    // 3. Commit in order, rolling back on the first write failure.
    for (i, (p, bytes)) in pending.iter().zip(&sealed).enumerate() {
        if let Err(e) = write_atomic(&directory.join(&p.file), bytes) {
            tracing::error!(file = %p.file, error = %e, "rotation write failed, rolling back");
            return roll_back(directory, &pending, i, &e);
        }
        tracing::debug!(file = %p.file, "rotated");
    }

    tracing::info!(files = pending.len(), "key rotation complete");
    RotationReport::from_files(
        pending
            .iter()
            .map(|p| FileOutcome {
                file: p.file.clone(),
                key: KeyState::New,
                error: None,
            })
            .collect(),
    )
}

/// Nothing was written: every file is still under the old key.
fn abort(files: &[String], failed_at: usize, err: &LedgerVaultError) -> RotationReport {
    RotationReport::from_files(
        files
            .iter()
            .enumerate()
            .map(|(i, file)| FileOutcome {
                file: file.clone(),
                key: KeyState::Old,
                error: (i == failed_at).then(|| err.to_string()),
            })
            .collect(),
    )
}

/// Restore files `0..failed_at` from their original bytes.
fn roll_back(
    directory: &Path,
    pending: &[Pending],
    failed_at: usize,
    err: &LedgerVaultError,
) -> RotationReport {
    let mut outcomes = Vec::with_capacity(pending.len());

    for (i, p) in pending.iter().enumerate() {
        let outcome = if i < failed_at {
            match write_atomic(&directory.join(&p.file), &p.original) {
                Ok(()) => FileOutcome {
                    file: p.file.clone(),
                    key: KeyState::Old,
                    error: None,
                },
                Err(rollback_err) => {
                    tracing::error!(file = %p.file, error = %rollback_err, "rollback failed, file keeps the new key");
                    FileOutcome {
                        file: p.file.clone(),
                        key: KeyState::New,
                        error: Some(format!("rollback failed: {rollback_err}")),
                    }
                }
            }
        } else {
            // The failed write was atomic, so this file and the rest are untouched.
            FileOutcome {
                file: p.file.clone(),
                key: KeyState::Old,
                error: (i == failed_at).then(|| err.to_string()),
            }
        };
        outcomes.push(outcome);
    }

    RotationReport::from_files(outcomes)
}

/// Vault list first, then descriptor files, then stray vault documents.
fn collect_files(directory: &Path, list: &VaultList) -> Result<Vec<String>> {
    let mut files = vec![VAULT_LIST_FILE.to_string()];
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for v in &list.vaults {
        if seen.insert(v.file.clone()) {
            files.push(v.file.clone());
        }
    }

    let mut strays: Vec<(u32, String)> = Vec::new();
    for entry in fs::read_dir(directory)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if let Some(id) = parse_vault_file_name(&name) {
            if !seen.contains(&name) {
                strays.push((id, name));
            }
        }
    }
    strays.sort();
    files.extend(strays.into_iter().map(|(_, name)| name));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(file: &str, key: KeyState, error: Option<&str>) -> FileOutcome {
        FileOutcome {
            file: file.into(),
            key,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn status_reflects_key_mix() {
        let all_new = RotationReport::from_files(vec![
            outcome("vaultlist.json", KeyState::New, None),
            outcome("zvault-0.json", KeyState::New, None),
        ]);
        assert_eq!(all_new.status, RotationStatus::Success);

        let mixed = RotationReport::from_files(vec![
            outcome("vaultlist.json", KeyState::New, Some("rollback failed")),
            outcome("zvault-0.json", KeyState::Old, Some("disk full")),
        ]);
        assert_eq!(mixed.status, RotationStatus::PartialFailure);

        let none = RotationReport::from_files(vec![outcome(
            "vaultlist.json",
            KeyState::Old,
            Some("wrong key"),
        )]);
        assert_eq!(none.status, RotationStatus::Failure);
    }

    #[test]
    fn into_result_maps_partial_failure() {
        let mixed = RotationReport::from_files(vec![
            outcome("vaultlist.json", KeyState::New, Some("rollback failed")),
            outcome("zvault-0.json", KeyState::Old, Some("disk full")),
        ]);
        match mixed.into_result() {
            Err(LedgerVaultError::PartialRotation { rotated, pending }) => {
                assert_eq!(rotated, vec!["vaultlist.json".to_string()]);
                assert_eq!(pending, vec!["zvault-0.json".to_string()]);
            }
            other => panic!("expected PartialRotation, got {other:?}"),
        }
    }

    #[test]
    fn into_result_maps_failure_with_first_error() {
        let failed = RotationReport::from_files(vec![
            outcome("vaultlist.json", KeyState::Old, None),
            outcome("zvault-0.json", KeyState::Old, Some("wrong key")),
        ]);
        match failed.into_result() {
            Err(LedgerVaultError::RotationFailed(msg)) => assert_eq!(msg, "wrong key"),
            other => panic!("expected RotationFailed, got {other:?}"),
        }
    }

    #[test]
    fn failed_restore_leaves_a_partial_rotation() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("vaultlist.json"), b"new bytes").unwrap();
        fs::write(dir.join("zvault-0.json"), b"old bytes").unwrap();
        // Blocks the restore of vaultlist.json.
        fs::create_dir(dir.join(".vaultlist.json.tmp")).unwrap();

        let pending = ["vaultlist.json", "zvault-0.json"].map(|file| Pending {
            file: file.to_string(),
            original: b"old bytes".to_vec(),
            plaintext: Zeroizing::new(Vec::new()),
        });
        let err = LedgerVaultError::Io(std::io::Error::other("disk full"));

        let report = roll_back(dir, &pending, 1, &err);
        assert_eq!(report.status, RotationStatus::PartialFailure);
        assert_eq!(report.files[0].key, KeyState::New);
        assert!(report.files[0]
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("rollback failed")));
        assert_eq!(report.files[1].key, KeyState::Old);
        assert!(report.files[1].error.is_some());
        assert_eq!(fs::read(dir.join("vaultlist.json")).unwrap(), b"new bytes");
    }
}
