//! The vault list: which vaults exist, their files, display order and
//! the current selection.
//!
//! Stored encrypted as `vaultlist.json`.  Every mutation re-sorts the
//! descriptors by display name (case-insensitive) and points
//! `vault_selected` at the entry that was touched.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::store;
use crate::crypto::CryptoKey;
use crate::errors::{LedgerVaultError, Result};

/// File name of the encrypted vault list inside the vault directory.
pub const VAULT_LIST_FILE: &str = "vaultlist.json";

/// Prefix of per-vault document files (`zvault-<id>.json`).
pub const VAULT_FILE_PREFIX: &str = "zvault-";

/// One entry in the vault list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDescriptor {
    /// Unique numeric id.
    pub id: u32,
    /// Document file name inside the vault directory.
    pub file: String,
    /// Vault directory the document was created in.
    #[serde(default)]
    pub path: String,
    /// Display label.
    pub name: String,
}

/// Id and file name for the next vault to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextVaultFile {
    pub id: u32,
    pub file_name: String,
}

/// Ordered descriptors plus the selected index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultList {
    #[serde(default)]
    pub vaults: Vec<VaultDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_selected: Option<usize>,
}

/// File name for a vault id.
pub fn vault_file_name(id: u32) -> String {
    format!("{VAULT_FILE_PREFIX}{id}.json")
}

/// Parse the id back out of a `zvault-<id>.json` file name.
pub fn parse_vault_file_name(name: &str) -> Option<u32> {
    name.strip_prefix(VAULT_FILE_PREFIX)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

impl VaultList {
    /// Smallest unused id whose file name is also unused.
    ///
    /// Ids freed by deletion are handed out again.
    pub fn next_vault_file(&self) -> NextVaultFile {
        let ids: HashSet<u32> = self.vaults.iter().map(|v| v.id).collect();
        let files: HashSet<&str> = self.vaults.iter().map(|v| v.file.as_str()).collect();

        let mut id = 0u32;
        loop {
            let file_name = vault_file_name(id);
            if !ids.contains(&id) && !files.contains(file_name.as_str()) {
                return NextVaultFile { id, file_name };
            }
            id += 1;
        }
    }

    /// Append a descriptor, re-sort and select it.
    ///
    /// An id or file already in the list is an error and leaves the
    /// list untouched.
    pub fn insert(&mut self, descriptor: VaultDescriptor) -> Result<()> {
        self.check_unique(&descriptor, None)?;
        let id = descriptor.id;
        self.vaults.push(descriptor);
        self.sort_and_select(id);
        Ok(())
    }

    /// Replace the descriptor with the same id, re-sort and select it.
    ///
    /// Unknown ids, and files owned by another entry, are errors and
    /// leave the list untouched.
    pub fn update(&mut self, descriptor: VaultDescriptor) -> Result<()> {
        let id = descriptor.id;
        self.check_unique(&descriptor, Some(id))?;
        let slot = self
            .vaults
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(LedgerVaultError::VaultNotFound(id))?;
        *slot = descriptor;
        self.sort_and_select(id);
        Ok(())
    }

    /// Remove the descriptor with `id` and return it.
    ///
    /// The selection stays on the same entry when it survives, and is
    /// clamped into range otherwise.
    pub fn remove(&mut self, id: u32) -> Result<VaultDescriptor> {
        let index = self
            .vaults
            .iter()
            .position(|v| v.id == id)
            .ok_or(LedgerVaultError::VaultNotFound(id))?;
        let removed = self.vaults.remove(index);

        self.vault_selected = match self.vault_selected {
            _ if self.vaults.is_empty() => None,
            Some(sel) if sel > index => Some(sel - 1),
            Some(sel) => Some(sel.min(self.vaults.len() - 1)),
            None => None,
        };
        Ok(removed)
    }

    /// Look up a descriptor by id.
    pub fn find(&self, id: u32) -> Option<&VaultDescriptor> {
        self.vaults.iter().find(|v| v.id == id)
    }

    /// The currently selected descriptor, if any.
    pub fn selected(&self) -> Option<&VaultDescriptor> {
        self.vault_selected.and_then(|i| self.vaults.get(i))
    }

    /// `descriptor` must not share an id or file with any entry other
    /// than `replacing`.
    fn check_unique(&self, descriptor: &VaultDescriptor, replacing: Option<u32>) -> Result<()> {
        for v in self.vaults.iter().filter(|v| Some(v.id) != replacing) {
            if v.id == descriptor.id {
                return Err(LedgerVaultError::DuplicateVault(format!("id {}", v.id)));
            }
            if v.file == descriptor.file {
                return Err(LedgerVaultError::DuplicateVault(format!(
                    "file '{}'",
                    v.file
                )));
            }
        }
        Ok(())
    }

    fn sort_and_select(&mut self, id: u32) {
        self.vaults.sort_by_cached_key(|v| v.name.to_lowercase());
        self.vault_selected = self.vaults.iter().position(|v| v.id == id);
    }

    /// Reject duplicate ids/files and pull the selection back into range.
    fn normalise(mut self) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut files = HashSet::new();
        for v in &self.vaults {
            if !ids.insert(v.id) {
                return Err(LedgerVaultError::CorruptData(format!(
                    "duplicate vault id {} in vault list",
                    v.id
                )));
            }
            if !files.insert(v.file.as_str()) {
                return Err(LedgerVaultError::CorruptData(format!(
                    "duplicate vault file '{}' in vault list",
                    v.file
                )));
            }
        }

        self.vault_selected = match self.vault_selected {
            _ if self.vaults.is_empty() => None,
            Some(sel) if sel >= self.vaults.len() => Some(self.vaults.len() - 1),
            other => other,
        };
        Ok(self)
    }
}

/// Decrypt and parse the vault list at `path`.
pub fn read_vault_list(path: &Path, key: &CryptoKey) -> Result<VaultList> {
    let list: VaultList = store::read_vault(path, key)?;
    list.normalise()
}
