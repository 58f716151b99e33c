//! Vault module — encrypted document storage.
//!
//! This module provides:
//! - The encrypted file envelope and atomic writer (`format`)
//! - File-level create/read/write/delete/scrub (`store`)
//! - The vault list and id assignment (`list`)
//! - The opaque vault document type (`data`)
//! - Whole-directory key rotation (`rotation`)

pub mod data;
pub mod format;
pub mod list;
pub mod rotation;
pub mod store;

pub use data::VaultData;
pub use list::{read_vault_list, NextVaultFile, VaultDescriptor, VaultList, VAULT_LIST_FILE};
pub use rotation::{rotate_crypto, FileOutcome, KeyState, RotationReport, RotationStatus};
pub use store::{
    delete_vault, ensure_directory, holds_vault_documents, init_vault_data, init_vault_list,
    read_vault, save_vault, scrub_content, DirStatus,
};
