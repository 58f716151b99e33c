//! Integration tests for the vault file store and the vault list.

use std::fs;

use ledgervault::crypto::CryptoKey;
use ledgervault::vault::list::vault_file_name;
use ledgervault::vault::{
    delete_vault, ensure_directory, init_vault_data, init_vault_list, read_vault,
    read_vault_list, save_vault, scrub_content, DirStatus, VaultData, VaultDescriptor, VaultList,
    VAULT_LIST_FILE,
};
use ledgervault::LedgerVaultError;
use serde_json::json;
use tempfile::TempDir;

fn key() -> CryptoKey {
    CryptoKey::from_bytes([0x11; 32])
}

fn descriptor(list: &VaultList, name: &str) -> VaultDescriptor {
    let next = list.next_vault_file();
    VaultDescriptor {
        id: next.id,
        file: next.file_name,
        path: String::new(),
        name: name.to_string(),
    }
}

#[test]
fn fresh_directory_bootstrap() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("vault");

    assert_eq!(ensure_directory(&dir).unwrap(), DirStatus::Created);
    init_vault_list(&dir, &key()).unwrap();
    init_vault_data(&dir, &vault_file_name(0), &key()).unwrap();

    let list = read_vault_list(&dir.join(VAULT_LIST_FILE), &key()).unwrap();
    assert!(list.vaults.is_empty());
    assert_eq!(list.vault_selected, None);

    let data: VaultData = read_vault(&dir.join("zvault-0.json"), &key()).unwrap();
    assert_eq!(data.file(), Some("zvault-0.json"));

    assert_eq!(ensure_directory(&dir).unwrap(), DirStatus::AlreadyExisted);
}

#[test]
fn save_and_read_document() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("zvault-3.json");
    let doc = VaultData::from(json!({"income": [{"month": "2024-01", "amount": 3000}]}));

    save_vault(&path, &doc, &key()).unwrap();
    let raw = fs::read(&path).unwrap();
    assert!(!String::from_utf8_lossy(&raw).contains("income"));

    let back: VaultData = read_vault(&path, &key()).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn read_with_wrong_key_is_authentication_failure() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("zvault-0.json");
    save_vault(&path, &json!({"a": 1}), &key()).unwrap();

    let err = read_vault::<VaultData>(&path, &CryptoKey::from_bytes([0x22; 32])).unwrap_err();
    assert!(matches!(err, LedgerVaultError::AuthenticationFailed));
}

#[test]
fn read_missing_and_corrupt_files() {
    let tmp = TempDir::new().unwrap();

    let missing = tmp.path().join("zvault-9.json");
    assert!(matches!(
        read_vault::<VaultData>(&missing, &key()),
        Err(LedgerVaultError::NotFound(_))
    ));

    let garbage = tmp.path().join("zvault-8.json");
    fs::write(&garbage, b"plain text, not a vault").unwrap();
    assert!(matches!(
        read_vault::<VaultData>(&garbage, &key()),
        Err(LedgerVaultError::CorruptData(_))
    ));
}

#[test]
fn delete_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("zvault-0.json");
    save_vault(&path, &json!({}), &key()).unwrap();

    delete_vault(&path).unwrap();
    assert!(!path.exists());
    delete_vault(&path).unwrap();
}

#[test]
fn scrub_removes_everything_but_the_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("vault");
    ensure_directory(&dir).unwrap();
    init_vault_list(&dir, &key()).unwrap();
    init_vault_data(&dir, "zvault-0.json", &key()).unwrap();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("nested").join("extra.bin"), vec![7u8; 4096]).unwrap();

    let removed = scrub_content(&dir).unwrap();
    assert_eq!(removed, 3);
    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn scrub_of_missing_directory_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(scrub_content(&tmp.path().join("absent")).unwrap(), 0);
}

#[test]
fn repeated_inserts_never_reuse_live_file_names() {
    let mut list = VaultList::default();
    for i in 0..20 {
        let d = descriptor(&list, &format!("vault {i}"));
        list.insert(d).unwrap();
    }

    let mut files: Vec<_> = list.vaults.iter().map(|v| v.file.clone()).collect();
    files.sort();
    files.dedup();
    assert_eq!(files.len(), 20);

    // Freed ids are handed out again.
    list.remove(4).unwrap();
    let next = list.next_vault_file();
    assert_eq!(next.id, 4);
    assert_eq!(next.file_name, "zvault-4.json");
}

#[test]
fn list_stays_sorted_and_selects_latest() {
    let mut list = VaultList::default();
    for name in ["pension", "Bank", "cash"] {
        let d = descriptor(&list, name);
        list.insert(d).unwrap();
    }

    let names: Vec<_> = list.vaults.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["Bank", "cash", "pension"]);
    assert_eq!(list.selected().map(|v| v.name.as_str()), Some("cash"));

    let mut renamed = list.find(0).cloned().unwrap();
    renamed.name = "Alpha".into();
    list.update(renamed).unwrap();
    assert_eq!(list.vaults[0].name, "Alpha");
    assert_eq!(list.selected().map(|v| v.id), Some(0));
}

#[test]
fn update_of_unknown_id_leaves_list_untouched() {
    let mut list = VaultList::default();
    let d = descriptor(&list, "Only");
    list.insert(d).unwrap();
    let before = list.clone();

    let ghost = VaultDescriptor {
        id: 77,
        file: "zvault-77.json".into(),
        path: String::new(),
        name: "Ghost".into(),
    };
    assert!(matches!(
        list.update(ghost),
        Err(LedgerVaultError::VaultNotFound(77))
    ));
    assert_eq!(list, before);
}

#[test]
fn vault_list_json_uses_camel_case() {
    let mut list = VaultList::default();
    let d = descriptor(&list, "Main");
    list.insert(d).unwrap();

    let json = serde_json::to_value(&list).unwrap();
    assert_eq!(json["vaultSelected"], 0);
    assert_eq!(json["vaults"][0]["file"], "zvault-0.json");
}
