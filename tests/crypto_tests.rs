//! Integration tests for the LedgerVault crypto module and file envelope.

use ledgervault::crypto::{decrypt, derive_key, encrypt, generate_salt, Argon2Params, CryptoKey};
use ledgervault::vault::format::{open, seal};
use ledgervault::vault::VaultData;
use ledgervault::LedgerVaultError;
use serde_json::json;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Codec round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = CryptoKey::from_bytes([0xAB; 32]);
    let plaintext = br#"{"accounts":[{"bank":"ACME"}]}"#;

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // 12-byte nonce + 16-byte tag.
    assert_eq!(ciphertext.len(), plaintext.len() + 28);

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = CryptoKey::from_bytes([0xCD; 32]);
    let ct1 = encrypt(&key, b"same").unwrap();
    let ct2 = encrypt(&key, b"same").unwrap();
    assert_ne!(ct1, ct2, "fresh nonce per call");
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let ct = encrypt(&CryptoKey::from_bytes([1; 32]), b"secret").unwrap();
    let err = decrypt(&CryptoKey::from_bytes([2; 32]), &ct).unwrap_err();
    assert!(matches!(err, LedgerVaultError::AuthenticationFailed));
}

#[test]
fn decrypt_with_truncated_data_fails() {
    let key = CryptoKey::from_bytes([3; 32]);
    assert!(matches!(
        decrypt(&key, &[0u8; 10]),
        Err(LedgerVaultError::AuthenticationFailed)
    ));
}

#[test]
fn decrypt_with_corrupted_ciphertext_fails() {
    let key = CryptoKey::from_bytes([4; 32]);
    let mut ct = encrypt(&key, b"balance=100").unwrap();
    let last = ct.len() - 1;
    ct[last] ^= 0xFF;
    assert!(matches!(
        decrypt(&key, &ct),
        Err(LedgerVaultError::AuthenticationFailed)
    ));
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_key_is_deterministic_per_salt() {
    let salt = generate_salt();
    let k1 = derive_key(b"hunter2-hunter2", &salt, &fast_params()).unwrap();
    let k2 = derive_key(b"hunter2-hunter2", &salt, &fast_params()).unwrap();
    assert_eq!(k1.as_bytes(), k2.as_bytes());

    let other = derive_key(b"hunter2-hunter2", &generate_salt(), &fast_params()).unwrap();
    assert_ne!(k1.as_bytes(), other.as_bytes());
}

#[test]
fn derived_keys_from_different_passwords_do_not_open_each_other() {
    let salt = generate_salt();
    let right = derive_key(b"right password", &salt, &fast_params()).unwrap();
    let wrong = derive_key(b"wrong password", &salt, &fast_params()).unwrap();

    let sealed = seal(&VaultData::empty("zvault-0.json"), &right).unwrap();
    let err = open::<VaultData>(&sealed, &wrong).unwrap_err();
    assert!(matches!(err, LedgerVaultError::AuthenticationFailed));
}

#[test]
fn key_debug_output_is_redacted() {
    let key = CryptoKey::from_bytes([0x42; 32]);
    let debug = format!("{key:?}");
    assert!(!debug.contains("42"));
    assert!(debug.contains("redacted"));
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[test]
fn envelope_roundtrips_arbitrary_json() {
    let key = CryptoKey::from_bytes([5; 32]);
    let doc = VaultData::from(json!({
        "file": "zvault-2.json",
        "entries": [1, 2.5, null, "x"],
    }));

    let sealed = seal(&doc, &key).unwrap();
    assert_eq!(&sealed[..4], b"LVLT");
    assert_eq!(sealed[4], 1);

    let back: VaultData = open(&sealed, &key).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn envelope_rejects_bad_magic_and_version() {
    let key = CryptoKey::from_bytes([6; 32]);
    let sealed = seal(&json!({}), &key).unwrap();

    let mut bad_magic = sealed.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        open::<serde_json::Value>(&bad_magic, &key),
        Err(LedgerVaultError::CorruptData(_))
    ));

    let mut bad_version = sealed;
    bad_version[4] = 99;
    assert!(matches!(
        open::<serde_json::Value>(&bad_version, &key),
        Err(LedgerVaultError::CorruptData(_))
    ));

    assert!(matches!(
        open::<serde_json::Value>(b"LV", &key),
        Err(LedgerVaultError::CorruptData(_))
    ));
}
