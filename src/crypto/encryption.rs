//! AES-256-GCM document codec.
//!
//! Every call to `encrypt` draws a fresh 12-byte nonce, so sealing the
//! same document twice never yields the same bytes.  The nonce travels
//! with the ciphertext; the key is the only other input `decrypt` needs.
//!
//! Layout of a sealed payload:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! A failed tag check is how a wrong password shows up.  `decrypt`
//! returns the same bare `AuthenticationFailed` for a wrong key, a
//! flipped bit, or a truncated buffer.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::keys::CryptoKey;
use crate::errors::{LedgerVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Seal `plaintext` under `key`.
pub fn encrypt(key: &CryptoKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| LedgerVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&sealed);
    Ok(output)
}

/// Open a payload produced by `encrypt`.
pub fn decrypt(key: &CryptoKey, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() < NONCE_LEN + TAG_LEN {
        return Err(LedgerVaultError::AuthenticationFailed);
    }

    let (nonce_bytes, sealed) = payload.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| LedgerVaultError::AuthenticationFailed)?;

    cipher
        .decrypt(nonce, sealed)
        .map_err(|_| LedgerVaultError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_payload_carries_nonce_and_tag() {
        let key = CryptoKey::from_bytes([7u8; 32]);
        let sealed = encrypt(&key, b"{}").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 2 + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = CryptoKey::from_bytes([3u8; 32]);
        let sealed = encrypt(&key, b"").unwrap();
        assert!(decrypt(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn short_payload_is_an_authentication_failure() {
        let key = CryptoKey::from_bytes([3u8; 32]);
        let err = decrypt(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]).unwrap_err();
        assert!(matches!(err, LedgerVaultError::AuthenticationFailed));
    }
}
