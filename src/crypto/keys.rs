//! The in-memory document key.

use std::fmt;

use zeroize::Zeroize;

/// Length of a document key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte key derived from the user's password.
///
/// Lives only for the duration of a session and is wiped when dropped.
/// Nothing in this crate writes it to disk, and `Debug` never prints it.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct CryptoKey {
    bytes: [u8; KEY_LEN],
}

impl CryptoKey {
    /// Wrap raw key bytes (e.g. the output of Argon2id).
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes for the cipher.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CryptoKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = CryptoKey::from_bytes([0x41; KEY_LEN]);
        let shown = format!("{key:?}");
        assert_eq!(shown, "CryptoKey(<redacted>)");
        assert!(!shown.contains("65"));
    }
}
