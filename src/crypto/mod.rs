//! Cryptographic primitives for LedgerVault.
//!
//! This module provides:
//! - AES-256-GCM document sealing and opening (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - The zeroizing `CryptoKey` type (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_key, generate_salt, Argon2Params};
pub use keys::CryptoKey;
