#[cfg(feature = "audit-log")]
pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod security;
pub mod session;
pub mod vault;

pub use errors::{LedgerVaultError, Result};
pub use session::{Session, UnlockOutcome};
