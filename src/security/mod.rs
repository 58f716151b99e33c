//! Security policy applied around unlock attempts.

pub mod lockout;

pub use lockout::{EntryCheck, LockoutDecision, LockoutPolicy, LockoutState};
