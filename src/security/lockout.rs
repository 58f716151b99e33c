//! Brute-force lockout policy.
//!
//! Counts consecutive failed unlocks in `Settings` and escalates:
//!
//! ```text
//! Unlocked --(numFailAttempts failures)--> SoftLocked --(...)--> SoftLocked
//!     ^                                        |
//!     +--------------(success)-----------------+
//!
//! lockOutCount >= numLockoutRetries at the start of an attempt => Destroyed
//! ```
//!
//! The policy only mutates counters.  Acting on `EntryCheck::Destroy`
//! (scrubbing the vault directory) and persisting the settings are the
//! caller's job; see `Session::unlock`.
//!
//! A soft lockout does not block further attempts.  `lock_login_time`
//! is recorded for display only and no cooldown is enforced.

use chrono::{DateTime, Utc};

use crate::config::Settings;

/// Where the policy currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    Unlocked,
    SoftLocked { since: Option<DateTime<Utc>> },
    Destroyed,
}

/// Verdict of the check that runs before every unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCheck {
    /// Go ahead and try the key.
    Proceed,
    /// Lockout retries are exhausted: wipe the vault directory.
    Destroy,
}

/// What a failed attempt led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutDecision {
    /// Below the threshold; `remaining` more failures until a lockout.
    RetryAllowed { remaining: u32 },
    /// This failure crossed the threshold and started a lockout.
    LockedOut { lock_out_count: u32 },
}

/// Stateless view over the counters in `Settings`.
pub struct LockoutPolicy;

impl LockoutPolicy {
    /// Classify the current settings.
    pub fn state(settings: &Settings) -> LockoutState {
        if settings.lock_out_count >= settings.num_lockout_retries {
            LockoutState::Destroyed
        } else if settings.lock_login {
            LockoutState::SoftLocked {
                since: settings.lock_login_time,
            }
        } else {
            LockoutState::Unlocked
        }
    }

    /// Must run before every unlock attempt.
    pub fn check_entry(settings: &Settings) -> EntryCheck {
        if settings.lock_out_count >= settings.num_lockout_retries {
            EntryCheck::Destroy
        } else {
            EntryCheck::Proceed
        }
    }

    /// A key opened the vault list: clear every counter.
    pub fn record_success(settings: &mut Settings) {
        settings.fail_attempt_count = 0;
        settings.lock_out_count = 0;
        settings.lock_login = false;
        settings.lock_login_time = None;
    }

    /// A key failed to open the vault list.
    pub fn record_failure(settings: &mut Settings, now: DateTime<Utc>) -> LockoutDecision {
        settings.fail_attempt_count = settings.fail_attempt_count.saturating_add(1);

        if settings.fail_attempt_count >= settings.num_fail_attempts {
            settings.fail_attempt_count = 0;
            settings.lock_out_count = settings.lock_out_count.saturating_add(1);
            settings.lock_login = true;
            settings.lock_login_time = Some(now);
            tracing::warn!(
                lock_out_count = settings.lock_out_count,
                num_lockout_retries = settings.num_lockout_retries,
                "too many failed unlock attempts, login locked"
            );
            LockoutDecision::LockedOut {
                lock_out_count: settings.lock_out_count,
            }
        } else {
            let remaining = settings.num_fail_attempts - settings.fail_attempt_count;
            tracing::info!(
                fail_attempt_count = settings.fail_attempt_count,
                remaining,
                "failed unlock attempt"
            );
            LockoutDecision::RetryAllowed { remaining }
        }
    }

    /// Counters after the destructive wipe: a clean slate.
    pub fn record_destroyed(settings: &mut Settings) {
        settings.fail_attempt_count = 0;
        settings.lock_out_count = 0;
        settings.lock_login = false;
        settings.lock_login_time = None;
    }
}
