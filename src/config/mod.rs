//! Persisted settings: lockout counters, thresholds and KDF parameters.

pub mod settings;

pub use settings::Settings;
