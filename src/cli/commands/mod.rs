//! One module per subcommand, each exposing an `execute` function.

#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod completions;
pub mod create;
pub mod delete;
pub mod export;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod rename;
pub mod rotate;
pub mod settings_cmd;
pub mod show;
pub mod status;
