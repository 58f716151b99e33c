//! Audit log — SQLite-based operation history.
//!
//! Records unlocks, lockouts, wipes and vault changes in
//! `<settings_dir>/audit.db`.  It sits beside the settings rather than
//! the vaults so that a destructive wipe is itself recorded and
//! survives.  Only operation names, vault file names and counters are
//! logged; never display names or document content.
//!
//! If the database can't be opened or written to, operations continue
//! without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{LedgerVaultError, Result};

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub vault_file: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// File name of the audit database inside the settings directory.
    const FILE_NAME: &'static str = "audit.db";

    /// Open (or create) the audit database.
    ///
    /// Returns `None` if the database can't be opened — callers treat
    /// this as "audit logging unavailable" and carry on.
    pub fn open(settings_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(settings_dir);
        let conn = match Connection::open(&db_path) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(path = %db_path.display(), error = %e, "audit log unavailable");
                return None;
            }
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                vault_file  TEXT,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget.
    pub fn log(&self, operation: &str, vault_file: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, vault_file, details)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![now, operation, vault_file, details],
        ) {
            tracing::debug!(operation, error = %e, "failed to write audit entry");
        }
    }

    /// Query recent entries, most recent first.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let since_str = since.map(|ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, vault_file, details
                 FROM audit_log
                 WHERE ?1 IS NULL OR timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| LedgerVaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since_str, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    vault_file: row.get(3)?,
                    details: row.get(4)?,
                })
            })
            .map_err(|e| LedgerVaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries
                .push(row.map_err(|e| LedgerVaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Path of the audit database for a settings directory.
    pub fn db_path(settings_dir: &Path) -> PathBuf {
        settings_dir.join(Self::FILE_NAME)
    }
}

/// Open the audit database, log one event, ignore any error.
pub fn log_audit(settings_dir: &Path, op: &str, vault_file: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(settings_dir) {
        audit.log(op, vault_file, details);
    }
}
