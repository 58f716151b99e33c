//! `ledgervault audit` — display the audit log.
//!
//! Usage:
//!   ledgervault audit               # show last 50 entries
//!   ledgervault audit --last 20     # show last 20
//!   ledgervault audit --since 7d    # entries from last 7 days

use chrono::Utc;

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::Cli;
use crate::errors::{LedgerVaultError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let settings_dir = std::env::current_dir()?.join(&cli.settings_dir);

    if !AuditLog::db_path(&settings_dir).exists() {
        output::info("No audit entries found.");
        return Ok(());
    }

    let audit = AuditLog::open(&settings_dir)
        .ok_or_else(|| LedgerVaultError::AuditError("failed to open audit database".into()))?;

    let since_dt = match since {
        Some(s) => Some(parse_duration(s)?),
        None => None,
    };

    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Parse a human-friendly duration string like "7d", "24h", "30m".
fn parse_duration(input: &str) -> Result<chrono::DateTime<Utc>> {
    let input = input.trim();

    let (num_str, duration): (&str, fn(i64) -> chrono::Duration) =
        if let Some(s) = input.strip_suffix('d') {
            (s, chrono::Duration::days)
        } else if let Some(s) = input.strip_suffix('h') {
            (s, chrono::Duration::hours)
        } else if let Some(s) = input.strip_suffix('m') {
            (s, chrono::Duration::minutes)
        } else {
            return Err(LedgerVaultError::CommandFailed(format!(
                "invalid duration '{input}' — use format like 7d, 24h, or 30m"
            )));
        };

    let num: i64 = num_str.parse().map_err(|_| {
        LedgerVaultError::CommandFailed(format!(
            "invalid duration '{input}' — number part is not valid"
        ))
    })?;

    Ok(Utc::now() - duration(num))
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "File", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.vault_file.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize operation names for display.
fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "unlock" | "vault-create" => style(op).green().to_string(),
        "vault-modify" | "vault-save" | "settings" => style(op).blue().to_string(),
        "vault-delete" | "lockout-destroy" => style(op).red().to_string(),
        "unlock-failed" | "lockout" | "rotate-key" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}
