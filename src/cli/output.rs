//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{KeyState, RotationReport, VaultList};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the vault list (Id, Name, File), marking the selected vault.
pub fn print_vault_table(list: &VaultList) {
    if list.vaults.is_empty() {
        info("No vaults yet.");
        tip("Run `ledgervault create <NAME>` to add your first vault.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Id", "Name", "File"]);

    for (index, v) in list.vaults.iter().enumerate() {
        let marker = if list.vault_selected == Some(index) {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            marker.to_string(),
            v.id.to_string(),
            v.name.clone(),
            v.file.clone(),
        ]);
    }

    println!("{table}");
}

/// Print one row per file touched by a key rotation.
pub fn print_rotation_report(report: &RotationReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Key", "Error"]);

    for f in &report.files {
        let key = match f.key {
            KeyState::New => style("new").green().to_string(),
            KeyState::Old => style("old").yellow().to_string(),
        };
        table.add_row(vec![
            f.file.clone(),
            key,
            f.error.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{table}");
}
