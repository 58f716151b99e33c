//! `ledgervault create` — add a new, empty vault.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `create` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let mut unlocked = unlock(cli)?;

    let (descriptor, _) = unlocked
        .session
        .create_vault(&unlocked.key, &mut unlocked.list, name)?;

    output::success(&format!(
        "Created vault '{}' (id {}, {})",
        descriptor.name, descriptor.id, descriptor.file
    ));
    output::tip(&format!(
        "Run `ledgervault import {} <FILE>` to load a JSON document into it.",
        descriptor.id
    ));

    Ok(())
}
