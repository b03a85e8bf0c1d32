//! `crypthub delete`: remove an entry.

use crate::cli::output;
use crate::cli::{confirm, open_unlocked, Cli};
use crate::errors::Result;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: i64, force: bool) -> Result<()> {
    let vault = open_unlocked(cli)?;

    // Resolve the label first so a missing id fails before the prompt.
    let label = vault.store.get(&vault.session, id)?.label.clone();

    if !force && !confirm(&format!("Delete entry '{label}' (id {id})? This cannot be undone"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    vault.store.delete(&vault.session, id)?;

    crate::audit::log_audit(
        &vault.workspace.data_dir,
        "delete",
        Some(&label),
        Some(&format!("id {id}")),
    );

    output::success(&format!("Entry '{label}' deleted"));
    Ok(())
}
