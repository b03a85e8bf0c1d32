//! `crypthub list`: display all entries in a table.

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, show_secrets: bool) -> Result<()> {
    let vault = open_unlocked(cli)?;

    let entries = vault.store.list(&vault.session)?;
    let corrupted = entries.iter().filter(|e| e.is_err()).count();

    output::info(&format!("{} entr(y/ies)", entries.len()));
    output::print_entries_table(&entries, show_secrets);

    if corrupted > 0 {
        output::warning(&format!(
            "{corrupted} entr(y/ies) could not be decrypted; the database may be damaged."
        ));
    }

    Ok(())
}
