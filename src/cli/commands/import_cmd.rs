//! `crypthub import`: replace the vault with the contents of a bundle.
//!
//! The bundle is checked structurally before anything is asked of the
//! user; the master password it was exported under is then verified
//! before the existing vault is wiped.

use std::path::Path;

use crate::cli::output;
use crate::cli::{confirm, open_locked, prompt_password_with, Cli};
use crate::errors::{CryptHubError, Result};
use crate::migration::read_bundle;

/// Execute the `import` command.
pub fn execute(cli: &Cli, file_path: &str, force: bool) -> Result<()> {
    let source = Path::new(file_path);
    if !source.exists() {
        return Err(CryptHubError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    // Phase 1: structure only.
    let pending = read_bundle(source)?;
    output::info(&format!(
        "Backup format v{} ({} bytes)",
        pending.version(),
        pending.len()
    ));

    let mut vault = open_locked(cli)?;
    let existing = vault.store.db().entry_count()?;

    if !force {
        let prompt = format!(
            "Replace the current vault ({existing} entr(y/ies)) with this backup? This cannot be undone"
        );
        if !confirm(&prompt)? {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    // Phase 2: verify and replace.
    let password = prompt_password_with("Enter the backup's master password")?;
    let summary = match pending.restore(&mut vault.store, &mut vault.session, password.as_bytes()) {
        Ok(summary) => summary,
        Err(e) => {
            crate::audit::log_audit(
                &vault.workspace.data_dir,
                "import-failed",
                None,
                Some(&e.to_string()),
            );
            return Err(e);
        }
    };

    crate::audit::log_audit(
        &vault.workspace.data_dir,
        "import",
        None,
        Some(&format!(
            "{} entries, exported {}",
            summary.count,
            summary.exported_at.to_rfc3339()
        )),
    );

    output::success(&format!(
        "Restored {} entr(y/ies) from backup made {}",
        summary.count,
        summary.exported_at.format("%Y-%m-%d %H:%M:%S")
    ));
    output::tip("The vault now uses the backup's master password.");

    Ok(())
}
