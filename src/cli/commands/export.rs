//! `crypthub export`: seal the whole vault into a `.crypthub` bundle.
//!
//! The bundle can only be restored with the master password that was
//! active when it was written.

use std::path::PathBuf;

use chrono::Utc;

use crate::cli::output;
use crate::cli::{open_unlocked, Cli};
use crate::errors::{CryptHubError, Result};
use crate::migration::{default_file_name, export_to_path};

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&str>) -> Result<()> {
    let dest = output_path.map_or_else(
        || PathBuf::from(default_file_name(Utc::now().date_naive())),
        PathBuf::from,
    );

    // Refuse to export over a database file.
    if dest
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("db"))
    {
        return Err(CryptHubError::CommandFailed(
            "refusing to export over a .db file".into(),
        ));
    }

    let vault = open_unlocked(cli)?;
    let summary = export_to_path(&vault.store, &vault.session, &dest)?;

    crate::audit::log_audit(
        &vault.workspace.data_dir,
        "export",
        None,
        Some(&format!("{} entries to {}", summary.count, summary.path.display())),
    );

    output::success(&format!(
        "Exported {} entr(y/ies) to {}",
        summary.count,
        summary.path.display()
    ));
    output::tip("Keep the master password: the backup cannot be opened without it.");

    Ok(())
}
