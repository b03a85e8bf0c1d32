//! `crypthub init`: set the master password of a new vault.

use crate::cli::output;
use crate::cli::{open_locked, prompt_new_password, Cli};
use crate::errors::{CryptHubError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_locked(cli)?;

    // 1. Refuse to touch an initialized vault.
    if vault.session.has_master_credential(vault.store.db())? {
        output::tip("Use `crypthub import` to replace the vault from a backup.");
        return Err(CryptHubError::AlreadyInitialized);
    }

    // 2. Prompt for a new password (with confirmation).
    let password = prompt_new_password()?;

    // 3. Store the credential and unlock.
    vault
        .session
        .initialize(vault.store.db(), password.as_bytes())?;

    crate::audit::log_audit(&vault.workspace.data_dir, "init", None, Some("vault created"));

    output::success(&format!(
        "Vault created at {}",
        vault.workspace.data_dir.display()
    ));
    output::tip("Run `crypthub add <LABEL>` to add an entry.");
    output::tip("Run `crypthub export` to back the vault up.");

    Ok(())
}
