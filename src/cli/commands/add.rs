//! `crypthub add`: add a new entry to the vault.

use zeroize::{Zeroize, Zeroizing};

use crate::cli::output;
use crate::cli::{open_unlocked, read_secret, workspace, Cli};
use crate::crypto::generate_password;
use crate::errors::Result;
use crate::vault::EntryFields;

/// Options for the `add` command.
pub struct AddArgs<'a> {
    pub label: &'a str,
    pub username: Option<&'a str>,
    pub category: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub generate: bool,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: &AddArgs<'_>) -> Result<()> {
    let settings = workspace(cli)?.settings;

    // Read or generate the secret before asking for the master password.
    let secret = if args.generate {
        Zeroizing::new(generate_password(settings.generator_length, true)?)
    } else {
        read_secret(args.label)?
    };

    let vault = open_unlocked(cli)?;

    let mut fields = EntryFields {
        label: args.label.to_string(),
        username: args.username.map(str::to_string),
        secret: secret.to_string(),
        category: Some(
            args.category
                .map_or_else(|| settings.default_category.clone(), str::to_string),
        ),
        notes: args.notes.map(str::to_string),
    };

    let added = vault.store.add(&vault.session, &fields);
    fields.secret.zeroize();
    let id = added?;

    crate::audit::log_audit(
        &vault.workspace.data_dir,
        "add",
        Some(args.label),
        Some(&format!("id {id}")),
    );

    output::success(&format!("Entry '{}' added (id {id})", args.label));
    if args.generate {
        output::tip("Run `crypthub list --show-secrets` to see the generated secret.");
    }

    Ok(())
}
