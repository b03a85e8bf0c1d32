//! `crypthub update`: change fields of an existing entry.

use zeroize::Zeroize;

use crate::cli::output;
use crate::cli::{open_unlocked, read_secret, workspace, Cli};
use crate::crypto::generate_password;
use crate::errors::Result;
use crate::vault::EntryFields;

/// Options for the `update` command. `None` keeps the current value.
pub struct UpdateArgs<'a> {
    pub id: i64,
    pub label: Option<&'a str>,
    pub username: Option<&'a str>,
    pub category: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub new_secret: bool,
    pub generate: bool,
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, args: &UpdateArgs<'_>) -> Result<()> {
    let settings = workspace(cli)?.settings;
    let vault = open_unlocked(cli)?;

    let mut current = vault.store.get(&vault.session, args.id)?;

    let secret = if args.generate {
        Some(generate_password(settings.generator_length, true)?)
    } else if args.new_secret {
        Some(read_secret(&current.label)?.to_string())
    } else {
        None
    };

    let mut fields = EntryFields {
        label: args.label.map_or_else(|| current.label.clone(), str::to_string),
        username: Some(
            args.username
                .map_or_else(|| current.username.clone(), str::to_string),
        ),
        secret: secret.unwrap_or_else(|| current.secret.clone()),
        category: Some(
            args.category
                .map_or_else(|| current.category.clone(), str::to_string),
        ),
        notes: Some(args.notes.map_or_else(|| current.notes.clone(), str::to_string)),
    };
    current.zeroize();

    let updated = vault.store.update(&vault.session, args.id, &fields);
    fields.secret.zeroize();
    updated?;

    crate::audit::log_audit(
        &vault.workspace.data_dir,
        "update",
        Some(&fields.label),
        Some(&format!("id {}", args.id)),
    );

    output::success(&format!("Entry {} updated", args.id));
    Ok(())
}
