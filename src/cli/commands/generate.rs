//! `crypthub generate`: print a random password.

use crate::cli::{workspace, Cli};
use crate::crypto::generate_password;
use crate::errors::Result;

/// Execute the `generate` command. Does not open the vault.
pub fn execute(cli: &Cli, length: Option<usize>, no_symbols: bool) -> Result<()> {
    let settings = workspace(cli)?.settings;
    let length = length.unwrap_or(settings.generator_length);

    let password = zeroize::Zeroizing::new(generate_password(length, !no_symbols)?);
    println!("{}", password.as_str());
    Ok(())
}
