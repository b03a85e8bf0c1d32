//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{CryptHubError, Result};
use crate::vault::{AuthSession, VaultStore};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "CRYPTHUB_PASSWORD";

/// CryptHub CLI: local encrypted credentials vault.
#[derive(Parser)]
#[command(
    name = "crypthub",
    about = "Local encrypted credentials vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the vault database (default: from config, else .crypthub)
    #[arg(long, global = true, env = "CRYPTHUB_DATA_DIR")]
    pub data_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Set the master password of a new vault
    Init,

    /// List all entries
    List {
        /// Print secrets in plaintext
        #[arg(long)]
        show_secrets: bool,
    },

    /// Add an entry (secret is read from stdin or prompted)
    Add {
        /// Entry label (e.g. Mail)
        label: String,
        /// Username or login
        #[arg(short, long)]
        username: Option<String>,
        /// Category (default: from config, else General)
        #[arg(short, long)]
        category: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Generate a random secret instead of prompting
        #[arg(short, long)]
        generate: bool,
    },

    /// Update an entry (unchanged fields are kept)
    Update {
        /// Entry id (see `list`)
        id: i64,
        /// New label
        #[arg(long)]
        label: Option<String>,
        /// New username
        #[arg(short, long)]
        username: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Prompt for a new secret
        #[arg(long, conflicts_with = "generate")]
        new_secret: bool,
        /// Replace the secret with a generated one
        #[arg(short, long)]
        generate: bool,
    },

    /// Delete an entry
    Delete {
        /// Entry id (see `list`)
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Export the whole vault to an encrypted .crypthub bundle
    Export {
        /// Output file path (default: crypthub-backup-<date>.crypthub)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Replace the vault with the contents of a .crypthub bundle
    Import {
        /// Path to the bundle
        file: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a random password
    Generate {
        /// Number of characters (default: from config, else 20)
        #[arg(short, long)]
        length: Option<usize>,
        /// Letters and digits only
        #[arg(long)]
        no_symbols: bool,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Settings plus the resolved data directory.
pub struct Workspace {
    pub settings: Settings,
    pub data_dir: PathBuf,
}

/// An opened store together with its (possibly unlocked) session.
pub struct OpenVault {
    pub workspace: Workspace,
    pub store: VaultStore,
    pub session: AuthSession,
}

/// Load settings from the working directory and resolve the data directory.
pub fn workspace(cli: &Cli) -> Result<Workspace> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let data_dir = settings.data_path(&cwd, cli.data_dir.as_deref());
    Ok(Workspace { settings, data_dir })
}

/// Open the store with a locked session.
pub fn open_locked(cli: &Cli) -> Result<OpenVault> {
    let workspace = workspace(cli)?;
    let store = VaultStore::open(&workspace.data_dir)?;
    let session = AuthSession::new(workspace.settings.argon2_params());
    Ok(OpenVault {
        workspace,
        store,
        session,
    })
}

/// Open the store and unlock it with the master password.
pub fn open_unlocked(cli: &Cli) -> Result<OpenVault> {
    let mut vault = open_locked(cli)?;
    if !vault.session.has_master_credential(vault.store.db())? {
        return Err(CryptHubError::NoCredential);
    }

    let password = prompt_password()?;
    if let Err(e) = vault.session.unlock(vault.store.db(), password.as_bytes()) {
        if matches!(e, CryptHubError::WrongPassword) {
            crate::audit::log_audit(&vault.workspace.data_dir, "unlock-failed", None, None);
        }
        return Err(e);
    }
    Ok(vault)
}

/// Get the master password, trying in order:
/// 1. `CRYPTHUB_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    prompt_password_with("Enter master password")
}

/// Same as [`prompt_password`] with a custom prompt.
pub fn prompt_password_with(prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| CryptHubError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `CRYPTHUB_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(CryptHubError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| CryptHubError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read an entry secret from piped stdin, or prompt for it securely.
pub fn read_secret(label: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        if trimmed.is_empty() {
            return Err(CryptHubError::CommandFailed("secret cannot be empty".into()));
        }
        return Ok(trimmed);
    }

    let secret = dialoguer::Password::new()
        .with_prompt(format!("Enter secret for {label}"))
        .interact()
        .map_err(|e| CryptHubError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CryptHubError::CommandFailed(format!("confirm prompt: {e}")))
}
