//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::errors::Result;
use crate::vault::Entry;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (Id, Category, Label, Username, Secret, Updated).
///
/// Entries that failed to decrypt are shown as a warning line each.
pub fn print_entries_table(entries: &[Result<Entry>], show_secrets: bool) {
    if entries.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `crypthub add <LABEL>` to add your first entry.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Category", "Label", "Username", "Secret", "Updated"]);

    for item in entries {
        match item {
            Ok(e) => {
                let secret = if show_secrets {
                    e.secret.clone()
                } else {
                    "\u{2022}".repeat(8)
                };
                table.add_row(vec![
                    e.id.to_string(),
                    e.category.clone(),
                    e.label.clone(),
                    e.username.clone(),
                    secret,
                    e.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }
            Err(err) => warning(&err.to_string()),
        }
    }

    println!("{table}");
}
