//! `crypthub audit`: display the audit log.
//!
//! Usage:
//!   crypthub audit               # last 50 events
//!   crypthub audit --since 7d    # events from the last 7 days

use chrono::{DateTime, Duration, Utc};

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{workspace, Cli};
use crate::errors::{CryptHubError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let data_dir = workspace(cli)?.data_dir;

    let audit = AuditLog::open(&data_dir)
        .ok_or_else(|| CryptHubError::AuditError("failed to open audit database".into()))?;

    let since_dt = since.map(parse_since).transpose()?;
    let entries = audit.query(last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

/// Turn "7d", "24h" or "30m" into the instant that long ago.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        CryptHubError::CommandFailed(format!(
            "invalid duration '{input}', use a form like 7d, 24h or 30m"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let num_str = &input[..input.len() - unit.len_utf8()];
    let num: i64 = num_str.parse().map_err(|_| invalid())?;

    let duration = match unit {
        'd' => Duration::try_days(num),
        'h' => Duration::try_hours(num),
        'm' => Duration::try_minutes(num),
        _ => return Err(invalid()),
    }
    .ok_or_else(invalid)?;

    Utc::now().checked_sub_signed(duration).ok_or_else(invalid)
}

fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Subject", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.subject.as_deref().unwrap_or("-").to_string(),
            entry.details.as_deref().unwrap_or("-").to_string(),
        ]);
    }

    println!("{}", style(format!("{} audit entries:", entries.len())).bold());
    println!("{table}");
}

fn colorize_operation(op: &str) -> String {
    use console::style;

    match op {
        "init" | "add" => style(op).green().to_string(),
        "update" => style(op).blue().to_string(),
        "delete" => style(op).red().to_string(),
        "unlock-failed" | "import-failed" => style(op).yellow().to_string(),
        "export" | "import" => style(op).cyan().to_string(),
        _ => op.to_string(),
    }
}
