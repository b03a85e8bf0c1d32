//! Audit trail of vault operations, kept in `<data_dir>/audit.db`.
//!
//! Each row records when an operation ran, its name (`init`, `add`,
//! `update`, `delete`, `export`, `import`, `unlock-failed`, ...), an
//! optional subject such as an entry label, and free-form details.
//! Secrets and passwords are never written here.
//!
//! Logging is best-effort. A missing or unwritable database never fails
//! the vault operation being recorded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::errors::{CryptHubError, Result};

const FILE_NAME: &str = "audit.db";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS audit_log (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    operation TEXT NOT NULL,
    subject   TEXT,
    details   TEXT
);";

/// One recorded event.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub subject: Option<String>,
    pub details: Option<String>,
}

/// Handle on the audit database.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open or create the audit database in `data_dir`.
    ///
    /// `None` means auditing is unavailable; callers carry on without it.
    pub fn open(data_dir: &Path) -> Option<Self> {
        let path = Self::db_path(data_dir);
        let conn = Connection::open(&path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
        }

        conn.execute_batch(SCHEMA).ok()?;
        Some(Self { conn })
    }

    /// Append an event. Write errors are dropped.
    pub fn log(&self, operation: &str, subject: Option<&str>, details: Option<&str>) {
        let _ = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, subject, details)
             VALUES (?1, ?2, ?3, ?4)",
            params![Utc::now().to_rfc3339(), operation, subject, details],
        );
    }

    /// Newest-first events, at most `limit`, optionally no older than `since`.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let since = since.map(|ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, subject, details
                 FROM audit_log
                 WHERE ?1 IS NULL OR timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| CryptHubError::AuditError(format!("prepare: {e}")))?;

        stmt.query_map(params![since, limit], map_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| CryptHubError::AuditError(format!("query: {e}")))
    }

    /// Location of the audit database inside `data_dir`.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join(FILE_NAME)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    let raw: String = row.get(1)?;
    // A malformed timestamp should not hide the rest of the trail.
    let timestamp = DateTime::parse_from_rfc3339(&raw)
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc));

    Ok(AuditEntry {
        id: row.get(0)?,
        timestamp,
        operation: row.get(2)?,
        subject: row.get(3)?,
        details: row.get(4)?,
    })
}

/// Record one event in `data_dir`'s audit log, if it can be opened.
pub fn log_audit(data_dir: &Path, op: &str, subject: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(data_dir) {
        audit.log(op, subject, details);
    }
}
