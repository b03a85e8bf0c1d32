//! SQLite record store for the master credential and entries.
//!
//! Lives at `<data_dir>/crypthub.db`.  This layer knows nothing about
//! sessions or plaintext: it moves already-encrypted records in and out
//! and owns the one multi-statement transaction of the engine,
//! [`VaultDb::replace_all`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::entry::{EntryRecord, MasterCredential, StoredEntry};
use crate::errors::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS master (
    id   INTEGER PRIMARY KEY CHECK (id = 1),
    hash BLOB NOT NULL,
    salt BLOB NOT NULL
);
CREATE TABLE IF NOT EXISTS entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    label       TEXT NOT NULL,
    username    TEXT NOT NULL DEFAULT '',
    secret_iv   BLOB NOT NULL,
    secret_tag  BLOB NOT NULL,
    secret_data BLOB NOT NULL,
    category    TEXT NOT NULL DEFAULT 'General',
    notes       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);";

const SELECT_ENTRIES: &str = "SELECT id, label, username, secret_iv, secret_tag, secret_data,
        category, notes, created_at, updated_at
 FROM entries";

/// Handle to the vault database.
pub struct VaultDb {
    conn: Connection,
}

impl std::fmt::Debug for VaultDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultDb(***)")
    }
}

impl VaultDb {
    /// Name of the database file inside the data directory.
    pub const FILE_NAME: &'static str = "crypthub.db";

    /// Open (or create) the database in `data_dir`.
    ///
    /// Creates the directory and schema if needed.  On Unix the file is
    /// restricted to owner-only read/write.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir)?;
        }

        let db_path = Self::db_path(data_dir);
        let conn = Connection::open(&db_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&db_path, perms)?;
        }

        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Full path of the database file for a data directory.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::FILE_NAME)
    }

    /// Returns the underlying connection.
    ///
    /// Primarily for tests that need to inspect or sabotage the schema.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ------------------------------------------------------------------
    // Master credential
    // ------------------------------------------------------------------

    /// Load the master credential, or `None` if the vault is uninitialized.
    pub fn load_master(&self) -> Result<Option<MasterCredential>> {
        let row = self
            .conn
            .query_row("SELECT hash, salt FROM master WHERE id = 1", [], |row| {
                Ok(MasterCredential {
                    verification_hash: row.get(0)?,
                    salt: row.get(1)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Insert the master credential.  Fails if one already exists.
    pub fn insert_master(&self, credential: &MasterCredential) -> Result<()> {
        self.conn.execute(
            "INSERT INTO master (id, hash, salt) VALUES (1, ?1, ?2)",
            params![credential.verification_hash, credential.salt],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    /// All entries ordered by category, then label.
    pub fn select_entries(&self) -> Result<Vec<StoredEntry>> {
        self.select(&format!("{SELECT_ENTRIES} ORDER BY category, label, id"))
    }

    /// All entries in insertion (id) order.
    pub fn select_entries_by_id(&self) -> Result<Vec<StoredEntry>> {
        self.select(&format!("{SELECT_ENTRIES} ORDER BY id"))
    }

    /// A single entry, if present.
    pub fn select_entry(&self, id: i64) -> Result<Option<StoredEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("{SELECT_ENTRIES} WHERE id = ?1"),
                params![id],
                map_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn select(&self, sql: &str) -> Result<Vec<StoredEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], map_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Insert a new entry and return its id.
    pub fn insert_entry(&self, record: &EntryRecord) -> Result<i64> {
        insert_entry_on(&self.conn, record)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite an entry in place, keeping its `created_at`.
    ///
    /// Returns `false` if no entry has this id.
    pub fn update_entry(&self, id: i64, record: &EntryRecord) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE entries
             SET label = ?1, username = ?2, secret_iv = ?3, secret_tag = ?4,
                 secret_data = ?5, category = ?6, notes = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                record.label,
                record.username,
                record.secret.iv.as_slice(),
                record.secret.tag.as_slice(),
                record.secret.ciphertext,
                record.category,
                record.notes,
                record.updated_at.to_rfc3339(),
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete an entry.  Returns `false` if no entry has this id.
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Destructive restore
    // ------------------------------------------------------------------

    /// Wipe every entry and the master credential, then write the given
    /// credential and records, all inside one transaction.
    ///
    /// Any error rolls the transaction back, leaving the previous
    /// contents in place.
    pub fn replace_all(
        &mut self,
        credential: &MasterCredential,
        records: &[EntryRecord],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM entries", [])?;
        tx.execute("DELETE FROM master", [])?;
        tx.execute(
            "INSERT INTO master (id, hash, salt) VALUES (1, ?1, ?2)",
            params![credential.verification_hash, credential.salt],
        )?;
        for record in records {
            insert_entry_on(&tx, record)?;
        }

        // Dropping `tx` without commit rolls back.
        tx.commit()?;
        Ok(())
    }
}

fn insert_entry_on(conn: &Connection, record: &EntryRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO entries
            (label, username, secret_iv, secret_tag, secret_data, category, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.label,
            record.username,
            record.secret.iv.as_slice(),
            record.secret.tag.as_slice(),
            record.secret.ciphertext,
            record.category,
            record.notes,
            record.created_at.to_rfc3339(),
            record.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: row.get(0)?,
        label: row.get(1)?,
        username: row.get(2)?,
        secret_iv: row.get(3)?,
        secret_tag: row.get(4)?,
        secret_data: row.get(5)?,
        category: row.get(6)?,
        notes: row.get(7)?,
        created_at: parse_timestamp(row, 8)?,
        updated_at: parse_timestamp(row, 9)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: String = row.get(idx)?;
    Ok(DateTime::parse_from_rfc3339(&text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc)))
}
