//! High-level entry operations used by CLI commands.
//!
//! `VaultStore` wraps the record store and the field cipher so the rest
//! of the application can work with plaintext entries.  Every operation
//! takes the [`AuthSession`] and fails with `VaultLocked` before touching
//! any record when the session holds no key.

use std::path::Path;

use chrono::Utc;
use zeroize::Zeroize;

use crate::crypto::encryption::{decrypt, encrypt};
use crate::errors::{CryptHubError, Result};

use super::db::VaultDb;
use super::entry::{Entry, EntryFields, EntryRecord, StoredEntry};
use super::session::AuthSession;

/// Maximum label length in characters.
const MAX_LABEL_LEN: usize = 256;

/// The vault's entry store.
#[derive(Debug)]
pub struct VaultStore {
    db: VaultDb,
}

impl VaultStore {
    /// Open (or create) the store in `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            db: VaultDb::open(data_dir)?,
        })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: VaultDb::open_in_memory()?,
        })
    }

    /// The underlying record store.
    pub fn db(&self) -> &VaultDb {
        &self.db
    }

    pub(crate) fn db_mut(&mut self) -> &mut VaultDb {
        &mut self.db
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// List every entry, sorted by category then label, with secrets
    /// decrypted under the session key.
    ///
    /// A record that fails to decrypt shows up as `Err(DataCorruption(id))`
    /// in its slot; the other records are still returned.
    pub fn list(&self, session: &AuthSession) -> Result<Vec<Result<Entry>>> {
        let key = session.key()?;
        let rows = self.db.select_entries()?;
        Ok(rows
            .into_iter()
            .map(|row| decrypt_entry(key.as_bytes(), row))
            .collect())
    }

    /// Fetch and decrypt a single entry.
    pub fn get(&self, session: &AuthSession, id: i64) -> Result<Entry> {
        let key = session.key()?;
        let row = self
            .db
            .select_entry(id)?
            .ok_or(CryptHubError::EntryNotFound(id))?;
        decrypt_entry(key.as_bytes(), row)
    }

    /// Add a new entry and return its id.
    pub fn add(&self, session: &AuthSession, fields: &EntryFields) -> Result<i64> {
        let key = session.key()?;
        validate_label(&fields.label)?;

        let now = Utc::now();
        let record = EntryRecord {
            label: fields.label.clone(),
            username: fields.username_or_default().to_string(),
            secret: encrypt(key.as_bytes(), fields.secret.as_bytes())?,
            category: fields.category_or_default().to_string(),
            notes: fields.notes_or_default().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.db.insert_entry(&record)
    }

    /// Replace an entry's fields, re-encrypting the secret under the
    /// current session key with a fresh nonce.
    pub fn update(&self, session: &AuthSession, id: i64, fields: &EntryFields) -> Result<()> {
        let key = session.key()?;
        validate_label(&fields.label)?;

        let now = Utc::now();
        let record = EntryRecord {
            label: fields.label.clone(),
            username: fields.username_or_default().to_string(),
            secret: encrypt(key.as_bytes(), fields.secret.as_bytes())?,
            category: fields.category_or_default().to_string(),
            notes: fields.notes_or_default().to_string(),
            // Ignored by the update statement.
            created_at: now,
            updated_at: now,
        };

        if !self.db.update_entry(id, &record)? {
            return Err(CryptHubError::EntryNotFound(id));
        }
        Ok(())
    }

    /// Permanently remove an entry.
    pub fn delete(&self, session: &AuthSession, id: i64) -> Result<()> {
        session.key()?;
        if !self.db.delete_entry(id)? {
            return Err(CryptHubError::EntryNotFound(id));
        }
        Ok(())
    }

    /// Decrypt every entry in id order, failing on the first corrupted one.
    pub(crate) fn decrypt_all_by_id(&self, session: &AuthSession) -> Result<Vec<Entry>> {
        let key = session.key()?;
        self.db
            .select_entries_by_id()?
            .into_iter()
            .map(|row| decrypt_entry(key.as_bytes(), row))
            .collect()
    }
}

/// Decrypt one stored row.  Any failure is reported as corruption of
/// that row, since the session key itself is known to be valid.
fn decrypt_entry(key: &[u8], row: StoredEntry) -> Result<Entry> {
    let id = row.id;
    let (Some(created_at), Some(updated_at)) = (row.created_at, row.updated_at) else {
        return Err(CryptHubError::DataCorruption(id));
    };
    let blob = row.blob().map_err(|_| CryptHubError::DataCorruption(id))?;
    let plaintext = decrypt(key, &blob).map_err(|_| CryptHubError::DataCorruption(id))?;

    let secret = String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        CryptHubError::DataCorruption(id)
    })?;

    Ok(Entry {
        id: row.id,
        label: row.label,
        username: row.username,
        secret,
        category: row.category,
        notes: row.notes,
        created_at,
        updated_at,
    })
}

/// Validate that a label is usable.
///
/// Must be non-empty and at most 256 characters.
fn validate_label(label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(CryptHubError::CommandFailed(
            "entry label cannot be empty".into(),
        ));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(CryptHubError::CommandFailed(format!(
            "entry label cannot exceed {MAX_LABEL_LEN} characters"
        )));
    }
    Ok(())
}
