//! Entry and master-credential types.
//!
//! `StoredEntry` is what the record store holds: every secret is an
//! AES-GCM envelope split over three columns.  `Entry` is the decrypted
//! view handed to callers while the vault is unlocked.

use chrono::{DateTime, Utc};

use crate::crypto::EncryptedBlob;
use crate::errors::Result;

/// Category assigned to entries created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// The single master-password record of a vault.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterCredential {
    /// 64-byte Argon2id verification hash of the master password.
    pub verification_hash: Vec<u8>,
    /// Random salt the hash and the session key are derived under.
    pub salt: Vec<u8>,
}

impl std::fmt::Debug for MasterCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterCredential")
            .field("verification_hash", &"***")
            .field("salt", &hex::encode(&self.salt))
            .finish()
    }
}

/// User-supplied fields for `add` and `update`.
///
/// Optional fields fall back to empty strings, and the category to
/// [`DEFAULT_CATEGORY`].
#[derive(Debug, Clone, Default)]
pub struct EntryFields {
    pub label: String,
    pub username: Option<String>,
    pub secret: String,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl EntryFields {
    /// Username with the empty-string default applied.
    pub fn username_or_default(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }

    /// Category with the sentinel default applied.
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }

    /// Notes with the empty-string default applied.
    pub fn notes_or_default(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

/// A record ready to be written to the store (no id yet).
#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub label: String,
    pub username: String,
    pub secret: EncryptedBlob,
    pub category: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record as read back from the store.
///
/// The secret columns are kept raw so a malformed row can be reported
/// on its own instead of failing the whole query.  A timestamp that does
/// not parse is `None`.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: i64,
    pub label: String,
    pub username: String,
    pub secret_iv: Vec<u8>,
    pub secret_tag: Vec<u8>,
    pub secret_data: Vec<u8>,
    pub category: String,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    /// Reassemble the encrypted envelope from its stored columns.
    pub fn blob(&self) -> Result<EncryptedBlob> {
        EncryptedBlob::from_parts(&self.secret_iv, &self.secret_tag, self.secret_data.clone())
    }
}

/// A decrypted entry.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i64,
    pub label: String,
    pub username: String,
    pub secret: String,
    pub category: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("username", &self.username)
            .field("secret", &"***")
            .field("category", &self.category)
            .field("notes", &self.notes)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl zeroize::Zeroize for Entry {
    fn zeroize(&mut self) {
        self.secret.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_apply_defaults() {
        let fields = EntryFields {
            label: "Mail".into(),
            secret: "p@ss1".into(),
            ..EntryFields::default()
        };
        assert_eq!(fields.username_or_default(), "");
        assert_eq!(fields.category_or_default(), DEFAULT_CATEGORY);
        assert_eq!(fields.notes_or_default(), "");
    }

    #[test]
    fn empty_category_falls_back_to_default() {
        let fields = EntryFields {
            category: Some(String::new()),
            ..EntryFields::default()
        };
        assert_eq!(fields.category_or_default(), DEFAULT_CATEGORY);
    }

    #[test]
    fn entry_debug_hides_secret() {
        let now = Utc::now();
        let entry = Entry {
            id: 1,
            label: "Mail".into(),
            username: "a@b.com".into(),
            secret: "p@ss1".into(),
            category: DEFAULT_CATEGORY.into(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert!(!format!("{entry:?}").contains("p@ss1"));
    }
}
