//! The JSON document sealed inside a bundle.
//!
//! Secrets appear in plaintext here, so a payload only ever lives in
//! memory between decryption and re-encryption.  Call `zeroize` on it
//! once it has been sealed or restored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::vault::{Entry, MasterCredential, DEFAULT_CATEGORY};

/// Snapshot of the whole vault at export time.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub exported_at: DateTime<Utc>,
    /// Hex of the master verification hash; acts as the bundle's signature.
    pub verification_hash: String,
    /// Hex of the master salt.
    pub master_salt: String,
    pub entries: Vec<ExportedEntry>,
}

/// One entry with its secret in plaintext.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedEntry {
    pub label: String,
    #[serde(default)]
    pub username: String,
    pub secret: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl ExportPayload {
    /// Build a payload from the master credential and decrypted entries.
    pub fn new(credential: &MasterCredential, entries: Vec<Entry>) -> Self {
        Self {
            exported_at: Utc::now(),
            verification_hash: hex::encode(&credential.verification_hash),
            master_salt: hex::encode(&credential.salt),
            entries: entries.into_iter().map(ExportedEntry::from).collect(),
        }
    }
}

impl From<Entry> for ExportedEntry {
    fn from(entry: Entry) -> Self {
        Self {
            label: entry.label,
            username: entry.username,
            secret: entry.secret,
            category: entry.category,
            notes: entry.notes,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl Zeroize for ExportPayload {
    fn zeroize(&mut self) {
        self.verification_hash.zeroize();
        for entry in &mut self.entries {
            entry.secret.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let credential = MasterCredential {
            verification_hash: vec![0xAA; 64],
            salt: vec![0xBB; 32],
        };
        let now = Utc::now();
        let entry = Entry {
            id: 7,
            label: "Mail".into(),
            username: "a@b.com".into(),
            secret: "p@ss1".into(),
            category: "General".into(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };

        let payload = ExportPayload::new(&credential, vec![entry]);
        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["verificationHash"], "aa".repeat(64));
        assert_eq!(json["masterSalt"], "bb".repeat(32));
        assert!(json["exportedAt"].is_string());
        assert_eq!(json["entries"][0]["secret"], "p@ss1");
        assert!(json["entries"][0]["createdAt"].is_string());
        assert!(json["entries"][0].get("id").is_none());
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let json = r#"{
            "label": "Mail",
            "secret": "x",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let entry: ExportedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.username, "");
        assert_eq!(entry.category, DEFAULT_CATEGORY);
        assert_eq!(entry.notes, "");
    }

    #[test]
    fn zeroize_clears_secrets() {
        let mut payload = ExportPayload {
            exported_at: Utc::now(),
            verification_hash: "abcd".into(),
            master_salt: "00".into(),
            entries: vec![ExportedEntry {
                label: "l".into(),
                username: String::new(),
                secret: "secret".into(),
                category: default_category(),
                notes: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }],
        };
        payload.zeroize();
        assert!(payload.entries[0].secret.is_empty());
        assert!(payload.verification_hash.is_empty());
    }
}
