//! Sealing the whole vault into a bundle.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use zeroize::Zeroize;

use super::format::{self, FILE_EXTENSION};
use super::payload::ExportPayload;
use crate::crypto::kdf::{derive_encryption_key, generate_salt};
use crate::crypto::{encrypt, SessionKey};
use crate::errors::{CryptHubError, Result};
use crate::vault::{AuthSession, VaultStore};

/// Outcome of a successful export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub count: usize,
}

/// Build the complete bundle bytes for the current vault.
///
/// Requires an unlocked session.  Returns the bytes and the number of
/// entries sealed inside.
///
/// The export key is Argon2id(verification hash, fresh export salt), so
/// opening the bundle later means re-deriving the verification hash from
/// the master password.
pub fn export_bundle(store: &VaultStore, session: &AuthSession) -> Result<(Vec<u8>, usize)> {
    session.key()?;

    let credential = store
        .db()
        .load_master()?
        .ok_or(CryptHubError::NoCredential)?;
    let entries = store.decrypt_all_by_id(session)?;
    let count = entries.len();

    let mut payload = ExportPayload::new(&credential, entries);
    let serialized = serde_json::to_vec(&payload);
    payload.zeroize();
    let mut plaintext =
        serialized.map_err(|e| CryptHubError::SerializationError(format!("payload: {e}")))?;

    let export_salt = generate_salt()?;
    let mut key_bytes =
        derive_encryption_key(&credential.verification_hash, &export_salt, session.params())?;
    let export_key = SessionKey::new(key_bytes);
    key_bytes.zeroize();

    let sealed = encrypt(export_key.as_bytes(), &plaintext);
    plaintext.zeroize();
    let blob = sealed?;

    let bundle = format::encode_bundle(export_salt, &credential.salt, &blob)?;
    Ok((bundle, count))
}

/// Export the vault to `path`, written atomically.
pub fn export_to_path(store: &VaultStore, session: &AuthSession, path: &Path) -> Result<ExportSummary> {
    let (bundle, count) = export_bundle(store, session)?;
    format::write_bundle(path, &bundle)?;
    Ok(ExportSummary {
        path: path.to_path_buf(),
        count,
    })
}

/// Suggested file name for an export made on `date`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("crypthub-backup-{}.{FILE_EXTENSION}", date.format("%Y-%m-%d"))
}
