//! Two-phase restore of a bundle.
//!
//! Phase 1 ([`stage_import`] / [`read_bundle`]) only checks structure and
//! hands back a [`PendingImport`].  Phase 2 ([`PendingImport::restore`])
//! runs the cryptography and, if both checks pass, replaces the vault.
//!
//! # Checks, in order
//!
//! 1. AEAD decryption under the export key re-derived from the candidate
//!    password.  A tag failure is `WrongPasswordOrCorrupt`; the two causes
//!    are deliberately not told apart.
//! 2. The payload's embedded verification hash must equal a fresh
//!    derivation from the candidate password and the payload's own master
//!    salt.  A mismatch is `SignatureMismatch`.
//!
//! Nothing durable changes until both checks pass.  The wipe and re-insert
//! then run in a single transaction.

use std::path::Path;

use chrono::{DateTime, Utc};
use zeroize::Zeroize;

use super::format::{BundleHeader, HEADER_LEN};
use super::payload::ExportPayload;
use crate::crypto::kdf::{derive_encryption_key, derive_verification_hash};
use crate::crypto::{decrypt, encrypt, SessionKey};
use crate::errors::{CryptHubError, Result};
use crate::vault::entry::EntryRecord;
use crate::vault::session::hashes_match;
use crate::vault::{AuthSession, MasterCredential, VaultStore};

/// Outcome of a successful restore.
#[derive(Debug, Clone)]
pub struct RestoreSummary {
    pub count: usize,
    pub exported_at: DateTime<Utc>,
}

/// A structurally valid bundle waiting for its master password.
///
/// Consumed by [`PendingImport::restore`]; dropping it cancels the import.
#[derive(Debug)]
pub struct PendingImport {
    header: BundleHeader,
    bundle: Vec<u8>,
}

/// Validate raw bundle bytes without any key derivation.
pub fn stage_import(bundle: Vec<u8>) -> Result<PendingImport> {
    let (header, _) = BundleHeader::parse(&bundle)?;
    Ok(PendingImport { header, bundle })
}

/// Read a candidate file from disk and stage it.
pub fn read_bundle(path: &Path) -> Result<PendingImport> {
    let bundle = std::fs::read(path)?;
    stage_import(bundle)
}

impl PendingImport {
    /// Format version declared by the bundle.
    pub fn version(&self) -> u32 {
        self.header.version
    }

    /// Total size of the bundle in bytes.
    pub fn len(&self) -> usize {
        self.bundle.len()
    }

    /// Always `false`: a staged bundle holds at least a header and payload.
    pub fn is_empty(&self) -> bool {
        self.bundle.is_empty()
    }

    /// Verify `password` against the bundle and, on success, replace the
    /// whole vault with its contents.
    ///
    /// The session is locked once the destructive step begins.  It is
    /// unlocked again under the restored credential only if the
    /// transaction commits; on a failed transaction the previous vault
    /// contents remain and the session stays locked.
    pub fn restore(
        self,
        store: &mut VaultStore,
        session: &mut AuthSession,
        password: &[u8],
    ) -> Result<RestoreSummary> {
        let mut payload = self.open(session, password)?;

        let result = install(&payload, store, session, password);
        payload.zeroize();
        let count = result?;

        Ok(RestoreSummary {
            count,
            exported_at: payload.exported_at,
        })
    }

    /// Run both cryptographic checks and return the verified payload.
    fn open(&self, session: &AuthSession, password: &[u8]) -> Result<ExportPayload> {
        let params = session.params();
        let ciphertext = &self.bundle[HEADER_LEN..];

        // Check 1: the AEAD tag under the re-derived export key.
        let mut candidate_hash =
            derive_verification_hash(password, &self.header.master_salt, params)?;
        let key_result = derive_encryption_key(&candidate_hash, &self.header.export_salt, params);
        candidate_hash.zeroize();
        let mut key_bytes = key_result?;
        let export_key = SessionKey::new(key_bytes);
        key_bytes.zeroize();

        let mut plaintext = decrypt(export_key.as_bytes(), &self.header.blob(ciphertext))
            .map_err(|_| CryptHubError::WrongPasswordOrCorrupt)?;
        let parsed = serde_json::from_slice::<ExportPayload>(&plaintext);
        plaintext.zeroize();
        let mut payload = parsed.map_err(|_| CryptHubError::WrongPasswordOrCorrupt)?;

        // Check 2: the embedded signature against the payload's own salt.
        if let Err(e) = verify_signature(&payload, password, session) {
            payload.zeroize();
            return Err(e);
        }

        Ok(payload)
    }
}

fn verify_signature(payload: &ExportPayload, password: &[u8], session: &AuthSession) -> Result<()> {
    let salt = hex::decode(&payload.master_salt).map_err(|_| CryptHubError::SignatureMismatch)?;
    let mut expected =
        hex::decode(&payload.verification_hash).map_err(|_| CryptHubError::SignatureMismatch)?;

    let mut actual = derive_verification_hash(password, &salt, session.params())?;
    let matches = hashes_match(&actual, &expected);
    actual.zeroize();
    expected.zeroize();

    if matches {
        Ok(())
    } else {
        Err(CryptHubError::SignatureMismatch)
    }
}

/// Re-encrypt the payload under a fresh session key and swap it in.
fn install(
    payload: &ExportPayload,
    store: &mut VaultStore,
    session: &mut AuthSession,
    password: &[u8],
) -> Result<usize> {
    let credential = MasterCredential {
        verification_hash: hex::decode(&payload.verification_hash)
            .map_err(|_| CryptHubError::SignatureMismatch)?,
        salt: hex::decode(&payload.master_salt).map_err(|_| CryptHubError::SignatureMismatch)?,
    };

    let new_key = session.derive_session_key(password, &credential.salt)?;

    let records = payload
        .entries
        .iter()
        .map(|e| -> Result<EntryRecord> {
            Ok(EntryRecord {
                label: e.label.clone(),
                username: e.username.clone(),
                secret: encrypt(new_key.as_bytes(), e.secret.as_bytes())?,
                category: e.category.clone(),
                notes: e.notes.clone(),
                created_at: e.created_at,
                updated_at: e.updated_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Point of no return: the old key is gone whatever happens next.
    session.lock();
    store.db_mut().replace_all(&credential, &records)?;
    session.install(new_key);

    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_rejects_short_file() {
        let err = stage_import(vec![0u8; HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, CryptHubError::CorruptFile(_)));
    }

    #[test]
    fn stage_rejects_wrong_magic() {
        let mut data = vec![0u8; HEADER_LEN + 10];
        data[..4].copy_from_slice(b"NOPE");
        let err = stage_import(data).unwrap_err();
        assert!(matches!(err, CryptHubError::UnrecognizedFormat(_)));
    }

    #[test]
    fn read_bundle_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = read_bundle(&dir.path().join("missing.crypthub")).unwrap_err();
        assert!(matches!(err, CryptHubError::Io(_)));
    }
}
