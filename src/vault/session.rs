//! Master-password authentication and the in-memory session key.
//!
//! `AuthSession` is a two-state machine:
//!
//! ```text
//!            initialize / unlock / restore
//!   Locked  ------------------------------>  Unlocked(SessionKey)
//!           <------------------------------
//!                 lock / restore (wipe)
//! ```
//!
//! The application root owns one `AuthSession` and passes it into every
//! store and migration call.  Anything that touches secret material asks
//! for [`AuthSession::key`], which fails with `VaultLocked` when no key
//! is held.  A key is only published after its derivation has finished.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::db::VaultDb;
use super::entry::MasterCredential;
use crate::crypto::kdf::{derive_encryption_key, derive_verification_hash, generate_salt};
use crate::crypto::{Argon2Params, SessionKey};
use crate::errors::{CryptHubError, Result};

/// Process-wide lock state of the vault.
#[derive(Debug)]
pub struct AuthSession {
    params: Argon2Params,
    key: Option<SessionKey>,
}

impl AuthSession {
    /// Create a locked session using the given KDF parameters.
    pub fn new(params: Argon2Params) -> Self {
        Self { params, key: None }
    }

    /// The KDF parameters every derivation in this session uses.
    pub fn params(&self) -> &Argon2Params {
        &self.params
    }

    /// Returns `true` while a session key is held.
    pub fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }

    /// Returns `true` if the vault has been initialized.
    pub fn has_master_credential(&self, db: &VaultDb) -> Result<bool> {
        Ok(db.load_master()?.is_some())
    }

    /// Set the master password of a fresh vault and unlock it.
    ///
    /// Fails with `AlreadyInitialized` if a credential exists.
    pub fn initialize(&mut self, db: &VaultDb, password: &[u8]) -> Result<()> {
        if db.load_master()?.is_some() {
            return Err(CryptHubError::AlreadyInitialized);
        }

        let salt = generate_salt()?;
        let mut hash = derive_verification_hash(password, &salt, &self.params)?;
        let key = self.derive_session_key(password, &salt)?;

        let credential = MasterCredential {
            verification_hash: hash.to_vec(),
            salt: salt.to_vec(),
        };
        hash.zeroize();
        db.insert_master(&credential)?;

        self.key = Some(key);
        Ok(())
    }

    /// Check `password` against the stored credential and unlock.
    ///
    /// On mismatch the session stays (or becomes) locked and
    /// `WrongPassword` is returned.
    pub fn unlock(&mut self, db: &VaultDb, password: &[u8]) -> Result<()> {
        let credential = db.load_master()?.ok_or(CryptHubError::NoCredential)?;

        let mut candidate = derive_verification_hash(password, &credential.salt, &self.params)?;
        let matches = hashes_match(&candidate, &credential.verification_hash);
        candidate.zeroize();

        if !matches {
            self.key = None;
            return Err(CryptHubError::WrongPassword);
        }

        let key = self.derive_session_key(password, &credential.salt)?;
        self.key = Some(key);
        Ok(())
    }

    /// Discard the session key.  Idempotent.
    pub fn lock(&mut self) {
        self.key = None;
    }

    /// The current session key, or `VaultLocked`.
    pub fn key(&self) -> Result<&SessionKey> {
        self.key.as_ref().ok_or(CryptHubError::VaultLocked)
    }

    /// Publish a key derived elsewhere (after a completed restore).
    pub(crate) fn install(&mut self, key: SessionKey) {
        self.key = Some(key);
    }

    /// Derive a session key for `password` under `salt` without publishing it.
    pub(crate) fn derive_session_key(&self, password: &[u8], salt: &[u8]) -> Result<SessionKey> {
        let mut bytes = derive_encryption_key(password, salt, &self.params)?;
        let key = SessionKey::new(bytes);
        bytes.zeroize();
        Ok(key)
    }
}

/// Constant-time comparison of two verification hashes.
pub(crate) fn hashes_match(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn new_session_is_locked() {
        let session = AuthSession::new(fast());
        assert!(!session.is_unlocked());
        assert!(matches!(session.key(), Err(CryptHubError::VaultLocked)));
    }

    #[test]
    fn lock_is_idempotent() {
        let mut session = AuthSession::new(fast());
        session.lock();
        session.lock();
        assert!(!session.is_unlocked());
    }

    #[test]
    fn hashes_match_requires_equal_length() {
        assert!(hashes_match(&[1, 2, 3], &[1, 2, 3]));
        assert!(!hashes_match(&[1, 2, 3], &[1, 2]));
        assert!(!hashes_match(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn wrong_password_relocks_an_unlocked_session() {
        let db = VaultDb::open_in_memory().unwrap();
        let mut session = AuthSession::new(fast());
        session.initialize(&db, b"first-password").unwrap();
        assert!(session.is_unlocked());

        let err = session.unlock(&db, b"not-the-password").unwrap_err();
        assert!(matches!(err, CryptHubError::WrongPassword));
        assert!(!session.is_unlocked());
    }
}
