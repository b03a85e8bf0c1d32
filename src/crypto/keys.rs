//! In-memory key material.

use zeroize::Zeroize;

use super::kdf::KEY_LEN;

/// A wrapper around a 32-byte symmetric key that automatically zeroes
/// its memory when dropped.
///
/// Holds the session key while the vault is unlocked, and the one-off
/// export key while a bundle is being sealed or opened.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SessionKey {
    bytes: [u8; KEY_LEN],
}

impl SessionKey {
    /// Create a new `SessionKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(***)")
    }
}
