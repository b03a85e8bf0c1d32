//! AES-256-GCM authenticated encryption of single values.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce.  The
//! nonce, the 16-byte authentication tag and the ciphertext are kept as
//! three separate fields of an [`EncryptedBlob`] so they can be stored in
//! their own columns or header slots.
//!
//! `decrypt` verifies the tag before any plaintext is returned.  On a tag
//! mismatch it fails with [`CryptHubError::DecryptionFailed`] and nothing
//! else; callers map that to the error that fits their context.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{CryptHubError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// An authenticated-encryption envelope: `{ iv, tag, ciphertext }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub iv: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Rebuild a blob from raw stored parts, checking the fixed lengths.
    pub fn from_parts(iv: &[u8], tag: &[u8], ciphertext: Vec<u8>) -> Result<Self> {
        let iv: [u8; NONCE_LEN] = iv.try_into().map_err(|_| CryptHubError::DecryptionFailed)?;
        let tag: [u8; TAG_LEN] = tag.try_into().map_err(|_| CryptHubError::DecryptionFailed)?;
        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }
}

/// Encrypt `plaintext` with a 32-byte `key` under a fresh random nonce.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<EncryptedBlob> {
    // Build the cipher from the raw key bytes.
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptHubError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // Never reuse a nonce, even for identical plaintext.
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // The AEAD output is ciphertext || tag.
    let mut sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CryptHubError::EncryptionFailed(format!("encryption error: {e}")))?;

    let tag_start = sealed
        .len()
        .checked_sub(TAG_LEN)
        .ok_or_else(|| CryptHubError::EncryptionFailed("AEAD output shorter than tag".into()))?;
    let tag_bytes = sealed.split_off(tag_start);

    let mut iv = [0u8; NONCE_LEN];
    iv.copy_from_slice(&nonce);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    Ok(EncryptedBlob {
        iv,
        tag,
        ciphertext: sealed,
    })
}

/// Decrypt a blob produced by `encrypt`.
///
/// Fails closed: if the tag does not verify, no plaintext is returned.
pub fn decrypt(key: &[u8], blob: &EncryptedBlob) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptHubError::DecryptionFailed)?;

    let mut sealed = Vec::with_capacity(blob.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&blob.ciphertext);
    sealed.extend_from_slice(&blob.tag);

    cipher
        .decrypt(Nonce::from_slice(&blob.iv), sealed.as_slice())
        .map_err(|_| CryptHubError::DecryptionFailed)
}
