//! Binary export bundle format.
//!
//! A `.crypthub` file has this layout:
//!
//! ```text
//! offset  size  field
//!      0     4  magic "CRHB"
//!      4     4  format version, u32 big-endian (currently 1)
//!      8    32  export salt
//!     40    64  master salt as ASCII hex, NUL-padded
//!    104    12  AES-GCM nonce
//!    116    16  AES-GCM tag
//!    132     *  ciphertext of the JSON payload
//! ```
//!
//! [`BundleHeader::parse`] validates a candidate file in one pass (length,
//! then magic, then version, then field slicing) before any key derivation
//! is attempted.

use std::fs;
use std::path::Path;

use argon2::MIN_SALT_LEN;

use crate::crypto::encryption::{EncryptedBlob, NONCE_LEN, TAG_LEN};
use crate::crypto::kdf::SALT_LEN;
use crate::errors::{CryptHubError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every bundle.
pub const MAGIC: &[u8; 4] = b"CRHB";

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 132;

/// Width of the NUL-padded master salt text field.
const MASTER_SALT_FIELD_LEN: usize = 64;

const VERSION_OFFSET: usize = 4;
const EXPORT_SALT_OFFSET: usize = 8;
const MASTER_SALT_OFFSET: usize = EXPORT_SALT_OFFSET + SALT_LEN;
const NONCE_OFFSET: usize = MASTER_SALT_OFFSET + MASTER_SALT_FIELD_LEN;
const TAG_OFFSET: usize = NONCE_OFFSET + NONCE_LEN;

/// File extension used for bundles.
pub const FILE_EXTENSION: &str = "crypthub";

// ---------------------------------------------------------------------------
// BundleHeader
// ---------------------------------------------------------------------------

/// The fixed-size header of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleHeader {
    pub version: u32,
    /// Salt the export key is derived under.
    pub export_salt: [u8; SALT_LEN],
    /// The vault's master salt (raw bytes; hex on disk).
    pub master_salt: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl BundleHeader {
    /// Serialize the header to its 132-byte on-disk form.
    pub fn encode(&self) -> Result<[u8; HEADER_LEN]> {
        let salt_hex = hex::encode(&self.master_salt);
        if salt_hex.len() > MASTER_SALT_FIELD_LEN {
            return Err(CryptHubError::SerializationError(format!(
                "master salt of {} bytes does not fit the header",
                self.master_salt.len()
            )));
        }

        let mut buf = [0u8; HEADER_LEN];
        buf[..VERSION_OFFSET].copy_from_slice(MAGIC);
        buf[VERSION_OFFSET..EXPORT_SALT_OFFSET].copy_from_slice(&self.version.to_be_bytes());
        buf[EXPORT_SALT_OFFSET..MASTER_SALT_OFFSET].copy_from_slice(&self.export_salt);
        // Remaining bytes of the salt field stay zero.
        buf[MASTER_SALT_OFFSET..MASTER_SALT_OFFSET + salt_hex.len()]
            .copy_from_slice(salt_hex.as_bytes());
        buf[NONCE_OFFSET..TAG_OFFSET].copy_from_slice(&self.nonce);
        buf[TAG_OFFSET..HEADER_LEN].copy_from_slice(&self.tag);
        Ok(buf)
    }

    /// Parse and validate a header, returning it with the ciphertext.
    ///
    /// - `CorruptFile` if the data cannot hold a header plus at least one
    ///   byte of ciphertext, or the master salt field is malformed.
    /// - `UnrecognizedFormat` if the magic or version does not match.
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8])> {
        if data.len() <= HEADER_LEN {
            return Err(CryptHubError::CorruptFile(format!(
                "{} bytes is not enough for a {HEADER_LEN}-byte header and payload",
                data.len()
            )));
        }

        if &data[..VERSION_OFFSET] != MAGIC {
            return Err(CryptHubError::UnrecognizedFormat(
                "missing CRHB magic bytes".into(),
            ));
        }

        let version = u32::from_be_bytes(fixed(&data[VERSION_OFFSET..EXPORT_SALT_OFFSET])?);
        if version != FORMAT_VERSION {
            return Err(CryptHubError::UnrecognizedFormat(format!(
                "unsupported version {version}, expected {FORMAT_VERSION}"
            )));
        }

        let header = Self {
            version,
            export_salt: fixed(&data[EXPORT_SALT_OFFSET..MASTER_SALT_OFFSET])?,
            master_salt: parse_master_salt(&data[MASTER_SALT_OFFSET..NONCE_OFFSET])?,
            nonce: fixed(&data[NONCE_OFFSET..TAG_OFFSET])?,
            tag: fixed(&data[TAG_OFFSET..HEADER_LEN])?,
        };

        Ok((header, &data[HEADER_LEN..]))
    }

    /// Pair the header's nonce and tag with a ciphertext.
    pub fn blob(&self, ciphertext: &[u8]) -> EncryptedBlob {
        EncryptedBlob {
            iv: self.nonce,
            tag: self.tag,
            ciphertext: ciphertext.to_vec(),
        }
    }
}

/// Decode the NUL-padded hex text of the master salt field.
fn parse_master_salt(field: &[u8]) -> Result<Vec<u8>> {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    if field[end..].iter().any(|b| *b != 0) {
        return Err(CryptHubError::CorruptFile(
            "master salt field has data after padding".into(),
        ));
    }

    let text = std::str::from_utf8(&field[..end])
        .map_err(|_| CryptHubError::CorruptFile("master salt is not text".into()))?;
    if text.is_empty() {
        return Err(CryptHubError::CorruptFile("master salt is empty".into()));
    }

    let salt =
        hex::decode(text).map_err(|e| CryptHubError::CorruptFile(format!("master salt: {e}")))?;
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptHubError::CorruptFile(format!(
            "master salt of {} bytes is shorter than {}",
            salt.len(),
            MIN_SALT_LEN
        )));
    }
    Ok(salt)
}

fn fixed<const N: usize>(slice: &[u8]) -> Result<[u8; N]> {
    slice
        .try_into()
        .map_err(|_| CryptHubError::CorruptFile("header field has wrong length".into()))
}

// ---------------------------------------------------------------------------
// Whole-bundle helpers
// ---------------------------------------------------------------------------

/// Concatenate an encoded header and the ciphertext of `blob`.
///
/// The nonce and tag of `blob` are written into the header.
pub fn encode_bundle(
    export_salt: [u8; SALT_LEN],
    master_salt: &[u8],
    blob: &EncryptedBlob,
) -> Result<Vec<u8>> {
    let header = BundleHeader {
        version: FORMAT_VERSION,
        export_salt,
        master_salt: master_salt.to_vec(),
        nonce: blob.iv,
        tag: blob.tag,
    };

    let mut buf = Vec::with_capacity(HEADER_LEN + blob.ciphertext.len());
    buf.extend_from_slice(&header.encode()?);
    buf.extend_from_slice(&blob.ciphertext);
    Ok(buf)
}

/// Write a bundle to disk **atomically**.
///
/// Writes to a temp file in the same directory, then renames it over
/// the target so readers never see a half-written bundle.
pub fn write_bundle(path: &Path, bundle: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, bundle)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}
