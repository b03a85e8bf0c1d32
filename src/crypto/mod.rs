//! Cryptographic primitives for CryptHub.
//!
//! This module provides:
//! - Argon2id verification-hash and key derivation (`kdf`)
//! - AES-256-GCM field encryption and decryption (`encryption`)
//! - Zeroize-on-drop key holder (`keys`)
//! - Random password generation (`generator`)

pub mod encryption;
pub mod generator;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_encryption_key, ...};
pub use encryption::{decrypt, encrypt, EncryptedBlob};
pub use generator::generate_password;
pub use kdf::{derive_encryption_key, derive_verification_hash, generate_salt, Argon2Params};
pub use keys::SessionKey;
