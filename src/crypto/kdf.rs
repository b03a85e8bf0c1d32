//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The same function produces two independent outputs
//! from one (password, salt) pair:
//!
//! - a 64-byte **verification hash**, stored in the master credential and
//!   compared at unlock time;
//! - a 32-byte **encryption key**, held in memory as the session key (or
//!   used once as an export key).
//!
//! The two are separate Argon2id invocations with different output
//! lengths.  Neither is ever derived from the other.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroize;

use crate::errors::{CryptHubError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived encryption key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Length of the verification hash in bytes.
pub const HASH_LEN: usize = 64;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// The parameter set is part of the vault contract: a vault and every
/// bundle it exports must be opened with the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Derive the 64-byte verification hash for `password` under `salt`.
pub fn derive_verification_hash(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<[u8; HASH_LEN]> {
    let mut hash = [0u8; HASH_LEN];
    argon2id_into(password, salt, params, &mut hash)?;
    Ok(hash)
}

/// Derive a 32-byte symmetric key for `password` under `salt`.
///
/// The same password + salt + params will always produce the same key.
pub fn derive_encryption_key(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    argon2id_into(password, salt, params, &mut key)?;
    Ok(key)
}

/// Run one full Argon2id computation, filling `out` entirely.
///
/// Enforces minimum Argon2 parameters to prevent dangerously weak KDF settings.
fn argon2id_into(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
    out: &mut [u8],
) -> Result<()> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(CryptHubError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(CryptHubError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(CryptHubError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(out.len()),
    )
    .map_err(|e| CryptHubError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2.hash_password_into(password, salt, out).map_err(|e| {
        out.zeroize();
        CryptHubError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}"))
    })
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptHubError::RandomSource(e.to_string()))?;
    Ok(salt)
}
