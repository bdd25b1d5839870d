//! Password stretching for V3 vaults.
//!
//! The format does not use a standard KDF.  The stretched key is
//!
//! ```text
//! k0     = SHA-256(password || salt)
//! k(i+1) = SHA-256(k(i))            repeated `iterations` times
//! ```
//!
//! and the file stores `SHA-256(k_final)` so a candidate key can be checked
//! before any decryption happens.  The key itself is `k_final`, not its hash.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{NotpassError, Result};

/// Run the iterated SHA-256 stretch and return the raw candidate key.
pub fn stretch_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(password);
    hasher.update(salt);
    let mut key: [u8; KEY_LEN] = hasher.finalize().into();

    for _ in 0..iterations {
        let next: [u8; KEY_LEN] = Sha256::digest(key).into();
        key.zeroize();
        key = next;
    }

    key
}

/// Derive the master key and accept it only if `SHA-256(key)` equals the
/// stored key-check hash.
///
/// A mismatch is reported as [`NotpassError::AuthenticationFailed`] with no
/// further detail.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    expected_hash: &[u8],
) -> Result<MasterKey> {
    let mut candidate = stretch_key(password, salt, iterations);
    let check: [u8; KEY_LEN] = Sha256::digest(candidate).into();

    let matches: bool = check.as_slice().ct_eq(expected_hash).into();
    if !matches {
        candidate.zeroize();
        return Err(NotpassError::AuthenticationFailed);
    }

    let key = MasterKey::new(candidate);
    candidate.zeroize();
    Ok(key)
}
