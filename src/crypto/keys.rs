//! Key material held during a single open.
//!
//! The stretched master key never decrypts the body directly.  It unwraps
//! two independent 32-byte subkeys stored in the file header:
//! - the **encryption subkey** (blocks B1, B2) for the record stream,
//! - the **HMAC subkey** (blocks B3, B4) for the integrity check.

use zeroize::Zeroize;

use super::encryption::{decrypt_ecb, BLOCK_SIZE};
use crate::errors::{NotpassError, Result};

/// Length of every key in the V3 format (256 bits).
pub const KEY_LEN: usize = 32;

/// Length of a wrapped subkey: two Twofish blocks.
pub const WRAPPED_KEY_LEN: usize = 2 * BLOCK_SIZE;

/// The stretched password key.  Zeroized on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Unwrap one of the subkeys stored under this master key.
    pub fn unwrap_subkey(&self, wrapped: &[u8]) -> Result<SubKey> {
        unwrap_subkey(&self.bytes, wrapped)
    }
}

/// An unwrapped encryption or HMAC subkey.  Zeroized on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SubKey {
    bytes: [u8; KEY_LEN],
}

impl SubKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// ECB-decrypt exactly two blocks under `master_key`.
pub fn unwrap_subkey(master_key: &[u8], wrapped: &[u8]) -> Result<SubKey> {
    if wrapped.len() != WRAPPED_KEY_LEN {
        return Err(NotpassError::Crypto(format!(
            "wrapped key must be {WRAPPED_KEY_LEN} bytes, got {}",
            wrapped.len()
        )));
    }

    let mut plain = decrypt_ecb(master_key, wrapped)?;
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&plain);
    plain.zeroize();

    Ok(SubKey { bytes })
}
