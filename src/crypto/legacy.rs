//! Authentication check used by PasswordSafe V1/V2 files.
//!
//! Only detection is supported.  A legacy file starts with an 8-byte random
//! nonce followed by a 20-byte value derived from the nonce and password;
//! recomputing that value tells us whether the file is legacy without
//! touching its body.

use blowfish::cipher::generic_array::GenericArray;
use blowfish::cipher::{BlockEncrypt, KeyInit};
use blowfish::Blowfish;
use sha1::{Digest, Sha1};

use crate::errors::{NotpassError, Result};

/// Length of the random nonce at the start of a legacy file.
pub const NONCE_LEN: usize = 8;

/// Length of the stored authentication value (SHA-1 output).
pub const MAC_LEN: usize = 20;

const ROUNDS: usize = 1000;

/// Compute the legacy authentication value for `nonce` under `password`.
pub fn legacy_mac(password: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<[u8; MAC_LEN]> {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update([0u8, 0u8]);
    hasher.update(password);
    let key = hasher.finalize();

    let cipher: Blowfish = Blowfish::new_from_slice(&key)
        .map_err(|e| NotpassError::Crypto(format!("invalid blowfish key: {e}")))?;

    // PasswordSafe runs Blowfish on little-endian words.
    let mut buf = swap_words(nonce);
    for _ in 0..ROUNDS {
        cipher.encrypt_block(GenericArray::from_mut_slice(&mut buf));
    }
    let buf = swap_words(&buf);

    Ok(sha1_from_zero_state(&buf))
}

fn swap_words(b: &[u8; NONCE_LEN]) -> [u8; NONCE_LEN] {
    [b[3], b[2], b[1], b[0], b[7], b[6], b[5], b[4]]
}

/// SHA-1 of `buf || 00 00` starting from an all-zero chaining state.
///
/// PasswordSafe V1/V2 hashes with a finalized SHA-1 context whose state has
/// been wiped, so the standard initial vector never applies.  The ten-byte message
/// always fits in one padded block.
fn sha1_from_zero_state(buf: &[u8; NONCE_LEN]) -> [u8; MAC_LEN] {
    const MESSAGE_LEN: usize = NONCE_LEN + 2;

    let mut block = [0u8; 64];
    block[..NONCE_LEN].copy_from_slice(buf);
    block[MESSAGE_LEN] = 0x80;
    block[56..].copy_from_slice(&((MESSAGE_LEN as u64) * 8).to_be_bytes());

    let mut state = [0u32; 5];
    sha1::compress(&mut state, &[block.into()]);

    let mut out = [0u8; MAC_LEN];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}
