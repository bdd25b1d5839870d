//! Fixed-layout V3 envelope.
//!
//! A `.psafe3` file has this layout:
//!
//! ```text
//! [TAG "PWS3": 4][SALT: 32][ITER: 4 LE][H(P'): 32][B1 B2: 32][B3 B4: 32][IV: 16]
//! [ciphertext: n * 16]
//! [EOF "PWS3-EOFPWS3-EOF": 16][HMAC: 32]
//! ```
//!
//! - **H(P')**: SHA-256 of the stretched password, the key check.
//! - **B1 B2**: encryption subkey wrapped under the stretched password.
//! - **B3 B4**: HMAC subkey wrapped under the stretched password.
//! - **HMAC**: HMAC-SHA256 over the decrypted field payloads.
//!
//! Both markers are checked here, before any cryptography runs.

use crate::crypto::keys::WRAPPED_KEY_LEN;
use crate::crypto::BLOCK_SIZE;
use crate::errors::{NotpassError, Result};

/// Magic bytes at the start of every V3 file.
pub const TAG: &[u8; 4] = b"PWS3";

/// Marker between the ciphertext and the trailing HMAC.
pub const EOF_MARKER: &[u8; 16] = b"PWS3-EOFPWS3-EOF";

pub const SALT_LEN: usize = 32;
pub const HASH_LEN: usize = 32;
pub const IV_LEN: usize = BLOCK_SIZE;
pub const HMAC_LEN: usize = 32;

/// Everything before the ciphertext.
pub const PREFIX_LEN: usize =
    TAG.len() + SALT_LEN + 4 + HASH_LEN + 2 * WRAPPED_KEY_LEN + IV_LEN;

/// Everything after the ciphertext.
pub const SUFFIX_LEN: usize = EOF_MARKER.len() + HMAC_LEN;

/// The sliced envelope of a V3 file.  Scratch state for one open.
#[derive(Debug, Clone)]
pub struct Container {
    pub salt: [u8; SALT_LEN],
    pub iterations: u32,
    pub key_check: [u8; HASH_LEN],
    pub wrapped_enc_key: [u8; WRAPPED_KEY_LEN],
    pub wrapped_hmac_key: [u8; WRAPPED_KEY_LEN],
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub hmac: [u8; HMAC_LEN],
}

/// Slice a V3 file into its envelope fields.
pub fn read_container(data: &[u8]) -> Result<Container> {
    if data.len() < TAG.len() || &data[..TAG.len()] != TAG {
        return Err(NotpassError::InvalidVaultFormat(
            "missing PWS3 tag".into(),
        ));
    }
    if data.len() < PREFIX_LEN + SUFFIX_LEN {
        return Err(NotpassError::InvalidVaultFormat(format!(
            "file too small to be a V3 vault ({} bytes)",
            data.len()
        )));
    }

    let ciphertext_end = data.len() - SUFFIX_LEN;
    if &data[ciphertext_end..ciphertext_end + EOF_MARKER.len()] != EOF_MARKER {
        return Err(NotpassError::InvalidVaultFormat(
            "missing PWS3-EOFPWS3-EOF marker".into(),
        ));
    }

    let mut cursor = Cursor::new(&data[TAG.len()..PREFIX_LEN]);
    let salt = cursor.array()?;
    let iterations = u32::from_le_bytes(cursor.array()?);
    let key_check = cursor.array()?;
    let wrapped_enc_key = cursor.array()?;
    let wrapped_hmac_key = cursor.array()?;
    let iv = cursor.array()?;

    let mut trailer = Cursor::new(&data[ciphertext_end + EOF_MARKER.len()..]);
    let hmac = trailer.array()?;

    Ok(Container {
        salt,
        iterations,
        key_check,
        wrapped_enc_key,
        wrapped_hmac_key,
        iv,
        ciphertext: data[PREFIX_LEN..ciphertext_end].to_vec(),
        hmac,
    })
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let bytes: [u8; N] = self
            .data
            .get(self.pos..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| NotpassError::InvalidVaultFormat("truncated envelope".into()))?;
        self.pos = end;
        Ok(bytes)
    }
}
