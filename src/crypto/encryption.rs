//! Twofish block decryption in the two modes the V3 format uses.
//!
//! - ECB over exactly the wrapped-key blocks (`decrypt_ecb`).
//! - CBC over the record stream (`decrypt_cbc`).
//!
//! Neither mode carries padding: the format keeps every ciphertext a whole
//! number of 16-byte blocks.

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use twofish::cipher::generic_array::GenericArray;
use twofish::cipher::{BlockDecrypt, KeyInit};
use twofish::Twofish;

use crate::errors::{NotpassError, Result};

/// Twofish block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Decrypt each 16-byte block independently.
pub fn decrypt_ecb(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_block_aligned(ciphertext)?;

    let cipher = Twofish::new_from_slice(key)
        .map_err(|e| NotpassError::Crypto(format!("invalid key length: {e}")))?;

    let mut plaintext = ciphertext.to_vec();
    for block in plaintext.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    Ok(plaintext)
}

/// Decrypt a CBC chain starting from `iv`.
pub fn decrypt_cbc(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != BLOCK_SIZE {
        return Err(NotpassError::Crypto(format!(
            "invalid iv: expected {BLOCK_SIZE} bytes, got {}",
            iv.len()
        )));
    }
    check_block_aligned(ciphertext)?;

    let decryptor = cbc::Decryptor::<Twofish>::new_from_slices(key, iv)
        .map_err(|e| NotpassError::Crypto(format!("invalid key length: {e}")))?;

    let mut plaintext = ciphertext.to_vec();
    let len = decryptor
        .decrypt_padded_mut::<NoPadding>(&mut plaintext)
        .map_err(|e| NotpassError::Crypto(format!("CBC decryption failed: {e}")))?
        .len();
    plaintext.truncate(len);

    Ok(plaintext)
}

fn check_block_aligned(ciphertext: &[u8]) -> Result<()> {
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(NotpassError::Crypto(format!(
            "invalid ciphertext: length {} is not a multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn ecb_known_answer() {
        let key = unhex("d5791ed849e4e678b663cf4550d3a5cb50cef1dfe883e21303c77448ab12e538");
        let ct = unhex("5e0c1bc065597a53c8b6c053f222288688bc688e1d1b8b3e7bf45091bb48f863");
        let pt = unhex("f685bc4d2639e930658d7957b34e3394e713bc1269eb06801ffc1fdd9d984f7d");

        assert_eq!(decrypt_ecb(&key, &ct).unwrap(), pt);
    }

    #[test]
    fn ecb_rejects_partial_block() {
        let key = unhex("d5791ed849e4e678b663cf4550d3a5cb50cef1dfe883e21303c77448ab12e538");
        let result = decrypt_ecb(&key, &unhex("00010203040506070809"));
        assert!(matches!(result, Err(NotpassError::Crypto(_))));
    }

    #[test]
    fn ecb_rejects_bad_key_length() {
        let key = unhex("d5791ed849e4e678b663cf4550d3a5cb50cef1dfe883e21303");
        let ct = unhex("5e0c1bc065597a53c8b6c053f222288688bc688e1d1b8b3e7bf45091bb48f863");
        assert!(matches!(decrypt_ecb(&key, &ct), Err(NotpassError::Crypto(_))));
    }

    #[test]
    fn cbc_known_answer() {
        let key = unhex("f685bc4d2639e930658d7957b34e3394e713bc1269eb06801ffc1fdd9d984f7d");
        let iv = unhex("0e266716df85f52c2a8e9440a999c05b");
        let ct = unhex(concat!(
            "f244f638845a2042a70d1af162edb8566ae5ea87813e9ac75969e646bce56b0d",
            "93133bb985fefc7e20c6942b76709ee69369f6ec991438b011358789618b07ec"
        ));
        let pt = unhex(concat!(
            "0600000003582d57696e6710ee68095f04000000046c756b656c33f284e5c4ac",
            "0c000000064d794f594677653d357d2f40912cd5b7611fc7be03f74fe11fc332"
        ));

        assert_eq!(decrypt_cbc(&key, &iv, &ct).unwrap(), pt);
    }

    #[test]
    fn cbc_rejects_short_iv() {
        let key = [0u8; 32];
        let result = decrypt_cbc(&key, &[0u8; 8], &[0u8; 32]);
        assert!(matches!(result, Err(NotpassError::Crypto(_))));
    }

    #[test]
    fn cbc_rejects_partial_block() {
        let key = [0u8; 32];
        let result = decrypt_cbc(&key, &[0u8; 16], &[0u8; 25]);
        assert!(matches!(result, Err(NotpassError::Crypto(_))));
    }

    #[test]
    fn cbc_rejects_bad_key_length() {
        let result = decrypt_cbc(&[0u8; 7], &[0u8; 16], &[0u8; 16]);
        assert!(matches!(result, Err(NotpassError::Crypto(_))));
    }
}
