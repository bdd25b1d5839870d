//! Cryptographic primitives for PasswordSafe vaults.
//!
//! This module provides:
//! - Iterated SHA-256 password stretching with key check (`kdf`)
//! - Master key and subkey unwrapping (`keys`)
//! - Twofish ECB/CBC decryption (`encryption`)
//! - V1/V2 authentication value for format detection (`legacy`)
//! - YubiKey-compatible HMAC-SHA1 challenge-response (`challenge`)

pub mod challenge;
pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod legacy;

pub use challenge::yubi_hmac_sha1;
pub use encryption::{decrypt_cbc, decrypt_ecb, BLOCK_SIZE};
pub use kdf::{derive_master_key, stretch_key};
pub use keys::{unwrap_subkey, MasterKey, SubKey, KEY_LEN};
pub use legacy::legacy_mac;
