//! The V3 open pipeline.
//!
//! ```text
//! read_container -> derive_master_key -> unwrap subkeys -> decrypt_cbc
//!                -> parse_records -> verify HMAC -> decode header/entries
//! ```
//!
//! Every step before decoding is fatal.  Field decode failures are not:
//! they are collected into [`FieldErrors`] next to the result.

use std::fmt;

use tracing::{debug, warn};
use zeroize::Zeroize;

use super::container::read_container;
use super::fields::decode_entry;
use super::header::{decode_header, Header};
use super::record::parse_records;
use crate::crypto::{decrypt_cbc, derive_master_key};
use crate::errors::{FieldErrors, Result};
use crate::vault::Entry;

/// Steps of an open, in order.  Used to label log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sniffing,
    Container,
    KeyDerivation,
    KeyUnwrap,
    Decryption,
    RecordParsing,
    Integrity,
    Decoding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Sniffing => "sniffing",
            Stage::Container => "container",
            Stage::KeyDerivation => "key derivation",
            Stage::KeyUnwrap => "key unwrap",
            Stage::Decryption => "decryption",
            Stage::RecordParsing => "record parsing",
            Stage::Integrity => "integrity",
            Stage::Decoding => "decoding",
        })
    }
}

/// Everything recovered from a V3 file.
#[derive(Debug)]
pub struct Decoded {
    pub header: Header,
    /// Entries in file order.
    pub entries: Vec<Entry>,
    pub field_errors: FieldErrors,
}

/// Decrypt, verify and decode a complete V3 file held in memory.
pub fn open_v3(data: &[u8], password: &[u8]) -> Result<Decoded> {
    let container = read_container(data)?;
    debug!(
        stage = %Stage::Container,
        iterations = container.iterations,
        ciphertext_len = container.ciphertext.len(),
        "envelope read"
    );

    let master_key = derive_master_key(
        password,
        &container.salt,
        container.iterations,
        &container.key_check,
    )?;
    debug!(stage = %Stage::KeyDerivation, "key check passed");

    let enc_key = master_key.unwrap_subkey(&container.wrapped_enc_key)?;
    let hmac_key = master_key.unwrap_subkey(&container.wrapped_hmac_key)?;
    drop(master_key);
    debug!(stage = %Stage::KeyUnwrap, "subkeys unwrapped");

    let mut plaintext = decrypt_cbc(enc_key.as_bytes(), &container.iv, &container.ciphertext)?;
    drop(enc_key);
    debug!(stage = %Stage::Decryption, len = plaintext.len(), "body decrypted");

    let parsed = parse_records(&plaintext, hmac_key.as_bytes());
    plaintext.zeroize();
    let stream = parsed?;
    debug!(
        stage = %Stage::RecordParsing,
        entries = stream.entries.len(),
        consumed = stream.consumed,
        "record stream parsed"
    );

    stream.verify(&container.hmac)?;
    debug!(stage = %Stage::Integrity, "HMAC verified");

    let (header, mut field_errors) = decode_header(&stream.header);
    let mut entries = Vec::with_capacity(stream.entries.len());
    for (index, record) in stream.entries.iter().enumerate() {
        let (entry, errors) = decode_entry(record, index);
        field_errors.extend(errors);
        entries.push(entry);
    }

    if field_errors.is_empty() {
        debug!(stage = %Stage::Decoding, entries = entries.len(), "records decoded");
    } else {
        warn!(
            stage = %Stage::Decoding,
            failed = field_errors.len(),
            "some fields could not be decoded"
        );
    }

    Ok(Decoded {
        header,
        entries,
        field_errors,
    })
}
