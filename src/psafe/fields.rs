//! Field decoders and the entry field table.
//!
//! Each known entry tag maps to a canonical name and one of a closed set of
//! decoders.  Tags outside the table are kept as hex under a synthesized
//! `0x..` name.  A failing decoder drops only that field; the error is
//! collected and the rest of the record still decodes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::record::Record;
use crate::errors::{FieldDecodeError, FieldErrors};
use crate::vault::entry::{
    GROUP_FIELD, ID_FIELD, NAME_FIELD, NOTE_FIELD, PASSWORD_FIELD, URL_FIELD, USERNAME_FIELD,
};
use crate::vault::{Entry, Value};

/// How the payload of a field is turned into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Bytes as text (lossy UTF-8).
    PlainText,
    /// Bytes as text, wrapped as a secret.
    SensitiveText,
    /// 4-byte LE Unix seconds, or the 8-character hex form.
    Timestamp,
    /// 16 raw bytes.
    UuidText,
    /// Hex-encoded bytes, for fields that are kept but not interpreted.
    HexFallback,
}

impl Decoder {
    pub fn decode(self, data: &[u8]) -> Result<Value, String> {
        match self {
            Decoder::PlainText => Ok(Value::Text(String::from_utf8_lossy(data).into_owned())),
            Decoder::SensitiveText => Ok(Value::secret(String::from_utf8_lossy(data))),
            Decoder::Timestamp => parse_timestamp(data).map(Value::Timestamp),
            Decoder::UuidText => parse_uuid(data).map(Value::Uuid),
            Decoder::HexFallback => Ok(Value::Text(hex::encode(data))),
        }
    }
}

/// One row of the entry field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub tag: u8,
    pub name: &'static str,
    pub decoder: Decoder,
}

const fn spec(tag: u8, name: &'static str, decoder: Decoder) -> FieldSpec {
    FieldSpec { tag, name, decoder }
}

/// Entry field table, sorted by tag.
pub static ENTRY_FIELDS: &[FieldSpec] = &[
    spec(0x01, ID_FIELD, Decoder::UuidText),
    spec(0x02, GROUP_FIELD, Decoder::PlainText),
    spec(0x03, NAME_FIELD, Decoder::PlainText),
    spec(0x04, USERNAME_FIELD, Decoder::PlainText),
    spec(0x05, NOTE_FIELD, Decoder::SensitiveText),
    spec(0x06, PASSWORD_FIELD, Decoder::SensitiveText),
    spec(0x07, "creationTime", Decoder::Timestamp),
    spec(0x08, "passwordModificationTime", Decoder::Timestamp),
    spec(0x09, "lastAccessTime", Decoder::Timestamp),
    spec(0x0a, "passwordExpiryTime", Decoder::Timestamp),
    spec(0x0c, "lastModificationTime", Decoder::Timestamp),
    spec(0x0d, URL_FIELD, Decoder::PlainText),
    spec(0x0e, "autotype", Decoder::HexFallback),
    spec(0x0f, "passwordHistory", Decoder::HexFallback),
    spec(0x10, "passwordPolicy", Decoder::HexFallback),
    spec(0x11, "passwordExpiryInterval", Decoder::HexFallback),
    spec(0x12, "runCommand", Decoder::HexFallback),
    spec(0x13, "doubleClickAction", Decoder::HexFallback),
    spec(0x14, "email", Decoder::PlainText),
    spec(0x15, "protectedEntry", Decoder::HexFallback),
    spec(0x16, "ownSymbolsForPassword", Decoder::HexFallback),
    spec(0x17, "shiftDoubleClickAction", Decoder::HexFallback),
    spec(0x18, "passwordPolicyName", Decoder::HexFallback),
    spec(0x19, "entryKeyboardShortcut", Decoder::HexFallback),
    // Reserved by the format, not written by current PasswordSafe releases.
    spec(0x1b, "twoFactorKeyField", Decoder::HexFallback),
    spec(0x1c, "creditCardNumberField", Decoder::HexFallback),
    spec(0x1d, "creditCardExpirationField", Decoder::HexFallback),
    spec(0x1e, "creditCardCVVField", Decoder::HexFallback),
    spec(0x1f, "creditCardPINField", Decoder::HexFallback),
    spec(0x20, "qrCodeField", Decoder::HexFallback),
    spec(0xdf, "unknownField", Decoder::HexFallback),
];

/// Look up an entry tag.
pub fn entry_field(tag: u8) -> Option<&'static FieldSpec> {
    ENTRY_FIELDS
        .binary_search_by_key(&tag, |s| s.tag)
        .ok()
        .map(|i| &ENTRY_FIELDS[i])
}

/// Name used for a tag with no table row.
pub fn unknown_field_name(tag: u8) -> String {
    format!("0x{tag:02x}")
}

/// Build an entry from one record, collecting per-field failures.
pub fn decode_entry(record: &Record, index: usize) -> (Entry, FieldErrors) {
    let mut entry = Entry::new();
    let mut errors = FieldErrors::new();

    for field in &record.fields {
        let (name, decoder) = match entry_field(field.tag) {
            Some(spec) => (spec.name.to_string(), spec.decoder),
            None => (unknown_field_name(field.tag), Decoder::HexFallback),
        };

        match decoder.decode(&field.data) {
            Ok(value) => entry = entry.with(name, value),
            Err(reason) => errors.push(FieldDecodeError {
                record: format!("entry {index}"),
                field: name,
                reason,
            }),
        }
    }

    (entry, errors)
}

/// Decode a timestamp field.
///
/// Current files store 4 little-endian bytes of signed Unix seconds.  Files
/// written by old releases store the same 4 bytes as 8 hex characters in
/// big-endian order.
pub fn parse_timestamp(data: &[u8]) -> Result<DateTime<Utc>, String> {
    let raw: [u8; 4] = match data.len() {
        4 => [data[0], data[1], data[2], data[3]],
        8 => {
            let decoded = hex::decode(data).map_err(|e| format!("invalid hex timestamp: {e}"))?;
            [decoded[3], decoded[2], decoded[1], decoded[0]]
        }
        n => return Err(format!("expected 4 or 8 bytes for timestamp, got {n}")),
    };

    let secs = i32::from_le_bytes(raw);
    DateTime::from_timestamp(i64::from(secs), 0)
        .ok_or_else(|| format!("timestamp {secs} is out of range"))
}

fn parse_uuid(data: &[u8]) -> Result<Uuid, String> {
    Uuid::from_slice(data).map_err(|e| format!("invalid uuid: {e}"))
}
