//! Database header record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::fields::{parse_timestamp, Decoder};
use super::record::Record;
use crate::errors::{FieldDecodeError, FieldErrors};

pub const VERSION_FIELD: u8 = 0x00;
pub const UUID_FIELD: u8 = 0x01;
pub const NON_DEFAULT_PREFERENCES_FIELD: u8 = 0x02;
pub const TREE_DISPLAY_STATUS_FIELD: u8 = 0x03;
pub const LAST_SAVED_AT_FIELD: u8 = 0x04;
/// Superseded by the three `LAST_SAVED_BY_*` fields.
pub const LAST_SAVED_BY_FIELD: u8 = 0x05;
pub const LAST_SAVED_BY_WHAT_FIELD: u8 = 0x06;
pub const LAST_SAVED_BY_WHOM_FIELD: u8 = 0x07;
pub const LAST_SAVED_ON_HOST_FIELD: u8 = 0x08;
pub const DATABASE_NAME_FIELD: u8 = 0x09;
pub const DATABASE_DESCRIPTION_FIELD: u8 = 0x0a;
pub const DATABASE_FILTERS_FIELD: u8 = 0x0b;
pub const RECENTLY_USED_ENTRIES_FIELD: u8 = 0x0f;
pub const NAMED_PASSWORD_POLICIES_FIELD: u8 = 0x10;
pub const EMPTY_GROUPS_FIELD: u8 = 0x11;
pub const YUBICO_FIELD: u8 = 0x12;
pub const MASTER_PASSWORD_CHANGED_AT_FIELD: u8 = 0x13;

/// Decoded database header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_saved_by_what: String,
    pub last_saved_by_whom: String,
    pub last_saved_on_host: String,
    pub empty_groups: Vec<String>,
    /// Every tag not decoded above, with its raw payload.
    pub unparsed_fields: BTreeMap<u8, Vec<u8>>,
}

/// Decode the header record, collecting per-field failures.
pub fn decode_header(record: &Record) -> (Header, FieldErrors) {
    let mut header = Header::default();
    let mut errors = FieldErrors::new();

    for field in &record.fields {
        if let Err(reason) = header.apply(field.tag, &field.data) {
            errors.push(FieldDecodeError {
                record: "header".into(),
                field: header_field_name(field.tag),
                reason,
            });
        }
    }

    (header, errors)
}

impl Header {
    fn apply(&mut self, tag: u8, data: &[u8]) -> Result<(), String> {
        match tag {
            VERSION_FIELD => {
                let raw: [u8; 2] = data
                    .try_into()
                    .map_err(|_| format!("expected 2 bytes for version, got {}", data.len()))?;
                self.version = u16::from_le_bytes(raw);
            }
            UUID_FIELD => {
                self.uuid = Uuid::from_slice(data).map_err(|e| format!("invalid uuid: {e}"))?;
            }
            LAST_SAVED_AT_FIELD => self.last_saved_at = Some(parse_timestamp(data)?),
            LAST_SAVED_BY_WHAT_FIELD => self.last_saved_by_what = text(data),
            LAST_SAVED_BY_WHOM_FIELD => self.last_saved_by_whom = text(data),
            LAST_SAVED_ON_HOST_FIELD => self.last_saved_on_host = text(data),
            DATABASE_NAME_FIELD => self.name = text(data),
            DATABASE_DESCRIPTION_FIELD => self.description = text(data),
            EMPTY_GROUPS_FIELD => self.empty_groups.push(text(data)),
            _ => {
                self.unparsed_fields.insert(tag, data.to_vec());
            }
        }
        Ok(())
    }

    /// A retained header field, hex-encoded.
    pub fn unparsed_hex(&self, tag: u8) -> Option<String> {
        self.unparsed_fields
            .get(&tag)
            .and_then(|data| Decoder::HexFallback.decode(data).ok())
            .map(|v| v.as_string())
    }
}

fn text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

fn header_field_name(tag: u8) -> String {
    match tag {
        VERSION_FIELD => "version".into(),
        UUID_FIELD => "uuid".into(),
        LAST_SAVED_AT_FIELD => "lastSavedAt".into(),
        _ => format!("0x{tag:02x}"),
    }
}
