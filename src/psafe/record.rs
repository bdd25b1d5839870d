//! Decrypted record stream and its running HMAC.
//!
//! The plaintext is a sequence of fields:
//!
//! ```text
//! [length: 4 LE][type: 1][payload: length][zero padding to a 16-byte boundary]
//! ```
//!
//! Fields are grouped into records, each closed by a field of type `0xff`.
//! The first record is the database header; every following record is an
//! entry.  The HMAC covers only the payload bytes of every field, terminators
//! included, in stream order.  Padding is skipped without inspecting it.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::container::HMAC_LEN;
use crate::crypto::BLOCK_SIZE;
use crate::errors::{NotpassError, Result};

/// Type tag that closes a header or entry record.
pub const END_OF_RECORD: u8 = 0xff;

/// Length prefix plus type byte.
const FIELD_PREFIX_LEN: usize = 5;

type HmacSha256 = Hmac<Sha256>;

/// Smallest unit of the stream.  The payload is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct Field {
    pub tag: u8,
    pub data: Vec<u8>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("tag", &format_args!("{:#04x}", self.tag))
            .field("len", &self.data.len())
            .finish()
    }
}

/// The fields of one record, terminator excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub fields: Vec<Field>,
}

/// Result of walking the whole stream.
#[derive(Debug)]
pub struct RecordStream {
    pub header: Record,
    pub entries: Vec<Record>,
    /// Bytes consumed, prefixes and padding included.
    pub consumed: usize,
    computed_hmac: [u8; HMAC_LEN],
}

impl RecordStream {
    /// HMAC-SHA256 over every field payload that was read.
    pub fn computed_hmac(&self) -> &[u8; HMAC_LEN] {
        &self.computed_hmac
    }

    /// Check the accumulated HMAC against the value stored in the file.
    pub fn verify(&self, stored: &[u8]) -> Result<()> {
        verify_integrity(&self.computed_hmac, stored)
    }
}

/// Compare two HMAC values in constant time.
pub fn verify_integrity(computed: &[u8], stored: &[u8]) -> Result<()> {
    if bool::from(computed.ct_eq(stored)) {
        Ok(())
    } else {
        Err(NotpassError::HmacMismatch)
    }
}

/// Parse the header record and every entry record from `plaintext`.
///
/// Any malformed prefix or truncated read abandons the whole stream.
pub fn parse_records(plaintext: &[u8], hmac_key: &[u8]) -> Result<RecordStream> {
    let mac = HmacSha256::new_from_slice(hmac_key)
        .map_err(|e| NotpassError::Crypto(format!("invalid HMAC key: {e}")))?;
    let mut reader = FieldReader {
        data: plaintext,
        pos: 0,
        mac,
    };

    let header = reader
        .read_record()?
        .ok_or_else(|| NotpassError::Parse("missing header record".into()))?;

    let mut entries = Vec::new();
    while let Some(record) = reader.read_record()? {
        entries.push(record);
    }

    Ok(RecordStream {
        header,
        entries,
        consumed: reader.pos,
        computed_hmac: reader.mac.finalize().into_bytes().into(),
    })
}

struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
    mac: HmacSha256,
}

impl FieldReader<'_> {
    /// `None` when the data ends exactly where a record would begin.
    fn read_record(&mut self) -> Result<Option<Record>> {
        let start = self.pos;
        let mut fields = Vec::new();

        loop {
            match self.read_field()? {
                None if fields.is_empty() => return Ok(None),
                None => {
                    return Err(NotpassError::Parse(format!(
                        "record at offset {start} has no terminator"
                    )))
                }
                Some(field) if field.tag == END_OF_RECORD => {
                    return Ok(Some(Record { fields }));
                }
                Some(field) => fields.push(field),
            }
        }
    }

    fn read_field(&mut self) -> Result<Option<Field>> {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < FIELD_PREFIX_LEN {
            return Err(NotpassError::Parse(format!(
                "truncated field prefix at offset {}",
                self.pos
            )));
        }

        let prefix = &self.data[self.pos..self.pos + FIELD_PREFIX_LEN];
        let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        let tag = prefix[4];
        let len = usize::try_from(len)
            .map_err(|_| NotpassError::Parse(format!("field length {len} is too large")))?;

        let body_start = self.pos + FIELD_PREFIX_LEN;
        let available = self.data.len() - body_start;
        if len > available {
            return Err(NotpassError::Parse(format!(
                "field at offset {} claims {len} bytes but only {available} remain",
                self.pos
            )));
        }
        let data = self.data[body_start..body_start + len].to_vec();

        let padding = padding_len(len);
        if padding > available - len {
            return Err(NotpassError::Parse(format!(
                "truncated padding after field at offset {}",
                self.pos
            )));
        }

        self.mac.update(&data);
        self.pos = body_start + len + padding;

        Ok(Some(Field { tag, data }))
    }
}

/// Zero bytes that follow a field so the next one starts on a block boundary.
fn padding_len(payload_len: usize) -> usize {
    let used = (FIELD_PREFIX_LEN + payload_len) % BLOCK_SIZE;
    if used == 0 {
        0
    } else {
        BLOCK_SIZE - used
    }
}
