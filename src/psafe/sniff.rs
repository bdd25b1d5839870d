//! Classify a file as V3, legacy V1/V2, or unknown without decrypting it.

use std::fmt;
use std::io;

use super::container::TAG;
use crate::crypto::legacy::{legacy_mac, MAC_LEN, NONCE_LEN};
use crate::errors::Result;

/// Detected database format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    V3,
    /// V1 and V2 cannot be told apart before decryption.
    LegacyV1V2,
    Unknown,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::V3 => "V3",
            Format::LegacyV1V2 => "V1/V2",
            Format::Unknown => "unknown",
        })
    }
}

/// Guess the format of `data`.
///
/// The V3 check is the magic tag alone.  The legacy check recomputes the
/// authentication value at the start of the file under `password`, so a
/// legacy file opened with the wrong password classifies as unknown.
/// Input too short for a check to read fails with an IO error.
pub fn guess_format(data: &[u8], password: &str) -> Result<Format> {
    let magic = data.get(..TAG.len()).ok_or_else(|| too_short(data.len()))?;
    if magic == TAG {
        return Ok(Format::V3);
    }

    let prefix = data
        .get(..NONCE_LEN + MAC_LEN)
        .ok_or_else(|| too_short(data.len()))?;
    let (nonce, stored) = prefix.split_at(NONCE_LEN);
    let mut rnd = [0u8; NONCE_LEN];
    rnd.copy_from_slice(nonce);

    if legacy_mac(password.as_bytes(), &rnd)? == stored {
        Ok(Format::LegacyV1V2)
    } else {
        Ok(Format::Unknown)
    }
}

fn too_short(len: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("file too short to identify ({len} bytes)"),
    )
}
