//! PasswordSafe file format.
//!
//! This module provides:
//! - Format detection for V3 and legacy V1/V2 files (`sniff`)
//! - The fixed V3 envelope (`container`)
//! - The decrypted record stream and its HMAC (`record`)
//! - Header and entry field decoding (`header`, `fields`)
//! - The full open pipeline (`db`)

pub mod container;
pub mod db;
pub mod fields;
pub mod header;
pub mod record;
pub mod sniff;

pub use container::{read_container, Container};
pub use db::{open_v3, Decoded, Stage};
pub use fields::{decode_entry, Decoder};
pub use header::{decode_header, Header};
pub use record::{parse_records, verify_integrity, Record, RecordStream};
pub use sniff::{guess_format, Format};
