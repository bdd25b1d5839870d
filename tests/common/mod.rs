//! Test-only writer for V3 files, so fixtures have known keys and contents.

#![allow(dead_code)]

use std::path::PathBuf;

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use twofish::cipher::generic_array::GenericArray;
use twofish::cipher::{BlockEncrypt, KeyInit};
use twofish::Twofish;

use notpass::crypto::stretch_key;

pub const PASSWORD: &str = "hunter2";

pub const DB_UUID: &str = "a662b655-2b16-4e37-b5a7-789caa7828d0";
pub const DB_NAME: &str = "Test database";
pub const DB_DESCRIPTION: &str = "For testing purposes only!";

pub const ENTRY_ID: &str = "bcdc6634-9e1a-4657-8cbf-36a4bc1a09cd";
pub const ENTRY_GROUP: &str = "Finance";
pub const ENTRY_NAME: &str = "Imperial Crypto Exchange";
pub const ENTRY_USERNAME: &str = "lskywalker";
pub const ENTRY_PASSWORD: &str = "FBuvy7MVN=-k3n@qjs>WQEeL9";
pub const ENTRY_URL: &str = "https://palpatine-coin.example.com/";
pub const ENTRY_NOTE: &str = "This is a note.";

pub type Fields = Vec<(u8, Vec<u8>)>;

/// Builds a complete `.psafe3` image.
#[derive(Clone)]
pub struct VaultBuilder {
    pub password: String,
    pub salt: [u8; 32],
    pub iterations: u32,
    pub enc_key: [u8; 32],
    pub hmac_key: [u8; 32],
    pub iv: [u8; 16],
    pub header: Fields,
    pub entries: Vec<Fields>,
}

impl Default for VaultBuilder {
    fn default() -> Self {
        Self {
            password: PASSWORD.to_string(),
            salt: [0x5a; 32],
            iterations: 2048,
            enc_key: [0x11; 32],
            hmac_key: [0x22; 32],
            iv: [0x33; 16],
            header: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl VaultBuilder {
    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub fn header_field(mut self, tag: u8, data: &[u8]) -> Self {
        self.header.push((tag, data.to_vec()));
        self
    }

    pub fn entry(mut self, fields: Fields) -> Self {
        self.entries.push(fields);
        self
    }

    /// The plaintext record stream.
    pub fn stream(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for record in std::iter::once(&self.header).chain(&self.entries) {
            for (tag, data) in record {
                push_field(&mut out, *tag, data);
            }
            push_field(&mut out, 0xff, &[]);
        }
        out
    }

    /// HMAC-SHA256 over every payload in the stream.
    pub fn stream_hmac(&self) -> [u8; 32] {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&self.hmac_key).unwrap();
        for record in std::iter::once(&self.header).chain(&self.entries) {
            for (_, data) in record {
                mac.update(data);
            }
            mac.update(&[]);
        }
        mac.finalize().into_bytes().into()
    }

    pub fn build(&self) -> Vec<u8> {
        let stretched = stretch_key(self.password.as_bytes(), &self.salt, self.iterations);
        let key_check: [u8; 32] = Sha256::digest(stretched).into();

        let mut out = Vec::new();
        out.extend_from_slice(b"PWS3");
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iterations.to_le_bytes());
        out.extend_from_slice(&key_check);
        out.extend_from_slice(&encrypt_ecb(&stretched, &self.enc_key));
        out.extend_from_slice(&encrypt_ecb(&stretched, &self.hmac_key));
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&encrypt_cbc(&self.enc_key, &self.iv, &self.stream()));
        out.extend_from_slice(b"PWS3-EOFPWS3-EOF");
        out.extend_from_slice(&self.stream_hmac());
        out
    }

    /// Write the image to a fresh temp dir.
    pub fn write(&self) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("test.psafe3");
        std::fs::write(&path, self.build()).expect("write vault");
        (dir, path)
    }
}

/// A vault with the standard header and one fully populated entry.
pub fn sample_vault() -> VaultBuilder {
    let db_uuid = uuid::Uuid::parse_str(DB_UUID).unwrap();
    VaultBuilder::default()
        .header_field(0x00, &[0x0d, 0x03])
        .header_field(0x01, db_uuid.as_bytes())
        .header_field(0x04, &1_680_463_896u32.to_le_bytes())
        .header_field(0x09, DB_NAME.as_bytes())
        .header_field(0x0a, DB_DESCRIPTION.as_bytes())
        .entry(sample_entry())
}

pub fn sample_entry() -> Fields {
    let id = uuid::Uuid::parse_str(ENTRY_ID).unwrap();
    vec![
        (0x01, id.as_bytes().to_vec()),
        (0x02, ENTRY_GROUP.as_bytes().to_vec()),
        (0x03, ENTRY_NAME.as_bytes().to_vec()),
        (0x04, ENTRY_USERNAME.as_bytes().to_vec()),
        (0x05, ENTRY_NOTE.as_bytes().to_vec()),
        (0x06, ENTRY_PASSWORD.as_bytes().to_vec()),
        (0x07, 1_680_463_896u32.to_le_bytes().to_vec()),
        (0x0d, ENTRY_URL.as_bytes().to_vec()),
    ]
}

/// A minimal entry with an id, group and name.
pub fn simple_entry(id: &str, group: &str, name: &str) -> Fields {
    let id = uuid::Uuid::parse_str(id).unwrap();
    vec![
        (0x01, id.as_bytes().to_vec()),
        (0x02, group.as_bytes().to_vec()),
        (0x03, name.as_bytes().to_vec()),
        (0x06, b"secret".to_vec()),
    ]
}

fn push_field(out: &mut Vec<u8>, tag: u8, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.push(tag);
    out.extend_from_slice(data);
    let padded = (out.len() + 15) / 16 * 16;
    out.resize(padded, 0);
}

fn encrypt_ecb(key: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Twofish::new_from_slice(key).unwrap();
    let mut out = plaintext.to_vec();
    for block in out.chunks_exact_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    out
}

fn encrypt_cbc(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let encryptor = cbc::Encryptor::<Twofish>::new_from_slices(key, iv).unwrap();
    let mut buf = plaintext.to_vec();
    let len = buf.len();
    encryptor
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .unwrap();
    buf
}
