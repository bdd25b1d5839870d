use thiserror::Error;

use crate::psafe::Format;

/// All fatal errors that can occur while opening or querying a vault.
#[derive(Debug, Error)]
pub enum NotpassError {
    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Format errors ---
    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Unsupported PasswordSafe format: {0} (only V3 databases are supported)")]
    UnsupportedFormat(Format),

    // --- Crypto errors ---
    /// The key-check hash did not match. A wrong password and a foreign or
    /// corrupted file are indistinguishable here.
    #[error("Authentication failed: wrong password or corrupted file")]
    AuthenticationFailed,

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    // --- Record stream errors ---
    #[error("Malformed record stream: {0}")]
    Parse(String),

    #[error("HMAC verification failed: vault data is corrupted or tampered")]
    HmacMismatch,

    // --- Query errors ---
    #[error("Invalid wildcard pattern '{0}'")]
    InvalidPattern(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- Credential errors ---
    #[error("Challenge-response token error: {0}")]
    TokenError(String),
}

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, NotpassError>;

/// A single field that could not be decoded.
///
/// These are never fatal: the record keeps every sibling field that did
/// decode, and the failures are handed back next to the opened vault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record} field '{field}': {reason}")]
pub struct FieldDecodeError {
    /// `"header"` or `"entry <n>"` (zero-based).
    pub record: String,
    /// Canonical field name (or `0x..` for an unnamed tag).
    pub field: String,
    pub reason: String,
}

/// Every field decode failure from one open, in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed to decode{}", .0.len(), joined(.0))]
pub struct FieldErrors(Vec<FieldDecodeError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: FieldDecodeError) {
        self.0.push(err);
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDecodeError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing failed, otherwise the aggregate as an error.
    pub fn into_result(self) -> std::result::Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn joined(errors: &[FieldDecodeError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let list: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!(": {}", list.join("; "))
}

impl IntoIterator for FieldErrors {
    type Item = FieldDecodeError;
    type IntoIter = std::vec::IntoIter<FieldDecodeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
