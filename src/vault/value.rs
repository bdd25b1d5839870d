//! Field values stored in an [`Entry`](super::Entry).
//!
//! A value is a closed set of variants.  Secrets are their own type whose
//! `Debug` and `Display` output is always the redaction marker, so a secret
//! cannot leak through logging or `{:?}` formatting by accident.  Reading the
//! payload requires calling [`Secret::expose`] or [`Value::as_string`].

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use zeroize::Zeroize;

/// What every secret renders as under `Debug` and `Display`.
pub const REDACTED: &str = "**********";

/// Format used when a timestamp is rendered as a string (UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A sensitive string (password, note).  Zeroized on drop.
#[derive(Clone, Default, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw secret.  This is the only way to read it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Plain text, including hex-encoded raw fields.
    Text(String),
    /// Sensitive text; stripped from bulk results.
    Secret(Secret),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn secret(value: impl Into<String>) -> Self {
        Value::Secret(Secret::new(value))
    }

    /// The value as a string.  For secrets this is the raw payload.
    pub fn as_string(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Secret(s) => s.expose().to_string(),
            Value::Timestamp(t) => t.format(TIME_FORMAT).to_string(),
            Value::Uuid(u) => u.hyphenated().to_string(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Value::Secret(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Secret(s) => fmt::Display::fmt(s, f),
            other => f.write_str(&other.as_string()),
        }
    }
}

impl From<Secret> for Value {
    fn from(value: Secret) -> Self {
        Value::Secret(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_formatting_is_redacted() {
        let s = Secret::new("hunter2");
        assert_eq!(format!("{s}"), REDACTED);
        assert_eq!(format!("{s:?}"), REDACTED);
        assert_eq!(s.expose(), "hunter2");
    }

    #[test]
    fn secret_value_is_redacted_in_debug_and_display() {
        let v = Value::secret("squeamish ossifrage");
        assert_eq!(v.to_string(), REDACTED);
        assert!(!format!("{v:?}").contains("ossifrage"));
        assert_eq!(v.as_string(), "squeamish ossifrage");
    }

    #[test]
    fn timestamp_renders_utc() {
        let t = DateTime::from_timestamp(1_680_463_896, 0).unwrap();
        assert_eq!(Value::Timestamp(t).as_string(), "2023-04-02 19:31:36");
    }

    #[test]
    fn uuid_renders_lowercase_hyphenated() {
        let u = Uuid::parse_str("A662B655-2B16-4E37-B5A7-789CAA7828D0").unwrap();
        assert_eq!(
            Value::Uuid(u).to_string(),
            "a662b655-2b16-4e37-b5a7-789caa7828d0"
        );
    }
}
