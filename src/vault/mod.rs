//! Vault module: the in-memory view of an opened database.
//!
//! This module provides:
//! - `Value` and `Secret` field values with redaction (`value`)
//! - `Entry`, an immutable field map (`entry`)
//! - Composable `Condition` predicates (`query`)
//! - The read-only `Vault` handle (`store`)

pub mod entry;
pub mod query;
pub mod store;
pub mod value;

// Re-export the most commonly used items.
pub use entry::{
    Entry, GROUP_FIELD, ID_FIELD, NAME_FIELD, NOTE_FIELD, PASSWORD_FIELD, URL_FIELD,
    USERNAME_FIELD,
};
pub use query::Condition;
pub use store::Vault;
pub use value::{Secret, Value, REDACTED, TIME_FORMAT};
