pub mod config;
pub mod credential;
pub mod crypto;
pub mod errors;
pub mod psafe;
pub mod vault;

pub use errors::{FieldDecodeError, FieldErrors, NotpassError, Result};
pub use psafe::Format;
pub use vault::{Condition, Entry, Secret, Value, Vault};
