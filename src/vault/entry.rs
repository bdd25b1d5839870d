//! Credential entries.
//!
//! An `Entry` is an immutable map of field name to [`Value`].  The `with_*`
//! builders consume the entry and return a new one; there is no in-place
//! setter.

use std::collections::BTreeMap;

use super::value::{Secret, Value};

pub const ID_FIELD: &str = "id";
pub const GROUP_FIELD: &str = "group";
pub const NAME_FIELD: &str = "name";
pub const USERNAME_FIELD: &str = "username";
pub const NOTE_FIELD: &str = "note";
pub const PASSWORD_FIELD: &str = "password";
pub const URL_FIELD: &str = "url";

/// One credential record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    fields: BTreeMap<String, Value>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Return a copy of this entry with `name` set to `value`.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with(ID_FIELD, Value::text(id))
    }

    pub fn with_group(self, group: &str) -> Self {
        self.with(GROUP_FIELD, Value::text(group))
    }

    pub fn with_name(self, name: &str) -> Self {
        self.with(NAME_FIELD, Value::text(name))
    }

    pub fn with_username(self, username: &str) -> Self {
        self.with(USERNAME_FIELD, Value::text(username))
    }

    pub fn with_url(self, url: &str) -> Self {
        self.with(URL_FIELD, Value::text(url))
    }

    pub fn with_note(self, note: Secret) -> Self {
        self.with(NOTE_FIELD, Value::Secret(note))
    }

    pub fn with_password(self, password: Secret) -> Self {
        self.with(PASSWORD_FIELD, Value::Secret(password))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All fields, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The entry UUID, or `""` if absent.
    pub fn id(&self) -> String {
        self.get_as_string(ID_FIELD)
    }

    /// Group path; levels are separated by `/`.
    pub fn group(&self) -> String {
        self.get_as_string(GROUP_FIELD)
    }

    pub fn name(&self) -> String {
        self.get_as_string(NAME_FIELD)
    }

    pub fn username(&self) -> String {
        self.get_as_string(USERNAME_FIELD)
    }

    pub fn url(&self) -> String {
        self.get_as_string(URL_FIELD)
    }

    pub fn note(&self) -> Secret {
        self.get_as_secret(NOTE_FIELD)
    }

    pub fn password(&self) -> Secret {
        self.get_as_secret(PASSWORD_FIELD)
    }

    /// A copy of this entry with every secret-typed value removed.
    pub fn without_secrets(&self) -> Entry {
        Entry {
            fields: self
                .fields
                .iter()
                .filter(|(_, v)| !v.is_secret())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn get_as_string(&self, name: &str) -> String {
        self.get(name).map(Value::as_string).unwrap_or_default()
    }

    fn get_as_secret(&self, name: &str) -> Secret {
        self.get(name)
            .map(|v| Secret::new(v.as_string()))
            .unwrap_or_default()
    }
}
