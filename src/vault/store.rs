//! Read-only vault handle.
//!
//! `Vault` is produced by a successful open and holds only decoded data:
//! the header and the entries keyed by id.  Every key and the decrypted
//! stream are gone by the time it is returned.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::entry::Entry;
use super::query::Condition;
use crate::config::Settings;
use crate::credential::{ChallengeResponse, CredentialSource, Identity};
use crate::errors::{FieldErrors, NotpassError, Result};
use crate::psafe::{guess_format, open_v3, Format, Header, Stage};

/// An opened PasswordSafe database.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Decoded header fields.
    header: Header,

    /// Entries keyed by id.  Entries without an id share the key `""`.
    entries: HashMap<String, Entry>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault at `path` with a plain password.
    ///
    /// Field decode failures do not fail the open; they are returned next
    /// to the vault.
    pub fn open(path: &Path, password: &str) -> Result<(Self, FieldErrors)> {
        Self::open_with(path, password, &mut Identity)
    }

    /// Open the vault at `path`, passing the password through `source`
    /// first.
    pub fn open_with(
        path: &Path,
        password: &str,
        source: &mut dyn CredentialSource,
    ) -> Result<(Self, FieldErrors)> {
        let data = Zeroizing::new(std::fs::read(path)?);
        debug!(path = %path.display(), len = data.len(), "vault file read");

        let effective = Zeroizing::new(source.effective_password(password)?);
        Self::from_effective_password(&data, &effective)
    }

    /// Open the vault named by `<project_dir>/.notpass.toml`.
    ///
    /// The settings pick the file and whether `token` derives the password.
    pub fn open_configured<T>(
        project_dir: &Path,
        password: &str,
        token: Option<T>,
    ) -> Result<(Self, FieldErrors)>
    where
        T: ChallengeResponse + 'static,
    {
        let settings = Settings::load(project_dir)?;
        let path = settings.vault_path(project_dir).ok_or_else(|| {
            NotpassError::ConfigError(format!("no vault set in {}", Settings::FILE_NAME))
        })?;
        debug!(path = %path.display(), use_token = settings.use_token, "settings loaded");

        let mut source = settings.credential_source(token)?;
        Self::open_with(&path, password, source.as_mut())
    }

    /// Open a vault already held in memory.
    pub fn from_bytes(data: &[u8], password: &str) -> Result<(Self, FieldErrors)> {
        Self::from_effective_password(data, password)
    }

    fn from_effective_password(data: &[u8], password: &str) -> Result<(Self, FieldErrors)> {
        let format = guess_format(data, password)?;
        debug!(stage = %Stage::Sniffing, %format, "format detected");
        if format != Format::V3 {
            return Err(NotpassError::UnsupportedFormat(format));
        }

        let decoded = open_v3(data, password.as_bytes())?;

        let mut entries = HashMap::with_capacity(decoded.entries.len());
        for entry in decoded.entries {
            entries.insert(entry.id(), entry);
        }
        debug!(entries = entries.len(), "vault ready");

        Ok((
            Self {
                header: decoded.header,
                entries,
            },
            decoded.field_errors,
        ))
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// The entry with `id`, secrets included.
    ///
    /// Returns `None` if no entry has that id.
    pub fn get(&self, id: &str) -> Option<Entry> {
        self.entries.get(id).cloned()
    }

    /// Every entry with its secret fields stripped, sorted by group, name
    /// and id.
    pub fn list(&self) -> Vec<Entry> {
        self.sorted_without_secrets(|_| true)
    }

    /// Entries matching `condition`, in the same order as
    /// [`list`](Self::list).
    ///
    /// The condition only sees the stripped entry, so secret fields compare
    /// as missing.
    pub fn find(&self, condition: &Condition) -> Vec<Entry> {
        self.sorted_without_secrets(|e| condition(e))
    }

    fn sorted_without_secrets(&self, keep: impl Fn(&Entry) -> bool) -> Vec<Entry> {
        let mut list: Vec<Entry> = self
            .entries
            .values()
            .map(Entry::without_secrets)
            .filter(|e| keep(e))
            .collect();

        list.sort_by_cached_key(|e| (e.group(), e.name(), e.id()));
        list
    }

    /// Release the vault.  There is no backing resource, so this always
    /// succeeds.
    pub fn close(self) -> Result<()> {
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The database UUID from the header.
    pub fn uuid(&self) -> Uuid {
        self.header.uuid
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn description(&self) -> &str {
        &self.header.description
    }

    /// Number of distinct entry ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if an entry has the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::query::{any, field, none};
    use crate::vault::{Secret, Value, NAME_FIELD, PASSWORD_FIELD};

    fn vault(entries: Vec<Entry>) -> Vault {
        Vault {
            header: Header::default(),
            entries: entries.into_iter().map(|e| (e.id(), e)).collect(),
        }
    }

    fn sample() -> Vault {
        vault(vec![
            Entry::new()
                .with_id("3")
                .with_group("b")
                .with_name("z")
                .with_password(Secret::new("p3")),
            Entry::new()
                .with_id("1")
                .with_group("a")
                .with_name("y")
                .with_password(Secret::new("p1")),
            Entry::new()
                .with_id("2")
                .with_group("a")
                .with_name("x")
                .with("pin", Value::secret("0000")),
        ])
    }

    fn ids(entries: &[Entry]) -> Vec<String> {
        entries.iter().map(Entry::id).collect()
    }

    #[test]
    fn get_returns_secrets() {
        let v = sample();
        let e = v.get("1").unwrap();
        assert_eq!(e.password().expose(), "p1");
        assert!(v.get("missing").is_none());
    }

    #[test]
    fn list_is_sorted_and_stripped() {
        let v = sample();
        let list = v.list();
        assert_eq!(ids(&list), vec!["2", "1", "3"]);
        assert!(list.iter().all(|e| e.fields().all(|(_, v)| !v.is_secret())));
    }

    #[test]
    fn find_any_equals_list() {
        let v = sample();
        assert_eq!(v.find(&any()), v.list());
        assert!(v.find(&none()).is_empty());
    }

    #[test]
    fn find_never_matches_on_secret_fields() {
        let v = sample();
        assert!(v.find(&field("pin").equals("0000")).is_empty());
        assert!(v.find(&field(PASSWORD_FIELD).contains("p")).is_empty());
        assert!(v
            .find(&field(PASSWORD_FIELD).matches_wildcard("p*").unwrap())
            .is_empty());

        // A stripped secret compares as the empty string.
        let found = v.find(&field("pin").equals(""));
        assert_eq!(ids(&found), vec!["2", "1", "3"]);
    }

    #[test]
    fn find_by_name() {
        let v = sample();
        let found = v.find(&field(NAME_FIELD).matches_wildcard("?").unwrap());
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn entries_without_id_collapse() {
        let v = vault(vec![Entry::new().with_name("a"), Entry::new().with_name("b")]);
        assert_eq!(v.len(), 1);
        assert_eq!(v.get("").unwrap().name(), "b");
    }

    #[test]
    fn vault_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Vault>();
    }

    #[test]
    fn close_succeeds() {
        assert!(sample().close().is_ok());
    }
}
