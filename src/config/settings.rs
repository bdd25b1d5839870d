use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credential::{ChallengeResponse, CredentialSource, Identity, TokenCredential};
use crate::errors::{NotpassError, Result};

/// Project-level configuration, loaded from `.notpass.toml`.
///
/// Every field has a default so no config file is needed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file to open when none is given, relative to the project
    /// directory.
    #[serde(default)]
    pub vault: Option<String>,

    /// Derive the vault password through a challenge-response token.
    #[serde(default)]
    pub use_token: bool,

    /// Token slot holding the HMAC-SHA1 secret (default: 2).
    #[serde(default = "default_token_slot")]
    pub token_slot: u8,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_token_slot() -> u8 {
    2
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault: None,
            use_token: false,
            token_slot: default_token_slot(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".notpass.toml";

    /// Load settings from `<project_dir>/.notpass.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            NotpassError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path of the configured vault, if one is configured.
    ///
    /// Absolute paths are kept as they are.
    pub fn vault_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.vault.as_ref().map(|v| project_dir.join(v))
    }

    /// Bind `token` to the configured slot.
    pub fn token_credential<T: ChallengeResponse>(&self, token: T) -> TokenCredential<T> {
        TokenCredential::new(token, self.token_slot)
    }

    /// The credential source these settings ask for.
    ///
    /// With `use_token` off the password is used as typed and any token is
    /// ignored.  With it on, a token must be supplied.
    pub fn credential_source<T>(&self, token: Option<T>) -> Result<Box<dyn CredentialSource>>
    where
        T: ChallengeResponse + 'static,
    {
        if !self.use_token {
            return Ok(Box::new(Identity));
        }
        match token {
            Some(token) => Ok(Box::new(self.token_credential(token))),
            None => Err(NotpassError::ConfigError(format!(
                "{} sets use_token but no challenge-response token was supplied",
                Self::FILE_NAME
            ))),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
