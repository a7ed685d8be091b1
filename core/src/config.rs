//! Configuration loading with transparent decryption.
//!
//! A configuration file is YAML, optionally wrapped in an encrypted
//! envelope (see [`crate::envelope`]). The envelope marker at the start of
//! the file is the only format signal; there is no "encrypted" field.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::domain::KnockConfig;
use crate::envelope::{self, EnvelopeKey};
use crate::error::{Error, Result};

/// Environment variable consulted when no key file is given.
pub const KEY_ENV_VAR: &str = "PORT_KNOCKER_KEY";

/// Where the raw secret for an encrypted configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Raw bytes of a key file, any length.
    File(PathBuf),
    /// Value of an environment variable. Empty counts as unset.
    Env(String),
}

impl Default for KeySource {
    fn default() -> Self {
        KeySource::Env(KEY_ENV_VAR.to_string())
    }
}

impl KeySource {
    /// Key file if given, otherwise [`KEY_ENV_VAR`].
    pub fn from_key_file(key_file: Option<PathBuf>) -> Self {
        key_file.map(KeySource::File).unwrap_or_default()
    }

    /// Read the raw secret.
    pub async fn read_secret(&self) -> Result<Vec<u8>> {
        match self {
            KeySource::File(path) => fs::read(path).await.map_err(|source| Error::ReadFile {
                path: path.clone(),
                source,
            }),
            KeySource::Env(var) => std::env::var_os(var)
                .filter(|value| !value.is_empty())
                .map(os_bytes)
                .ok_or_else(|| Error::KeyNotFound { var: var.clone() }),
        }
    }

    /// Read the secret and hash it into an envelope key.
    pub async fn derive_key(&self) -> Result<EnvelopeKey> {
        let secret = self.read_secret().await?;
        Ok(envelope::derive_key(&secret))
    }
}

/// Raw bytes of an environment value, hashed as-is.
#[cfg(unix)]
fn os_bytes(value: std::ffi::OsString) -> Vec<u8> {
    use std::os::unix::ffi::OsStringExt;
    value.into_vec()
}

#[cfg(not(unix))]
fn os_bytes(value: std::ffi::OsString) -> Vec<u8> {
    value.to_string_lossy().into_owned().into_bytes()
}

/// Decode plaintext YAML into a validated configuration.
pub fn parse_config(text: &[u8]) -> Result<KnockConfig> {
    let config: KnockConfig =
        serde_yaml::from_slice(text).map_err(|e| Error::Parse(e.to_string()))?;
    config.validate()
}

/// Loads knock configuration files from disk.
pub struct ConfigLoader {
    /// Path to the configuration file.
    config_path: PathBuf,
    /// Key material used only when the file is encrypted.
    key_source: KeySource,
}

impl ConfigLoader {
    pub fn new(config_path: impl Into<PathBuf>, key_source: KeySource) -> Self {
        Self {
            config_path: config_path.into(),
            key_source,
        }
    }

    /// Read, decrypt if needed, and parse the configuration.
    ///
    /// The key source is only consulted for encrypted files, so a missing
    /// key never breaks a plaintext configuration.
    pub async fn load(&self) -> Result<KnockConfig> {
        let raw = fs::read(&self.config_path)
            .await
            .map_err(|source| Error::ReadFile {
                path: self.config_path.clone(),
                source,
            })?;

        let text = if envelope::is_envelope(&raw) {
            info!(path = %self.config_path.display(), "Encrypted configuration detected");
            let key = self.key_source.derive_key().await?;
            envelope::open(&raw, &key)?
        } else {
            raw
        };

        let config = parse_config(&text)?;
        debug!(targets = config.len(), "Configuration loaded");
        Ok(config)
    }
}

/// Load a configuration file with the given key source.
pub async fn load(config_path: impl AsRef<Path>, key_source: KeySource) -> Result<KnockConfig> {
    ConfigLoader::new(config_path.as_ref(), key_source).load().await
}
