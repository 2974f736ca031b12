//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/noterepo/config.toml` by default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the noterepo client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// OneNote settings.
    pub onenote: Option<OneNoteSettings>,

    /// Debug mode.
    pub debug: bool,
}

/// OneNote account settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OneNoteSettings {
    /// OAuth client ID of the registered application.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Directory where session tokens are stored.
    ///
    /// Defaults to `~/.local/share/noterepo/tokens`.
    pub token_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("noterepo")
            .join("config.toml")
    }

    /// Returns the default token storage directory.
    pub fn default_token_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("noterepo")
            .join("tokens")
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        Self::load_from(Self::default_path())
    }

    /// Loads configuration from the given path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

        toml::from_str(&content).map_err(|e| format!("failed to parse {}: {}", path.display(), e))
    }

    /// Returns the configured token directory, or the default.
    pub fn token_dir(&self) -> PathBuf {
        self.onenote
            .as_ref()
            .and_then(|o| o.token_dir.clone())
            .unwrap_or_else(Self::default_token_dir)
    }
}
