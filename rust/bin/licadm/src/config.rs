//! Client-side configuration.
//!
//! Reads/writes `~/.licadm/config.toml`: the backend URL and the bearer
//! token saved by `licadm login`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use licadm_client::TokenStore;

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "https://license.example.com").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Bearer token (set by `licadm login`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl ClientConfig {
    /// Default config file path: ~/.licadm/config.toml.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".licadm").join("config.toml")
    }

    /// Load config from disk, or return default if the file is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to disk, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Credential persistence backed by the config file.
///
/// The session guard drives this. Failures are logged and swallowed so a
/// read-only config file cannot take the session down.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write_token(&self, token: &str) {
        let result = ClientConfig::load(&self.path).and_then(|mut config| {
            config.token = token.to_string();
            config.save(&self.path)
        });
        if let Err(e) = result {
            warn!("could not persist credential: {e}");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        ClientConfig::load(&self.path)
            .ok()
            .map(|c| c.token)
            .filter(|t| !t.is_empty())
    }

    fn save(&self, token: &str) {
        self.write_token(token);
    }

    fn clear(&self) {
        self.write_token("");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.server.is_empty());
        assert!(config.token.is_empty());
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ClientConfig {
            server: "http://localhost:8080".into(),
            token: "tok-1".into(),
        };
        config.save(&path).unwrap();

        let back = ClientConfig::load(&path).unwrap();
        assert_eq!(back.server, "http://localhost:8080");
        assert_eq!(back.token, "tok-1");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        ClientConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn token_store_saves_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        ClientConfig {
            server: "http://localhost:8080".into(),
            token: String::new(),
        }
        .save(&path)
        .unwrap();

        let store = FileTokenStore::new(path.clone());
        assert_eq!(store.load(), None);

        store.save("tok-9");
        assert_eq!(store.load().as_deref(), Some("tok-9"));
        // The server setting survives token writes.
        assert_eq!(
            ClientConfig::load(&path).unwrap().server,
            "http://localhost:8080"
        );

        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn token_store_on_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("config.toml"));
        assert_eq!(store.load(), None);
    }
}
