//! Persisted application settings
//!
//! Settings live in one JSON file in the platform data directory. A version
//! field guards the layout: a file written by an incompatible version is
//! replaced with defaults rather than migrated.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Bumped whenever the settings layout changes incompatibly.
pub const SETTINGS_VERSION: u32 = 1;

const SETTINGS_FILE: &str = "settings.json";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("No data directory available on this platform")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-light visibility choice, matched to lights by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightSetting {
    pub name: String,
    pub active: bool,
}

/// Everything the app remembers between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub version: u32,
    /// Address of the bridge to talk to, once known.
    pub bridge_ip: Option<String>,
    /// When set, discovery runs on every start even with a stored address.
    pub auto_discover: bool,
    /// API username issued by the bridge.
    pub username: Option<String>,
    /// Per-light visibility; `None` until first populated from a full state.
    pub lights: Option<Vec<LightSetting>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            bridge_ip: None,
            auto_discover: true,
            username: None,
            lights: None,
        }
    }
}

/// Settings storage manager
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Open the store at the platform default location.
    pub fn open_default() -> Result<Self, SettingsError> {
        let dir = dirs::data_dir().ok_or(SettingsError::NoDataDir)?;
        Self::open(dir.join("huewheel").join(SETTINGS_FILE))
    }

    /// Open the store at an explicit path, loading the file if present.
    ///
    /// A missing file, unparseable content or a version mismatch all yield
    /// defaults; the file itself is only rewritten on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = Self::load(&path);
        Ok(Self { path, settings })
    }

    fn load(path: &Path) -> Settings {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str::<Settings>(&content) {
            Ok(settings) if settings.version == SETTINGS_VERSION => settings,
            Ok(settings) => {
                warn!(
                    found = settings.version,
                    expected = SETTINGS_VERSION,
                    "settings version mismatch, resetting to defaults"
                );
                Settings::default()
            }
            Err(error) => {
                warn!(%error, "settings file unreadable, resetting to defaults");
                Settings::default()
            }
        }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Apply an edit and persist it.
    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) -> Result<(), SettingsError> {
        f(&mut self.settings);
        self.save()
    }

    /// Write the current settings to disk.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.settings)?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        assert_eq!(*store.get(), Settings::default());
        assert!(store.get().auto_discover);
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        {
            let mut store = SettingsStore::open(&path).unwrap();
            store
                .update(|s| {
                    s.bridge_ip = Some("192.168.1.42".to_string());
                    s.username = Some("abcdef".to_string());
                    s.auto_discover = false;
                    s.lights = Some(vec![LightSetting {
                        name: "Kitchen".to_string(),
                        active: false,
                    }]);
                })
                .unwrap();
        }

        // Reload from disk
        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.path(), path);
        let settings = store.get();
        assert_eq!(settings.bridge_ip.as_deref(), Some("192.168.1.42"));
        assert_eq!(settings.username.as_deref(), Some("abcdef"));
        assert!(!settings.auto_discover);
        let lights = settings.lights.as_ref().unwrap();
        assert_eq!(lights.len(), 1);
        assert!(!lights[0].active);
    }

    #[test]
    fn test_version_mismatch_resets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"version": 99, "bridge_ip": "10.0.0.1", "auto_discover": false, "username": "u", "lights": null}"#,
        )
        .unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(*store.get(), Settings::default());
    }

    #[test]
    fn test_corrupt_file_resets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(*store.get(), Settings::default());
    }
}
