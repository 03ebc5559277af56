// Settings management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{config_dir, strip_comments, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid
    #[serde(rename = "grid.defaultRows")]
    pub default_rows: usize,

    #[serde(rename = "grid.defaultColumns")]
    pub default_columns: usize,

    // Clipboard
    /// Treat `\r\n` and `\n` clipboard text as the same when checking
    /// whether a paste came from this grid.
    #[serde(rename = "clipboard.normalizeLineEndings")]
    pub normalize_line_endings: bool,

    // Keyboard
    #[serde(rename = "keyboard.enableOverrides")]
    pub enable_overrides: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_rows: 100,
            default_columns: 26,
            normalize_line_endings: true,
            enable_overrides: true,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{}; using default settings", e);
            Self::default()
        })
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&strip_comments(&contents)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, json).map_err(io_err)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Size of a new grid
    "grid.defaultRows": 100,
    "grid.defaultColumns": 26,

    // Ignore \r\n vs \n when matching pasted text against the last copy
    "clipboard.normalizeLineEndings": true,

    // Apply keybindings.json on top of the built-in keymap
    "keyboard.enableOverrides": true
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_with_comments_and_partial_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // rows only\n  \"grid.defaultRows\": 5\n}\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.default_rows, 5);
        assert_eq!(settings.default_columns, 26);
        assert!(settings.normalize_line_endings);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            default_rows: 3,
            enable_overrides: false,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(Settings::load_from(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(Settings::load_from(&bad), Err(ConfigError::Parse { .. })));
    }
}
