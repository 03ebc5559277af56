// Keybinding configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{config_dir, strip_comments, ConfigError};

/// One user override from keybindings.json.
///
/// A command prefixed with `-` removes the binding for `key` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keybinding {
    pub key: String,
    pub command: String,
    /// `"editing"` scopes the binding to edit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
}

impl Keybinding {
    pub fn new(key: &str, command: &str) -> Self {
        Self {
            key: key.into(),
            command: command.into(),
            when: None,
        }
    }

    pub fn when(mut self, context: &str) -> Self {
        self.when = Some(context.into());
        self
    }
}

pub fn keybindings_path() -> PathBuf {
    config_dir().join("keybindings.json")
}

/// Normalize key string to canonical form: "meta+shift+alt+key"
///
/// `ctrl`, `cmd` and `super` all map to `meta`.
pub fn normalize_key(key: &str) -> String {
    let key = key.to_lowercase();

    let mut has_meta = false;
    let mut has_shift = false;
    let mut has_alt = false;
    let mut main_key = "";

    for part in key.split('+') {
        let part = part.trim();
        match part {
            "meta" | "cmd" | "command" | "super" | "ctrl" | "control" => has_meta = true,
            "shift" => has_shift = true,
            "alt" | "option" => has_alt = true,
            _ => main_key = part,
        }
    }

    let mut result = String::new();
    if has_meta { result.push_str("meta+"); }
    if has_shift { result.push_str("shift+"); }
    if has_alt { result.push_str("alt+"); }
    result.push_str(main_key);
    result
}

/// Read overrides from `path`. Keys come back normalized.
pub fn load_keybindings(path: &Path) -> Result<Vec<Keybinding>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bindings: Vec<Keybinding> =
        serde_json::from_str(&strip_comments(&contents)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(bindings
        .into_iter()
        .map(|binding| Keybinding {
            key: normalize_key(&binding.key),
            ..binding
        })
        .collect())
}

/// The user's overrides, or none when the file is missing or unreadable.
pub fn load_user_keybindings() -> Vec<Keybinding> {
    let path = keybindings_path();
    if !path.exists() {
        return Vec::new();
    }
    load_keybindings(&path).unwrap_or_else(|e| {
        log::warn!("{}; ignoring keybinding overrides", e);
        Vec::new()
    })
}
