// Configuration loading

pub mod error;
pub mod keybindings;
pub mod settings;

pub use error::ConfigError;
pub use keybindings::{load_keybindings, normalize_key, Keybinding};
pub use settings::Settings;

use std::path::PathBuf;

/// Directory holding every gridstate config file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridstate")
}

/// Drop `//` comment lines so hand-edited files still parse as JSON.
pub(crate) fn strip_comments(contents: &str) -> String {
    contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
