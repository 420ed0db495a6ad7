//! Persisted user preferences.
//!
//! A small JSON record the presentation layer loads at startup and saves at
//! shutdown. It is handed around explicitly; there is no ambient global.
//! Missing or corrupt data falls back to defaults rather than failing
//! startup, and saving is independent of whether the last operation
//! succeeded.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default file name, next to the working directory the tool runs in.
pub const DEFAULT_PREFS_FILE: &str = "user_data.json";

/// User preferences as persisted between runs.
///
/// Row and column selections are kept as the raw comma-separated strings the
/// user typed; they are resolved (and validated) per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub file_path: String,
    pub password: String,
    pub row_nums: String,
    pub col_letters: String,
    pub show_password: bool,
    pub protect_formulas: bool,
    /// Last window size (width, height) of a GUI consumer, if any.
    pub window_size: Option<(u32, u32)>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            password: String::new(),
            row_nums: String::new(),
            col_letters: String::new(),
            show_password: false,
            protect_formulas: true,
            window_size: None,
        }
    }
}

impl Preferences {
    /// Load preferences from `path`, falling back to defaults if the file is
    /// missing or does not parse.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let Ok(data) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&data).unwrap_or_default()
    }

    /// Save preferences to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::from)?;
        std::fs::write(path, json)
    }
}
