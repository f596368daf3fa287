//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\cookitup\
//!   macOS:   ~/Library/Application Support/cookitup/
//!   Linux:   ~/.config/cookitup/
//!
//! Data dir (recipe database):
//!   Windows: %LOCALAPPDATA%\cookitup\
//!   macOS:   ~/Library/Application Support/cookitup/
//!   Linux:   ~/.local/share/cookitup/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory holding the SQLite recipe database.
    pub data_dir: PathBuf,
    /// Full path to `recipes.db`.
    pub database_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "cookitup";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let database_file = data_dir.join("recipes.db");

        Self {
            config_dir,
            settings_file,
            data_dir,
            database_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
