//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Settings for the local SQLite recipe database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the database file.  `None` means the platform data directory
    /// (see [`AppPaths::database_file`]).
    pub database_path: Option<PathBuf>,
    /// Upper bound on pooled connections for file databases.
    pub max_connections: u32,
}

impl StorageConfig {
    /// SQLite connection URL for the configured database file.
    pub fn database_url(&self) -> String {
        let path = self
            .database_path
            .clone()
            .unwrap_or_else(|| AppPaths::new().database_file);
        format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            max_connections: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// FetchConfig
// ---------------------------------------------------------------------------

/// Settings for the recipe-generation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the `generateContent` API.
    pub base_url: String,
    /// Model identifier placed in the request path (e.g. `"gemini-1.5-flash"`).
    pub model: String,
    /// API key sent as the `key` query parameter.  Usually supplied at run
    /// time instead of being written to disk.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for a reply before timing out.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-1.5-flash".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// CookingConfig
// ---------------------------------------------------------------------------

/// Settings for cooking mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookingConfig {
    /// Wall-clock period of one countdown tick in milliseconds.
    pub tick_interval_ms: u64,
}

impl CookingConfig {
    /// The tick period as a [`Duration`], never shorter than 1 ms.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for CookingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use cookitup::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recipe database settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Recipe-generation API settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Cooking-mode settings.
    #[serde(default)]
    pub cooking: CookingConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
