//! Configuration module for CookItUp.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for storage, the
//! recipe-generation client and cooking mode, `AppPaths` for cross-platform
//! directories, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, CookingConfig, FetchConfig, StorageConfig};
