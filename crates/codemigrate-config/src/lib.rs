//! Configuration management system for codemigrate
//!
//! This crate loads the settings that shape a migration run: how renames treat
//! existing targets, which paths patterns never see, and how the run is logged.
//!
//! # Features
//!
//! - **Multiple formats**: YAML, TOML and JSON configuration files
//! - **Validation**: log levels and ignore globs are checked at load time
//! - **Environment overrides**: `CODEMIGRATE__MIGRATION__RENAME_COLLISION=fail`
//! - **Defaults**: every option has a sensible default
//!
//! # Examples
//!
//! ```rust
//! use codemigrate_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("codemigrate.yaml")
//!     .add_env_prefix("CODEMIGRATE")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Rename collisions: {:?}", config.migration.rename_collision);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use codemigrate_types::CollisionPolicy;
use serde::{Deserialize, Serialize};

pub mod builder;
pub mod error;
pub mod loader;
pub mod logging;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use logging::init_logging;

/// Main configuration structure for codemigrate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Migration behaviour
    #[serde(default)]
    pub migration: MigrationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings applied to every task of a migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// What a rename does when the target already exists
    #[serde(default)]
    pub rename_collision: CollisionPolicy,
    /// Globs that patterns never match, relative to the working directory
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// Follow symbolic links while walking the working tree
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            rename_collision: CollisionPolicy::default(),
            ignore: default_ignore(),
            follow_symlinks: false,
        }
    }
}

fn default_ignore() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/.git/**".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_level")]
    pub level: String,
    /// Enable JSON formatting
    #[serde(default)]
    pub json_format: bool,
    /// Enable colored output
    #[serde(default = "default_colored_output")]
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_format: false,
            colored_output: true,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_colored_output() -> bool {
    true
}
