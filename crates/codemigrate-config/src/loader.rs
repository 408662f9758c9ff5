//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENV_PREFIX: &str = "CODEMIGRATE";

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from default locations
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();

        if let Some(path) = Self::config_exists() {
            info!("Using configuration file {}", path.display());
            builder = builder.add_source_file(path);
        } else {
            debug!("No configuration file found, using defaults");
        }

        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load configuration from the project directory a migration runs in.
    ///
    /// `codemigrate.{yaml,yml,toml}` inside `cwd` takes precedence over the
    /// user-level locations.
    pub fn load_for_project<P: AsRef<Path>>(cwd: P) -> ConfigResult<Config> {
        let cwd = cwd.as_ref();
        let mut builder = ConfigBuilder::new().add_defaults();

        if let Some(path) = Self::get_default_config_paths()
            .into_iter()
            .map(|path| if path.is_relative() { cwd.join(path) } else { path })
            .find(|path| path.exists())
        {
            info!("Using configuration file {}", path.display());
            builder = builder.add_source_file(path);
        }

        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Configuration file not found",
                ),
            });
        }

        ConfigBuilder::new()
            .add_defaults()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(config).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to TOML: {}", e),
                })?
            }
            Some("json") => {
                serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialization {
                    message: format!("Failed to serialize to JSON: {}", e),
                })?
            }
            _ => serde_yaml::to_string(config).map_err(|e| ConfigError::Serialization {
                message: format!("Failed to serialize to YAML: {}", e),
            })?,
        };

        std::fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("Saved configuration to {}", path.display());

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        Self::save_to_file(&Config::default(), path)
    }

    /// Get default configuration file paths in order of preference
    fn get_default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("codemigrate.yaml"),
            PathBuf::from("codemigrate.yml"),
            PathBuf::from("codemigrate.toml"),
            PathBuf::from(".codemigrate.yaml"),
            PathBuf::from(".codemigrate.yml"),
            PathBuf::from(".codemigrate.toml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("codemigrate");
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.yml"));
            paths.push(dir.join("config.toml"));
        }

        paths
    }

    /// Check if a configuration file exists in default locations
    pub fn config_exists() -> Option<PathBuf> {
        Self::get_default_config_paths()
            .into_iter()
            .find(|path| path.exists())
    }

    /// Validate a configuration file without keeping it
    pub fn validate_file<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        Self::load_from_file(path).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemigrate_types::CollisionPolicy;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("test.yaml")]
    #[case("test.toml")]
    #[case("test.json")]
    fn test_save_and_load(#[case] file_name: &str) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(file_name);

        let mut original = Config::default();
        original.migration.rename_collision = CollisionPolicy::Fail;
        ConfigLoader::save_to_file(&original, &config_path).unwrap();

        let loaded = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.migration.rename_collision, CollisionPolicy::Fail);
        assert_eq!(loaded.migration.ignore, original.migration.ignore);
    }

    #[test]
    fn test_generate_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("default.yaml");

        ConfigLoader::generate_default_config(&config_path).unwrap();
        assert!(config_path.exists());
        assert!(ConfigLoader::validate_file(&config_path).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigLoader::load_from_file("/no/such/codemigrate.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_for_project_reads_project_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("codemigrate.yaml"),
            "migration:\n  rename_collision: fail\n",
        )
        .unwrap();

        let config = ConfigLoader::load_for_project(temp_dir.path()).unwrap();
        assert_eq!(config.migration.rename_collision, CollisionPolicy::Fail);
    }

    #[test]
    fn test_user_config_dir_is_searched_last() {
        let paths = ConfigLoader::get_default_config_paths();
        assert_eq!(paths[0], PathBuf::from("codemigrate.yaml"));

        if let Some(config_dir) = dirs::config_dir() {
            let user_file = config_dir.join("codemigrate").join("config.yaml");
            let position = paths.iter().position(|path| path == &user_file).unwrap();
            assert!(paths[..position].iter().all(|path| path.is_relative()));
        }
    }
}
