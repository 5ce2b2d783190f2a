//! Configuration management for the CLI
//!
//! Settings are merged from, in increasing precedence:
//! - Default values
//! - A configuration file (YAML or JSON)
//! - `FIELDMAP_*` environment variables
//! - Command-line flags (applied by the handlers)

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::logging::LogFormat;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `paths.base_dir`
pub const ENV_BASE_DIR: &str = "FIELDMAP_BASE_DIR";
/// Environment variable overriding `defaults.dry_run`
pub const ENV_DRY_RUN: &str = "FIELDMAP_DRY_RUN";
/// Environment variable overriding `defaults.json_output`
pub const ENV_JSON_OUTPUT: &str = "FIELDMAP_JSON_OUTPUT";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toggle values used when no flag is given
    pub defaults: DefaultsConfig,

    /// Path settings
    pub paths: PathConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Default values for the two mapping toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Run without producing a target document
    pub dry_run: bool,

    /// Return the report instead of the target document
    pub json_output: bool,
}

/// Path configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory configuration and data references are resolved against
    pub base_dir: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter used when no `-v` flag is given
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            json_output: false,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config: Self = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Using configuration file");
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations, then
    /// apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Default configuration file paths, in lookup order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".fieldmap.yaml"), PathBuf::from(".fieldmap.json")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fieldmap").join("config.yaml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".fieldmap.yaml"));
        }

        paths
    }

    /// Apply `FIELDMAP_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_dir) = lookup(ENV_BASE_DIR) {
            self.paths.base_dir = PathBuf::from(base_dir);
        }
        if let Some(value) = lookup(ENV_DRY_RUN) {
            self.defaults.dry_run = parse_flag(ENV_DRY_RUN, &value)?;
        }
        if let Some(value) = lookup(ENV_JSON_OUTPUT) {
            self.defaults.json_output = parse_flag(ENV_JSON_OUTPUT, &value)?;
        }
        Ok(())
    }

    /// Output format named by `output.format`
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.output.format, true).map_err(|_| {
            Error::config(format!(
                "output.format: unknown format '{}' (expected human, json, json-pretty or yaml)",
                self.output.format
            ))
        })
    }

    /// Log format named by `logging.format`
    pub fn log_format(&self) -> Result<LogFormat> {
        LogFormat::parse(&self.logging.format).ok_or_else(|| {
            Error::config(format!(
                "logging.format: unknown format '{}' (expected compact, full or json)",
                self.logging.format
            ))
        })
    }

    /// Check the enumerated string settings
    pub fn validate(&self) -> Result<()> {
        self.output_format()?;
        self.log_format()?;
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("{}: expected a boolean, got '{}'", name, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.defaults.dry_run);
        assert!(!config.defaults.json_output);
        assert_eq!(config.paths.base_dir, PathBuf::from("."));
        assert_eq!(config.output_format().unwrap(), OutputFormat::Human);
        assert_eq!(config.log_format().unwrap(), LogFormat::Compact);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                (ENV_BASE_DIR, "/srv/mappings"),
                (ENV_DRY_RUN, "false"),
                (ENV_JSON_OUTPUT, "1"),
            ]))
            .unwrap();

        assert_eq!(config.paths.base_dir, PathBuf::from("/srv/mappings"));
        assert!(!config.defaults.dry_run);
        assert!(config.defaults.json_output);
    }

    #[test]
    fn test_invalid_env_flag() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_DRY_RUN, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_DRY_RUN));
    }

    #[test]
    fn test_partial_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldmap.yaml");
        std::fs::write(
            &path,
            "defaults:\n  json_output: true\noutput:\n  format: json-pretty\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.defaults.dry_run);
        assert!(config.defaults.json_output);
        assert_eq!(config.output_format().unwrap(), OutputFormat::JsonPretty);
        assert!(config.output.color);
    }

    #[test]
    fn test_json_file_with_bad_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldmap.json");
        std::fs::write(&path, r#"{"logging": {"format": "xml"}}"#).unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load_with_file(Some(Path::new("/nonexistent/fieldmap.yaml"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_default_paths_order() {
        let paths = Config::default_config_paths();
        assert_eq!(paths[0], PathBuf::from(".fieldmap.yaml"));
        assert_eq!(paths[1], PathBuf::from(".fieldmap.json"));
    }
}
