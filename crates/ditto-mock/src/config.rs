//! Configuration for the matcher and the `ditto` CLI.

use crate::error::ConfigError;
use crate::loader::DEFAULT_EXTENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Directory (or single file) holding mock definitions.
    /// When absent no discovery happens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mocks_path: Option<PathBuf>,

    /// Extension of definition files
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            mocks_path: None,
            extension: default_extension(),
            log: LogConfig::default(),
        }
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl MatcherConfig {
    /// Load a YAML (or JSON) configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `ditto_mock=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::from_yaml("{}").unwrap();
        assert_eq!(config, MatcherConfig::default());
        assert_eq!(config.extension, "json");
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Text);
        assert!(config.mocks_path.is_none());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
mocksPath: ./testdata/mocks
extension: mock
log:
  level: ditto_mock=debug
  format: json
"#;
        let config = MatcherConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.mocks_path, Some(PathBuf::from("./testdata/mocks")));
        assert_eq!(config.extension, "mock");
        assert_eq!(config.log.level, "ditto_mock=debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mocksPath: /srv/mocks").unwrap();

        let config = MatcherConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mocks_path, Some(PathBuf::from("/srv/mocks")));
    }

    #[test]
    fn test_from_file_errors() {
        let missing = MatcherConfig::from_file("/definitely/not/here.yaml");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log: [not, a, map]").unwrap();
        let invalid = MatcherConfig::from_file(file.path());
        assert!(matches!(invalid, Err(ConfigError::Yaml { .. })));
    }
}
