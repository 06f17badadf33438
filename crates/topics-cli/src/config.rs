//! Configuration file handling for topics-cli

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use topics_stream::DEFAULT_TOPICS;

/// Server used when neither flag nor config file names one
pub const DEFAULT_SERVER: &str = "http://localhost:8000/api";

/// Whole-request timeout used when the config file sets none
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default API base URL
    pub server: Option<String>,
    /// Default output format
    pub output: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
    /// Default number of topics per request
    pub num_topics: Option<u32>,
    /// Whole-request timeout in seconds, streaming included
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("topics");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        server: Option<&str>,
        output: Option<&str>,
        no_color: bool,
    ) -> MergedConfig {
        MergedConfig {
            server: server
                .map(String::from)
                .or_else(|| self.server.clone())
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            output: output
                .map(String::from)
                .or_else(|| self.output.clone())
                .unwrap_or_else(|| "table".to_string()),
            no_color: no_color || self.no_color.unwrap_or(false),
            num_topics: self.num_topics.unwrap_or(DEFAULT_TOPICS),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub server: String,
    pub output: String,
    pub no_color: bool,
    pub num_topics: u32,
    pub timeout: Duration,
}

impl MergedConfig {
    /// Topic count for a command, preferring the flag
    pub fn topics(&self, flag: Option<u32>) -> u32 {
        flag.unwrap_or(self.num_topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server = \"http://example.com/api\"\noutput = \"json\"\nnum_topics = 5\ntimeout_secs = 60"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.server.as_deref(), Some("http://example.com/api"));
        assert_eq!(config.output.as_deref(), Some("json"));
        assert_eq!(config.num_topics, Some(5));
        assert_eq!(config.timeout_secs, Some(60));
        assert_eq!(config.no_color, None);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "num_topics = \"many\"").unwrap();

        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let merged = Config::default().merge_with_args(None, None, false);
        assert_eq!(merged.server, DEFAULT_SERVER);
        assert_eq!(merged.output, "table");
        assert!(!merged.no_color);
        assert_eq!(merged.num_topics, DEFAULT_TOPICS);
        assert_eq!(merged.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            server: Some("http://file/api".into()),
            output: Some("csv".into()),
            no_color: Some(true),
            num_topics: Some(7),
            timeout_secs: None,
        };

        let merged = config.merge_with_args(Some("http://flag/api"), None, false);
        assert_eq!(merged.server, "http://flag/api");
        assert_eq!(merged.output, "csv");
        assert!(merged.no_color);
        assert_eq!(merged.topics(None), 7);
        assert_eq!(merged.topics(Some(3)), 3);
    }
}
