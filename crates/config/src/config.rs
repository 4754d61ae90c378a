//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
    /// A required value was absent from both the file and the environment
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Missing(field) => write!(f, "Missing required setting: {}", field),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Watched and destination directories
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WatchConfig {
    /// Directory observed for newly arrived media
    pub base_dir: Option<PathBuf>,
    /// Library directory handed to the mover
    pub dest_dir: Option<PathBuf>,
}

/// External mover invocation: `program [args..] <source> <dest_dir>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoverConfig {
    #[serde(default = "default_mover_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_mover_program() -> String {
    "organize".to_string()
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            program: default_mover_program(),
            args: Vec::new(),
        }
    }
}

/// External subtitle fetcher invocation: `program [args..] <file> <language>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtitlesConfig {
    #[serde(default = "default_subtitles_program")]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_subtitles_program() -> String {
    "subtitles-downloader".to_string()
}

impl Default for SubtitlesConfig {
    fn default() -> Self {
        Self {
            program: default_subtitles_program(),
            args: Vec::new(),
        }
    }
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (default "info")
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub mover: MoverConfig,
    #[serde(default)]
    pub subtitles: SubtitlesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Parses the config.toml file and handles missing optional fields with defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - MEDIADROP_BASE_DIR -> watch.base_dir
    /// - MEDIADROP_DEST_DIR -> watch.dest_dir
    /// - MEDIADROP_MOVER_PROGRAM -> mover.program
    /// - MEDIADROP_SUBTITLES_PROGRAM -> subtitles.program
    /// - MEDIADROP_LOG_LEVEL -> logging.level
    /// - MEDIADROP_LOG_FORMAT -> logging.format
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = non_empty_var("MEDIADROP_BASE_DIR") {
            self.watch.base_dir = Some(PathBuf::from(val));
        }

        if let Some(val) = non_empty_var("MEDIADROP_DEST_DIR") {
            self.watch.dest_dir = Some(PathBuf::from(val));
        }

        if let Some(val) = non_empty_var("MEDIADROP_MOVER_PROGRAM") {
            self.mover.program = val;
        }

        if let Some(val) = non_empty_var("MEDIADROP_SUBTITLES_PROGRAM") {
            self.subtitles.program = val;
        }

        if let Some(val) = non_empty_var("MEDIADROP_LOG_LEVEL") {
            self.logging.level = val;
        }

        // Invalid value, keep existing
        if let Some(format) =
            non_empty_var("MEDIADROP_LOG_FORMAT").and_then(|v| v.parse::<LogFormat>().ok())
        {
            self.logging.format = format;
        }
    }

    /// Check that both watch directories are set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.base_dir.is_none() {
            return Err(ConfigError::Missing("watch.base_dir"));
        }
        if self.watch.dest_dir.is_none() {
            return Err(ConfigError::Missing("watch.dest_dir"));
        }
        Ok(())
    }

    /// Base and destination directories, once validated
    pub fn watch_dirs(&self) -> Result<(PathBuf, PathBuf), ConfigError> {
        let base = self
            .watch
            .base_dir
            .clone()
            .ok_or(ConfigError::Missing("watch.base_dir"))?;
        let dest = self
            .watch
            .dest_dir
            .clone()
            .ok_or(ConfigError::Missing("watch.dest_dir"))?;
        Ok((base, dest))
    }

    /// Load configuration from file, apply environment overrides and validate
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
