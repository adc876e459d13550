//! Configuration system for the rustro launcher

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub paths: PathConfig,
    pub input: InputConfig,
    pub debug: DebugConfig,
}

/// Filesystem layout handed to launched sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Application-private data directory
    pub data_dir: PathBuf,
    /// Private, executable-capable core directory
    pub cores: PathBuf,
    /// Frontend configuration file handed to sessions
    pub config_file: PathBuf,
    /// Directory holding the installed frontend itself
    pub source_dir: PathBuf,
    /// Shared external storage root
    pub sdcard: PathBuf,
    /// Shared downloads directory
    pub downloads: PathBuf,
    /// Shared screenshots directory
    pub screenshots: PathBuf,
    /// App-specific directory on external storage
    pub external: PathBuf,
}

/// Input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Input-method identifier handed to sessions
    pub ime: String,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    pub log_to_file: bool,
    pub log_path: PathBuf,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Env-filter directive for this level
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

// Default implementations

impl Default for PathConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rustro");
        let sdcard = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let source_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            data_dir: base.clone(),
            cores: base.join("cores"),
            config_file: base.join("retroarch.cfg"),
            source_dir,
            downloads: dirs::download_dir().unwrap_or_else(|| sdcard.join("Downloads")),
            screenshots: dirs::picture_dir().unwrap_or_else(|| sdcard.join("Pictures")),
            external: sdcard.join("rustro").join("files"),
            sdcard,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            ime: "system".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_to_file: false,
            log_path: PathBuf::from("rustro.log"),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file path
    pub fn load_from(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rustro")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.paths.cores.ends_with("cores"));
        assert!(config.paths.config_file.ends_with("retroarch.cfg"));
        assert_eq!(config.input.ime, "system");
        assert_eq!(config.debug.log_level, LogLevel::Info);
        assert!(!config.debug.log_to_file);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.paths.cores, config.paths.cores);
        assert_eq!(parsed.input.ime, config.input.ime);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[input]\nime = \"ibus\"\n").unwrap();
        assert_eq!(parsed.input.ime, "ibus");
        assert_eq!(parsed.debug.log_level, LogLevel::Info);
        assert!(parsed.paths.cores.ends_with("cores"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[debug]\nlog_level = \"Debug\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.debug.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Info.as_filter(), "info");
        assert_eq!(LogLevel::Trace.as_filter(), "trace");
    }
}
