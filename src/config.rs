//! Configuration file support for the annotation editor.
//!
//! Settings are stored as JSON. Missing fields fall back to their defaults so
//! older files keep loading; files written by a newer version are rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_POINT_RADIUS, UNDO_HISTORY_SIZE};
use crate::model::Style;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Editor configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Editing preferences
    #[serde(default)]
    pub preferences: EditorPreferences,
}

/// Editing preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPreferences {
    /// Radius given to point markers
    #[serde(default = "default_point_radius")]
    pub point_radius: f64,

    /// Style applied to newly drawn shapes
    #[serde(default = "Style::drawing_default")]
    pub default_style: Style,

    /// Undo snapshots kept per side
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Clamp pointer positions into the image when its size is known
    #[serde(default = "default_clamp_to_canvas")]
    pub clamp_to_canvas: bool,

    /// Write a local draft after every edit
    #[serde(default)]
    pub draft_cache: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_point_radius() -> f64 {
    DEFAULT_POINT_RADIUS
}

fn default_max_history() -> usize {
    UNDO_HISTORY_SIZE
}

fn default_clamp_to_canvas() -> bool {
    true
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            point_radius: default_point_radius(),
            default_style: Style::drawing_default(),
            max_history: default_max_history(),
            clamp_to_canvas: default_clamp_to_canvas(),
            draft_cache: false,
            log_level: LogLevel::default(),
        }
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: EditorPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "fundus-annotator.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(
                config_dir
                    .join("fundus-annotator")
                    .join(Self::default_filename()),
            )
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("fundus-annotator")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a file, creating parent directories as needed.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.preferences.point_radius, 5.0);
        assert_eq!(config.preferences.max_history, UNDO_HISTORY_SIZE);
        assert!(config.preferences.clamp_to_canvas);
        assert!(!config.preferences.draft_cache);
        assert_eq!(
            config.preferences.default_style.stroke.as_deref(),
            Some("red")
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let json = r#"{"version": 1, "preferences": {"pointRadius": 8, "logLevel": "debug"}}"#;
        let config = EditorConfig::from_json(json).expect("valid config");

        assert_eq!(config.preferences.point_radius, 8.0);
        assert_eq!(config.preferences.log_level, LogLevel::Debug);
        assert_eq!(config.preferences.max_history, UNDO_HISTORY_SIZE);
        assert_eq!(config.preferences.default_style, Style::drawing_default());
    }

    #[test]
    fn test_missing_preferences_section() {
        let config = EditorConfig::from_json(r#"{"version": 1}"#).expect("valid config");
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_rejects_newer_version() {
        let json = format!(r#"{{"version": {}}}"#, CONFIG_VERSION + 1);
        let err = EditorConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::VersionTooNew { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = EditorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(EditorConfig::default_filename());

        let mut config = EditorConfig::new();
        config.preferences.max_history = 7;
        config.preferences.draft_cache = true;
        config.save_to_path(&path).expect("save config");

        let loaded = EditorConfig::load_from_path(&path).expect("load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().name(), "Info");
    }
}
