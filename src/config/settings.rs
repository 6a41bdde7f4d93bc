//! Configuration settings structures for listing-composer
//!
//! Every section deserializes with defaults so a partial `default.toml`
//! (or none of a section at all) still yields usable settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "listing-composer".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_list_path() -> String {
    "/api/users/".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_debounce_ms() -> u64 {
    450
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/listing-composer.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Endpoint Configuration
// ============================================================================

/// Where the paginated list endpoint lives and how to reach it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Scheme and authority of the backend, e.g. `https://admin.example.org`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the list resource, appended to `base_url`
    #[serde(default = "default_list_path")]
    pub list_path: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Bearer token sent as `Authorization` when present
    #[serde(default)]
    pub api_token: Option<String>,
}

impl EndpointConfig {
    /// Full URL of the list resource.
    pub fn list_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.list_path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            list_path: default_list_path(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            api_token: None,
        }
    }
}

// ============================================================================
// Composer Configuration
// ============================================================================

/// Paging and debounce behaviour of the filter composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound accepted for `page_size`
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Quiet period after the last keystroke before the search is emitted
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl ComposerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

// ============================================================================
// Capabilities Configuration
// ============================================================================

/// Role of the operator running the composer; decides which facets are selectable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    #[serde(default)]
    pub admin: bool,
}

// ============================================================================
// Logger Settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    /// Append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// "full", "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration as it appears in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// "trace", "debug", "info", "warn" or "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime logger configuration.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level).map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: e.to_string(),
        })
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })?;

        Ok(FileConfig::new(
            self.enabled,
            PathBuf::from(self.path),
            self.append,
            format,
        ))
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete settings loaded from TOML files and environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub composer: ComposerConfig,

    #[serde(default)]
    pub capabilities: CapabilitiesConfig,

    #[serde(default)]
    pub logger: LoggerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.composer.page_size, 10);
        assert_eq!(settings.composer.debounce(), Duration::from_millis(450));
        assert!(!settings.capabilities.admin);
    }

    #[test]
    fn test_list_url_joins_slashes() {
        let endpoint = EndpointConfig {
            base_url: "https://admin.example.org/".to_string(),
            list_path: "/api/users/".to_string(),
            ..Default::default()
        };
        assert_eq!(endpoint.list_url(), "https://admin.example.org/api/users/");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
[endpoint]
base_url = "https://admin.example.org"

[composer]
page_size = 25
"#,
        )
        .unwrap();

        assert_eq!(settings.endpoint.list_path, "/api/users/");
        assert_eq!(settings.composer.page_size, 25);
        assert_eq!(settings.composer.debounce_ms, 450);
        assert_eq!(settings.logger.level, "info");
    }

    #[test]
    fn test_logger_settings_conversion() {
        let logger = LoggerSettings {
            file: FileSettings {
                enabled: true,
                format: "compact".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = logger.into_logger_config().unwrap();
        assert_eq!(config.file.format, LogFormat::Compact);
        assert!(config.file.enabled);
    }

    #[test]
    fn test_logger_settings_rejects_unknown_format() {
        let logger = LoggerSettings {
            file: FileSettings {
                format: "xml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = logger.into_logger_config().unwrap_err();
        assert!(err.to_string().contains("logger.file.format"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn property_settings_survive_toml_roundtrip(
            page_size in 1u32..=100,
            debounce_ms in 0u64..5_000,
            admin in any::<bool>(),
        ) {
            let mut settings = Settings::default();
            settings.composer.page_size = page_size;
            settings.composer.debounce_ms = debounce_ms;
            settings.capabilities.admin = admin;

            let text = toml::to_string(&settings).unwrap();
            let parsed: Settings = toml::from_str(&text).unwrap();
            prop_assert_eq!(parsed, settings);
        }
    }
}
