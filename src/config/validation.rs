//! Configuration validation logic
//!
//! Values are checked once after loading (and again after CLI overrides are
//! merged), so the composer can rely on them without re-checking.

use crate::composer::MAX_PAGE_SIZE;
use crate::config::error::ConfigError;
use crate::config::settings::{ComposerConfig, EndpointConfig, LoggerSettings, Settings};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Longest debounce window accepted; anything above this makes typing feel broken.
const MAX_DEBOUNCE_MS: u64 = 5_000;

impl EndpointConfig {
    /// # Validation Rules
    /// - `base_url` must be an absolute http(s) URL
    /// - `list_path` must not be empty
    /// - both timeouts must be greater than 0, connect not above request
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::validation(
                "endpoint.base_url",
                "Base URL is required. Example: https://admin.example.org",
            ));
        }

        let url = self.list_url();
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| ConfigError::invalid_endpoint(url.clone(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::invalid_endpoint(
                url,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        if self.list_path.trim_matches('/').is_empty() {
            return Err(ConfigError::validation(
                "endpoint.list_path",
                "List path must name a resource, e.g. /api/users/",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "endpoint.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout == 0 {
            return Err(ConfigError::validation(
                "endpoint.connect_timeout",
                "Connect timeout must be greater than 0 seconds.",
            ));
        }

        if self.connect_timeout > self.request_timeout {
            return Err(ConfigError::validation(
                "endpoint.connect_timeout",
                "Connect timeout cannot exceed the request timeout.",
            ));
        }

        if let Some(token) = &self.api_token
            && token.trim().is_empty()
        {
            return Err(ConfigError::validation(
                "endpoint.api_token",
                "API token is set but empty; remove it or provide a value.",
            ));
        }

        Ok(())
    }
}

impl ComposerConfig {
    /// # Validation Rules
    /// - `max_page_size` must be within `1..=MAX_PAGE_SIZE`
    /// - `page_size` must be within `1..=max_page_size`
    /// - `debounce_ms` must not exceed 5 seconds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::validation(
                "composer.max_page_size",
                "Maximum page size must be at least 1.",
            ));
        }

        if self.max_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError {
                field: "composer.max_page_size".to_string(),
                message: format!(
                    "Maximum page size must not exceed {}, got {}",
                    MAX_PAGE_SIZE, self.max_page_size
                ),
            });
        }

        if self.page_size == 0 || self.page_size > self.max_page_size {
            return Err(ConfigError::ValidationError {
                field: "composer.page_size".to_string(),
                message: format!(
                    "Page size must be between 1 and {}, got {}",
                    self.max_page_size, self.page_size
                ),
            });
        }

        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::ValidationError {
                field: "composer.debounce_ms".to_string(),
                message: format!("Debounce must not exceed {} ms", MAX_DEBOUNCE_MS),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        let format = self.file.format.to_lowercase();
        if !VALID_LOG_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.file.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        if self.file.enabled && self.file.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "Log file path cannot be empty when file output is enabled.",
            ));
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate every section, stopping at the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application.name.trim().is_empty() {
            return Err(ConfigError::validation(
                "application.name",
                "Application name cannot be empty.",
            ));
        }

        self.endpoint.validate()?;
        self.composer.validate()?;
        self.logger.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_rejects_relative_base_url() {
        let endpoint = EndpointConfig {
            base_url: "admin.example.org".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            endpoint.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_endpoint_rejects_non_http_scheme() {
        let endpoint = EndpointConfig {
            base_url: "ftp://files.example.org".to_string(),
            ..Default::default()
        };
        let err = endpoint.validate().unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_endpoint_rejects_connect_longer_than_request() {
        let endpoint = EndpointConfig {
            request_timeout: 5,
            connect_timeout: 10,
            ..Default::default()
        };
        assert!(endpoint.validate().is_err());
    }

    #[test]
    fn test_endpoint_rejects_blank_token() {
        let endpoint = EndpointConfig {
            api_token: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(endpoint.validate().is_err());
    }

    #[test]
    fn test_composer_page_size_bounds() {
        let mut composer = ComposerConfig::default();
        composer.page_size = 0;
        assert!(composer.validate().is_err());

        composer.page_size = 101;
        assert!(composer.validate().is_err());

        composer.page_size = 100;
        assert!(composer.validate().is_ok());
    }

    #[test]
    fn test_composer_max_page_size_above_ceiling() {
        let composer = ComposerConfig {
            page_size: 150,
            max_page_size: 500,
            ..Default::default()
        };
        let err = composer.validate().unwrap_err();
        assert!(err.to_string().contains("composer.max_page_size"));

        let composer = ComposerConfig {
            page_size: 50,
            max_page_size: MAX_PAGE_SIZE,
            ..Default::default()
        };
        assert!(composer.validate().is_ok());
    }

    #[test]
    fn test_composer_debounce_limit() {
        let composer = ComposerConfig {
            debounce_ms: MAX_DEBOUNCE_MS + 1,
            ..Default::default()
        };
        assert!(composer.validate().is_err());
    }

    #[test]
    fn test_logger_requires_an_output() {
        let mut logger = LoggerSettings::default();
        logger.console.enabled = false;
        logger.file.enabled = false;
        assert!(logger.validate().is_err());
    }

    #[test]
    fn test_logger_level_is_case_insensitive() {
        let logger = LoggerSettings {
            level: "DEBUG".to_string(),
            ..Default::default()
        };
        assert!(logger.validate().is_ok());
    }
}
