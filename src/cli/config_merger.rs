//! Merges CLI overrides into file-based configuration
//!
//! Precedence, highest first: CLI flags, `LISTING_*` environment variables,
//! configuration files, built-in defaults.

use std::path::PathBuf;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, Settings};

/// Applies CLI overrides on top of loaded settings
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load base settings from `config_path`, or from the layered directory
    /// when no path is given.
    pub fn from_config_path(
        config_path: Option<&PathBuf>,
        environment: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let loader = match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::file_not_found(path.display().to_string()));
                }
                ConfigLoader::from_file(path)
            }
            None => ConfigLoader::new()?,
        };
        let loader = match environment {
            Some(env) => loader.with_environment(env),
            None => loader,
        };

        tracing::debug!(environment = %loader.environment(), "Loading configuration");
        Ok(Self::new(loader.load()?))
    }

    /// Settings with every CLI override applied, validated again.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Users(args)) = &cli.command {
            if let Some(base_url) = &args.base_url {
                config.endpoint.base_url = base_url.clone();
            }
            if let Some(page_size) = args.page_size {
                config.composer.page_size = page_size;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(Settings::default()).merge_cli_args(&cli)
    }

    #[test]
    fn test_verbose_and_quiet_set_level() {
        assert_eq!(merge(&["listing-composer", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["listing-composer", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_users_overrides() {
        let merged = merge(&[
            "listing-composer",
            "users",
            "--base-url",
            "https://admin.example.org",
            "--page-size",
            "50",
        ])
        .unwrap();

        assert_eq!(merged.endpoint.base_url, "https://admin.example.org");
        assert_eq!(merged.composer.page_size, 50);
    }

    #[test]
    fn test_page_size_above_configured_maximum_is_rejected() {
        let mut base = Settings::default();
        base.composer.max_page_size = 20;
        let cli = Cli::try_parse_from(["listing-composer", "users", "--page-size", "50"]).unwrap();

        assert!(ConfigurationMerger::new(base).merge_cli_args(&cli).is_err());
    }

    #[test]
    fn test_check_leaves_settings_alone() {
        let merged = merge(&["listing-composer", "check"]).unwrap();
        assert_eq!(merged, Settings::default());
    }

    #[test]
    fn test_from_single_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[endpoint]\nbase_url = \"https://staging.example.org\"\n\n[composer]\npage_size = 15"
        )
        .unwrap();

        let merger = ConfigurationMerger::from_config_path(
            Some(&file.path().to_path_buf()),
            Some(Environment::Test),
        )
        .unwrap();
        assert_eq!(merger.config().endpoint.base_url, "https://staging.example.org");
        assert_eq!(merger.config().composer.page_size, 15);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let path = PathBuf::from("/definitely/not/here.toml");
        assert!(matches!(
            ConfigurationMerger::from_config_path(Some(&path), None),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
