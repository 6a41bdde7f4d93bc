//! Command-line interface for listing-composer
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command dispatch to the `users` and `check` handlers

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, UsersArgs};

use anyhow::Context;

use crate::config::Settings;
use crate::logger::init_logger;

/// Load configuration, then apply CLI overrides and validate the result.
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let environment = cli.env.clone().map(Into::into);
    let merger = ConfigurationMerger::from_config_path(cli.config.as_ref(), environment)
        .context("Configuration error")?;

    merger
        .merge_cli_args(cli)
        .context("Configuration merge error")
}

/// Install the global subscriber described by the logger section.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .context("Logger configuration error")?;

    init_logger(logger_config).context("Logger initialization error")
}
