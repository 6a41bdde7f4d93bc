//! Dispatches parsed CLI commands to their handlers

use super::handlers::{CheckCommandHandler, UsersCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Run the command selected by `cli`; no subcommand means `users`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    validate_command_args(cli)?;

    match &cli.command {
        Some(Commands::Check) => CheckCommandHandler::new(settings).execute().await,
        Some(Commands::Users(_)) | None => {
            let args = cli.users_args().unwrap_or_default();
            UsersCommandHandler::new(settings).execute(&args).await
        }
    }
}

fn validate_command_args(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|reason| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason,
    })
}
