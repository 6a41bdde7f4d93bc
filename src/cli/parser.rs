//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::composer::{DateConstraint, FacetTag};

/// Compose filtered, paginated queries against an admin user list
#[derive(Parser, Debug)]
#[command(name = "listing-composer")]
#[command(about = "Compose filtered, paginated queries against an admin user list")]
#[command(long_about = "
listing-composer builds the same search, facet, date and page parameters an
admin Users table sends, issues one request and prints the normalized page.

EXAMPLES:
    # First page with the configured defaults
    listing-composer users

    # Verified, blocked users whose name or email matches 'ravi'
    listing-composer users --search ravi --facet verified --facet blocked

    # Users who joined today, 25 per page, as JSON
    listing-composer users --date today --page-size 25 --json

    # Point at another backend
    listing-composer users --base-url https://admin.example.org

    # Validate configuration and show the resolved endpoint
    listing-composer --env production check
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute (defaults to `users`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered configuration
    /// directory. Environment variables still override it.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    /// Available values: development (dev), production (prod), test
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one page of users with the given filters
    ///
    /// Examples:
    ///   listing-composer users --facet unverified
    ///   listing-composer users --date 2024-06-15 --page 2
    Users(UsersArgs),

    /// Validate configuration and print the resolved endpoint
    Check,
}

/// Filters and paging for the `users` command
#[derive(Args, Debug, Clone, Default)]
pub struct UsersArgs {
    /// Free-text search; surrounding whitespace is ignored
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Facet to apply; repeat for several
    ///
    /// Available values: admin, staff, verified, unverified, blocked, active.
    /// admin and staff need `capabilities.admin = true`.
    #[arg(short, long = "facet", value_name = "TAG", value_parser = super::validation::parse_facet)]
    pub facets: Vec<FacetTag>,

    /// Exact join date: `today` or YYYY-MM-DD
    #[arg(short, long, value_name = "DATE", value_parser = super::validation::parse_date)]
    pub date: Option<DateConstraint>,

    /// 1-based page number
    #[arg(short, long, value_name = "N", value_parser = super::validation::validate_page)]
    pub page: Option<u32>,

    /// Records per page (overrides `composer.page_size`)
    #[arg(long, value_name = "N", value_parser = super::validation::validate_page_size)]
    pub page_size: Option<u32>,

    /// Backend base URL (overrides `endpoint.base_url`)
    #[arg(long, value_name = "URL", value_parser = super::validation::validate_base_url)]
    pub base_url: Option<String>,

    /// Print the page as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Environment options
#[derive(ValueEnum, Clone, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

impl Cli {
    /// Checks clap cannot express on its own.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Commands::Users(args)) = &self.command {
            for tag in &args.facets {
                if let Some(counterpart) = tag.counterpart()
                    && args.facets.contains(&counterpart)
                {
                    return Err(format!(
                        "Facets '{}' and '{}' cannot be combined",
                        tag, counterpart
                    ));
                }
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }

    /// Arguments for `users`, also used when no subcommand is given.
    pub fn users_args(&self) -> Option<UsersArgs> {
        match &self.command {
            Some(Commands::Users(args)) => Some(args.clone()),
            None => Some(UsersArgs::default()),
            Some(Commands::Check) => None,
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["listing-composer", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["listing-composer"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        let args = cli.users_args().unwrap();
        assert!(args.facets.is_empty());
        assert!(!args.json);
    }

    #[test]
    fn test_users_command() {
        let cli = Cli::try_parse_from([
            "listing-composer",
            "users",
            "--search",
            "ravi",
            "--facet",
            "verified",
            "--facet",
            "blocked",
            "--date",
            "2024-06-15",
            "--page",
            "2",
            "--page-size",
            "25",
            "--json",
        ])
        .unwrap();

        let Some(Commands::Users(args)) = cli.command else {
            panic!("Expected Users command");
        };
        assert_eq!(args.search.as_deref(), Some("ravi"));
        assert_eq!(args.facets, vec![FacetTag::Verified, FacetTag::Blocked]);
        assert_eq!(
            args.date,
            Some(DateConstraint::Custom(jiff::civil::date(2024, 6, 15)))
        );
        assert_eq!(args.page, Some(2));
        assert_eq!(args.page_size, Some(25));
        assert!(args.json);
    }

    #[test]
    fn test_unknown_facet_is_rejected() {
        let result = Cli::try_parse_from(["listing-composer", "users", "--facet", "deleted"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_counterpart_facets_fail_validation() {
        let cli = Cli::try_parse_from([
            "listing-composer",
            "users",
            "--facet",
            "blocked",
            "--facet",
            "active",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_check_command() {
        let cli = Cli::try_parse_from(["listing-composer", "--env", "prod", "check"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check)));
        assert!(matches!(cli.env, Some(Environment::Production)));
        assert!(cli.users_args().is_none());
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["listing-composer", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
