use clap::Parser;

use listing_composer::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        version = listing_composer::pkg_version(),
        endpoint = %settings.endpoint.list_url(),
        "Starting listing-composer"
    );

    execute_command(&cli, settings).await?;
    Ok(())
}
