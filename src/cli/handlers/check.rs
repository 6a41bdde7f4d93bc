//! Check command handler
//!
//! Validates the merged configuration and reports what a `users` run would use.

use crate::composer::{CapabilityProvider, StaticCapabilities};
use crate::config::Settings;
use crate::error::AppResult;

pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> AppResult<()> {
        for line in self.report()? {
            println!("{}", line);
        }
        Ok(())
    }

    /// Validation result as printable lines.
    pub fn report(&self) -> AppResult<Vec<String>> {
        self.config.validate()?;

        let endpoint = &self.config.endpoint;
        let composer = &self.config.composer;
        let capabilities = StaticCapabilities::from(&self.config.capabilities);
        let facets: Vec<String> = capabilities
            .selectable_facets()
            .iter()
            .map(|tag| tag.to_string())
            .collect();

        Ok(vec![
            "✓ Configuration is valid".to_string(),
            format!("✓ List endpoint: {}", endpoint.list_url()),
            format!(
                "✓ Timeouts: request {}s, connect {}s",
                endpoint.request_timeout, endpoint.connect_timeout
            ),
            format!(
                "✓ Authorization: {}",
                if endpoint.api_token.is_some() { "bearer token" } else { "none" }
            ),
            format!(
                "✓ Page size {} (max {}), search debounce {}ms",
                composer.page_size, composer.max_page_size, composer.debounce_ms
            ),
            format!("✓ Selectable facets: {}", facets.join(", ")),
            format!("✓ Log level: {}", self.config.logger.level),
        ])
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
