use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};

use crate::config::EndpointConfig;
use crate::error::{AppError, AppResult};

/// Build the HTTP client used to reach the list endpoint.
///
/// One client per endpoint so connections are pooled across page and filter
/// changes. Timeouts come from configuration; the optional API token is
/// attached as a default `Authorization: Bearer` header.
pub fn build_http_client(config: &EndpointConfig) -> AppResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = &config.api_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|e| {
            AppError::Configuration {
                key: "endpoint.api_token".to_string(),
                source: e.into(),
            }
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    reqwest::Client::builder()
        // Timeouts
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        // Connection pooling
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        .default_headers(headers)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Configuration {
            key: "endpoint".to_string(),
            source: e.into(),
        })
}
