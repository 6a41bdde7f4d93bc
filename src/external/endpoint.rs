use async_trait::async_trait;
use serde_json::Value;

use crate::composer::RequestParams;
use crate::config::EndpointConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::build_http_client;

/// A paginated list resource.
///
/// Implementations return the raw JSON body; shape recognition happens in
/// the composer.
#[async_trait]
pub trait ListEndpoint: Send + Sync {
    /// Label used in errors and logs.
    fn name(&self) -> &str;

    async fn fetch(&self, params: &RequestParams) -> AppResult<Value>;
}

/// [`ListEndpoint`] over HTTP GET.
pub struct HttpListEndpoint {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpListEndpoint {
    pub fn new(config: &EndpointConfig) -> AppResult<Self> {
        let client = build_http_client(config)?;
        Self::with_client(client, &config.list_url())
    }

    pub fn with_client(client: reqwest::Client, url: &str) -> AppResult<Self> {
        let url = reqwest::Url::parse(url).map_err(|e| AppError::Configuration {
            key: "endpoint.base_url".to_string(),
            source: anyhow::anyhow!("invalid list URL '{}': {}", url, e),
        })?;
        Ok(Self { client, url })
    }

    /// The list URL with `params` appended to any query it already carries.
    pub fn request_url(&self, params: &RequestParams) -> reqwest::Url {
        let mut url = self.url.clone();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }
        url
    }

    fn transport_error(&self, message: String, source: reqwest::Error) -> AppError {
        AppError::Transport {
            endpoint: self.url.path().to_string(),
            message,
            source: Some(source.into()),
        }
    }
}

#[async_trait]
impl ListEndpoint for HttpListEndpoint {
    fn name(&self) -> &str {
        self.url.path()
    }

    async fn fetch(&self, params: &RequestParams) -> AppResult<Value> {
        let url = self.request_url(params);
        tracing::debug!(url = %url, "Fetching list page");

        let resp = self.client.get(url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                "could not connect".to_string()
            } else {
                format!("request failed: {}", e)
            };
            self.transport_error(message, e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                endpoint: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(format!("reading body failed: {}", e), e))?;

        serde_json::from_slice(&body).map_err(|e| AppError::MalformedPayload {
            endpoint: self.name().to_string(),
            message: format!("invalid JSON: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(url: &str) -> HttpListEndpoint {
        HttpListEndpoint::with_client(reqwest::Client::new(), url).unwrap()
    }

    #[test]
    fn test_request_url_appends_params() {
        let mut params = RequestParams::default();
        params.insert("page", "2");
        params.insert("search", "ravi kumar");

        let url = endpoint("http://127.0.0.1:8000/api/users/").request_url(&params);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/users/?page=2&search=ravi+kumar"
        );
    }

    #[test]
    fn test_request_url_keeps_existing_query() {
        let mut params = RequestParams::default();
        params.insert("page", "1");

        let url = endpoint("http://127.0.0.1:8000/api/users/?format=json").request_url(&params);
        assert_eq!(url.query(), Some("format=json&page=1"));
    }

    #[test]
    fn test_invalid_url_is_configuration_error() {
        let result = HttpListEndpoint::with_client(reqwest::Client::new(), "not a url");
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_name_is_path() {
        assert_eq!(endpoint("https://admin.example.org/api/users/").name(), "/api/users/");
    }
}
