//! Shared request plumbing

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ClientError, ClientResult, Operation, RequestCause};

/// Base URL plus a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Create an API handle for the configured service
    pub fn new(config: &Config) -> ClientResult<Self> {
        Self::with_base_url(config.api_base())
    }

    /// Create an API handle for an explicit base URL
    pub fn with_base_url(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("todo-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Absolute URL for a path starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a JSON body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.send(operation, request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::request(operation, RequestCause::Network(e.to_string())))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Malformed response to {}: {}", operation, e);
            ClientError::request(operation, RequestCause::Decode(e.to_string()))
        })
    }

    /// Send a request whose success response carries no body
    pub async fn send_empty(&self, operation: Operation, request: RequestBuilder) -> ClientResult<()> {
        self.send(operation, request).await?;
        Ok(())
    }

    async fn send(&self, operation: Operation, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", operation, e);
            ClientError::request(operation, RequestCause::Network(e.to_string()))
        })?;

        let status = response.status();
        debug!("{} -> HTTP {}", operation, status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::request(
                operation,
                RequestCause::Status {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        Ok(response)
    }
}
