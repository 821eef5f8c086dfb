// File: harness/src/admin.rs
use anyhow::{anyhow, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use crate::errors::HarnessError;

/// HTTP client for the agent's admin API
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl AdminClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue an admin call and decode the body as JSON.
    ///
    /// An empty body yields `None`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        data: Option<&Value>,
    ) -> Result<Option<Value>> {
        let text = self.send(method, path, data).await?;
        if text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|_| HarnessError::JsonDecode { body: text }.into())
    }

    /// Issue an admin call and return the raw body
    pub async fn request_text(
        &self,
        method: Method,
        path: &str,
        data: Option<&Value>,
    ) -> Result<String> {
        self.send(method, path, data).await
    }

    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, data: Option<&Value>) -> Result<Option<Value>> {
        self.request(Method::POST, path, data).await
    }

    pub async fn get_text(&self, path: &str) -> Result<String> {
        self.request_text(Method::GET, path, None).await
    }

    pub async fn post_text(&self, path: &str, data: Option<&Value>) -> Result<String> {
        self.request_text(Method::POST, path, data).await
    }

    async fn send(&self, method: Method, path: &str, data: Option<&Value>) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Admin request: {} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = data {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("Admin request to {} failed: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarnessError::UnexpectedStatus {
                status: status.as_u16(),
            }
            .into());
        }

        response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read admin response from {}: {}", url, e))
    }
}
