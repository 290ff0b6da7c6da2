//! HTTP client for a running pairline server

use anyhow::{Result, anyhow};
use pairline_core::{OutboundMessageRequest, SessionSnapshot};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    message_id: String,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Default server URL for a locally running `pairline serve`
    pub fn local(port: u16) -> Self {
        Self::new(format!("http://127.0.0.1:{}", port))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn status(&self) -> Result<SessionSnapshot> {
        let response = self
            .http
            .get(format!("{}/api/status", self.base_url))
            .send()
            .await
            .map_err(|e| anyhow!("Could not reach pairline at {}: {}", self.base_url, e))?;
        Self::parse(response).await
    }

    /// Send a message, returning the id the session assigned it
    pub async fn send_message(&self, number: &str, message: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/send-message", self.base_url))
            .json(&OutboundMessageRequest::new(number, message))
            .send()
            .await
            .map_err(|e| anyhow!("Could not reach pairline at {}: {}", self.base_url, e))?;
        let body: SendResponse = Self::parse(response).await?;
        Ok(body.message_id)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => Err(anyhow!("{} ({})", body.error, status)),
            Err(_) => Err(anyhow!("Server returned {}: {}", status, text)),
        }
    }
}
