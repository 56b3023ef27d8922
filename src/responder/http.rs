//! Responder speaking the SpeakGenie HTTP API

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ChatRequest, Responder, RoleplayRequest, TranslateRequest};
use crate::{Error, Result};

#[derive(serde::Deserialize)]
struct ReplyResponse {
    response: String,
}

#[derive(serde::Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// Client for `/api/chat`, `/api/roleplay` and `/api/translate`
#[derive(Clone)]
pub struct HttpResponder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResponder {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:3001/api`)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// API root this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}/{path}", self.base_url);

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            tracing::debug!(error = %e, url = %url, "request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Responder(format!("{path} returned {status}: {body}")));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let reply: ReplyResponse = self.post("chat", request).await?;
        Ok(reply.response)
    }

    async fn roleplay(&self, request: &RoleplayRequest) -> Result<String> {
        let reply: ReplyResponse = self.post("roleplay", request).await?;
        Ok(reply.response)
    }

    async fn translate(&self, request: &TranslateRequest) -> Result<String> {
        let reply: TranslateResponse = self.post("translate", request).await?;
        Ok(reply.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let responder = HttpResponder::new("http://localhost:3001/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(responder.base_url(), "http://localhost:3001/api");
    }
}
