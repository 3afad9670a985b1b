//! HTTP answer service client

use andy_chat_core::utils::{one_line, truncate};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::base::{AnswerService, ChatReply, ChatRequest, HealthReport, ServiceError, ServiceResult};

const BODY_EXCERPT_LEN: usize = 200;

/// Client for the answer service HTTP API.
///
/// Requests carry no timeout: a call waits until the service answers or the
/// connection fails.
pub struct HttpAnswerService {
    client: Client,
    base_url: String,
}

impl HttpAnswerService {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> ServiceResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ServiceError::Config(format!(
                "base URL must be http(s): {:?}",
                base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a JSON body whatever the HTTP status; the service reports
    /// application failures inside the body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<T> {
        let status = response.status();
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            ServiceError::InvalidResponse(format!(
                "HTTP {}: {} ({})",
                status,
                truncate(body.trim(), BODY_EXCERPT_LEN),
                e
            ))
        })
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, question: &str) -> ServiceResult<ChatReply> {
        let url = self.url("/api/chat");
        debug!("Asking {}: {}", url, one_line(question, 80));

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                question: question.to_string(),
            })
            .send()
            .await?;

        let reply: ChatReply = Self::decode(response).await?;
        debug!(
            success = reply.success,
            "Answer received: {}",
            one_line(&reply.response, 80)
        );
        Ok(reply)
    }

    async fn health(&self) -> ServiceResult<HealthReport> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        Self::decode(response).await
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}
