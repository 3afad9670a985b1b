//! Answer service contract

use andy_chat_core::session::{Outcome, PendingQuestion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for answer service calls
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// Reply of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
}

impl ChatReply {
    pub fn answered(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
        }
    }

    pub fn rejected(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: response.into(),
        }
    }

    pub fn into_outcome(self) -> Outcome {
        if self.success {
            Outcome::Answered(self.response)
        } else {
            Outcome::Rejected(self.response)
        }
    }
}

/// Reply of `GET /api/health`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthReport {
    pub status: Option<String>,
    pub api_configured: Option<bool>,
    pub api_key_valid: Option<bool>,
    pub chromadb_connected: Option<bool>,
    pub document_loaded: Option<bool>,
    pub document_exists: Option<bool>,
    pub document_location: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

/// Something that answers questions about Andy
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask one question
    async fn ask(&self, question: &str) -> ServiceResult<ChatReply>;

    /// Query service health
    async fn health(&self) -> ServiceResult<HealthReport> {
        Err(ServiceError::InvalidResponse(
            "health check not supported".to_string(),
        ))
    }

    /// Human-readable location of the service
    fn endpoint(&self) -> String;
}

/// Run one accepted question against the service and classify the result
pub async fn dispatch(service: &dyn AnswerService, pending: &PendingQuestion) -> Outcome {
    match service.ask(pending.question()).await {
        Ok(reply) => reply.into_outcome(),
        Err(e) => {
            tracing::warn!("Answer service unreachable: {}", e);
            Outcome::Unreachable(e.to_string())
        }
    }
}
