use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single chat turn sent to the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One completion request issued by a stage
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Stage id, carried for logging and scripted replies
    pub stage_id: String,
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a JSON object response
    pub json_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model not configured: {0}")]
    NotConfigured(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("no scripted reply for stage {0}")]
    Exhausted(String),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ModelError>;
}
