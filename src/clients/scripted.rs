//! Canned-reply model that stands in for a provider in tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::clients::traits::{CompletionRequest, CompletionResponse, LanguageModel, ModelError};

/// Replies are looked up by stage id; `fallback` answers any stage without a specific reply.
#[derive(Default)]
pub struct ScriptedModel {
    replies: HashMap<String, Result<String, String>>,
    fallback: Option<String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, stage_id: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies.insert(stage_id.into(), Ok(reply.into()));
        self
    }

    pub fn with_failure(mut self, stage_id: impl Into<String>, error: impl Into<String>) -> Self {
        self.replies.insert(stage_id.into(), Err(error.into()));
        self
    }

    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// Stage ids in the order the model was called
    pub fn called_stages(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(|c| c.stage_id.clone()).collect())
            .unwrap_or_default()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ModelError> {
        let stage_id = request.stage_id.clone();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }

        let reply = match self.replies.get(&stage_id) {
            Some(Ok(text)) => text.clone(),
            Some(Err(message)) => {
                return Err(ModelError::RequestFailed(message.clone()));
            }
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ModelError::Exhausted(stage_id.clone()))?,
        };

        Ok(CompletionResponse {
            content: reply,
            model: "scripted".to_string(),
            total_tokens: None,
        })
    }
}
