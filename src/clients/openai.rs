//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::traits::{
    ChatMessage, CompletionRequest, CompletionResponse, LanguageModel, ModelError,
};
use crate::config::Config;

pub struct OpenAIChatClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl OpenAIChatClient {
    /// `client` carries the transport timeout; see `capabilities::shared_http_client`
    pub fn new(client: reqwest::Client, api_key: String, config: &Config) -> Self {
        Self {
            client,
            api_key,
            endpoint: format!(
                "{}/chat/completions",
                config.model.base_url.trim_end_matches('/')
            ),
            model: config.model.model.clone(),
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
        }
    }

    /// Build from the loaded config, failing when OPENAI_API_KEY is absent
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self, ModelError> {
        let api_key = config
            .runtime
            .openai_api_key
            .clone()
            .ok_or_else(|| ModelError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self::new(client, api_key, config))
    }
}

#[async_trait]
impl LanguageModel for OpenAIChatClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ModelError> {
        let prompt_chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
        debug!(
            "Chat completion for stage {} (model={}, chars={})",
            request.stage_id, self.model, prompt_chars
        );

        let body = ChatRequestBody {
            model: &self.model,
            messages: &request.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, message });
        }

        let parsed: ChatResponseBody = response
            .json()
            .await
            .map_err(|e| ModelError::ParseError(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| ModelError::ParseError("no choices returned".to_string()))?;

        debug!(
            "Stage {} received {} chars from model",
            request.stage_id,
            content.len()
        );

        Ok(CompletionResponse {
            content,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            total_tokens: parsed.usage.map(|u| u.total_tokens),
        })
    }
}
