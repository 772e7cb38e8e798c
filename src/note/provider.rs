//! Chat providers for note generation.
//!
//! `NoteBackend` is the single selection point: Anthropic when its key is
//! configured (documented as the stronger model for this task), then
//! OpenAI, then the deterministic mock. Call sites stay backend-agnostic,
//! so adding a provider touches only this file.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::retry::ProviderError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One chat turn in the OpenAI wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

/// OpenAI-compatible chat client.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = OpenAiChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
            temperature,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_reqwest)?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OpenAiChatResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::NonRetryable(format!("bad chat response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::NonRetryable("no choices in chat response".into()))
    }
}

/// Anthropic messages-API client.
pub struct AnthropicChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicChatClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = AnthropicRequest {
            model: &self.model,
            system,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: user.into(),
            }],
            temperature,
            max_tokens,
        };

        let url = format!("{}/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_reqwest)?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnthropicResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::NonRetryable(format!("bad messages response: {e}")))?;
        parsed
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| ProviderError::NonRetryable("empty content in response".into()))
    }
}

/// Selected note-generation backend.
pub enum NoteBackend {
    Anthropic(AnthropicChatClient),
    OpenAi(OpenAiChatClient),
    Mock,
}

impl NoteBackend {
    /// Ordered preference: Anthropic → OpenAI → mock.
    pub fn from_config(config: &PipelineConfig) -> Self {
        if let Some(key) = &config.anthropic_api_key {
            tracing::info!(model = %config.anthropic_model, "note backend: anthropic");
            return Self::Anthropic(AnthropicChatClient::new(
                &config.anthropic_base_url,
                key,
                &config.anthropic_model,
            ));
        }
        if let Some(key) = &config.openai_api_key {
            tracing::info!(model = %config.openai_model, "note backend: openai");
            return Self::OpenAi(OpenAiChatClient::new(
                &config.openai_base_url,
                key,
                &config.openai_model,
            ));
        }
        tracing::info!("note backend: mock (no provider key configured)");
        Self::Mock
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Anthropic(_) => "anthropic",
            Self::OpenAi(_) => "openai",
            Self::Mock => "mock",
        }
    }

    /// Model identifier for provenance stamping.
    pub fn model_label(&self) -> String {
        match self {
            Self::Anthropic(client) => client.model.clone(),
            Self::OpenAi(client) => client.model.clone(),
            Self::Mock => "mock".into(),
        }
    }

    /// One completion attempt; retry policy lives with the caller.
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        match self {
            Self::Anthropic(client) => client.complete(system, user, temperature, max_tokens).await,
            Self::OpenAi(client) => client.complete(system, user, temperature, max_tokens).await,
            Self::Mock => Err(ProviderError::NonRetryable(
                "mock backend has no network path".into(),
            )),
        }
    }
}
