//! Pipeline configuration.
//!
//! All provider keys, model names, and timing knobs are injected through
//! `PipelineConfig`; nothing in the pipeline reads the environment or any
//! other global state at call time. `from_env()` exists as a one-shot
//! convenience for composition roots; tests construct configs directly and
//! can vary `mock_latency_ms` per invocation without cross-test leakage.

use serde::Serialize;

/// Artificial latency applied by mock providers when no override is given.
/// Keeps local demos feeling like real network calls; tests set it to 0.
const DEFAULT_MOCK_LATENCY_MS: u64 = 150;

/// Configuration consumed by the documentation pipeline.
///
/// A `None` API key means that provider is unavailable and the pipeline
/// degrades to its deterministic mock for that stage.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Key for the speech-to-text provider. `None` → mock transcription.
    /// Keys are excluded from serialized diagnostics.
    #[serde(skip_serializing)]
    pub transcription_api_key: Option<String>,
    /// OpenAI chat key for note generation.
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    /// Anthropic key for note generation. Preferred over OpenAI when both
    /// are set; see note provider selection.
    #[serde(skip_serializing)]
    pub anthropic_api_key: Option<String>,
    /// Speech-to-text model identifier.
    pub transcription_model: String,
    /// OpenAI chat model identifier.
    pub openai_model: String,
    /// Anthropic model identifier.
    pub anthropic_model: String,
    /// Base URL of the transcription endpoint (no trailing slash).
    pub transcription_base_url: String,
    /// Base URL of the OpenAI-compatible chat endpoint.
    pub openai_base_url: String,
    /// Base URL of the Anthropic messages endpoint.
    pub anthropic_base_url: String,
    /// Artificial delay for mock providers, in milliseconds. 0 disables
    /// the sleep entirely.
    pub mock_latency_ms: u64,
    /// Language hint passed to the transcription provider.
    pub language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            transcription_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            transcription_model: "whisper-1".into(),
            openai_model: "gpt-4o".into(),
            anthropic_model: "claude-3-5-sonnet-latest".into(),
            transcription_base_url: "https://api.openai.com/v1".into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            anthropic_base_url: "https://api.anthropic.com/v1".into(),
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
            language: "en".into(),
        }
    }
}

impl PipelineConfig {
    /// Read configuration from the process environment once.
    ///
    /// Call this at the composition root; the returned value is a plain
    /// snapshot and later env changes have no effect on it.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.transcription_api_key = non_empty_env("CLINSCRIBE_TRANSCRIPTION_API_KEY");
        config.openai_api_key = non_empty_env("OPENAI_API_KEY");
        config.anthropic_api_key = non_empty_env("ANTHROPIC_API_KEY");
        if let Some(model) = non_empty_env("CLINSCRIBE_TRANSCRIPTION_MODEL") {
            config.transcription_model = model;
        }
        if let Some(model) = non_empty_env("CLINSCRIBE_OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(model) = non_empty_env("CLINSCRIBE_ANTHROPIC_MODEL") {
            config.anthropic_model = model;
        }
        if let Some(ms) = non_empty_env("CLINSCRIBE_MOCK_LATENCY_MS") {
            if let Ok(parsed) = ms.parse() {
                config.mock_latency_ms = parsed;
            }
        }
        config
    }

    /// Config with every provider mocked and no artificial latency.
    pub fn mock_only() -> Self {
        Self {
            mock_latency_ms: 0,
            ..Self::default()
        }
    }

    pub fn with_mock_latency_ms(mut self, ms: u64) -> Self {
        self.mock_latency_ms = ms;
        self
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.language = lang.to_string();
        self
    }

    /// True when any note-generation provider key is configured.
    pub fn has_note_provider(&self) -> bool {
        self.anthropic_api_key.is_some() || self.openai_api_key.is_some()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
