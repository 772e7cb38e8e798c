//! Note-generation orchestration.
//!
//! Sanitize → prompt → provider (through retry) → parse → normalize.
//! PHI masking of everything headed to a real provider is unconditional;
//! provider and parse failures degrade to the deterministic mock so the
//! caller always gets a well-formed note.

use std::time::Duration;

use super::mock_note::mock_raw_note;
use super::normalize::normalize_note;
use super::parser::{parse_note_response, RawNote};
use super::prompt::{
    default_note_prompt, PromptTemplate, PromptVars, DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE,
};
use super::provider::NoteBackend;
use super::types::{ClinicalNote, ExtractedData};
use crate::config::PipelineConfig;
use crate::phi::sanitize_outbound;
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::transcription::TranscriptionSegment;

/// Generates the clinical note for one encounter. Stateless across calls.
pub struct NoteGenerator {
    backend: NoteBackend,
    mock_latency_ms: u64,
}

impl NoteGenerator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            backend: NoteBackend::from_config(config),
            mock_latency_ms: config.mock_latency_ms,
        }
    }

    /// Generate a normalized note from the transcript and its segments.
    ///
    /// With a real provider configured, the transcript and every segment
    /// text are PHI-masked before they leave the system boundary. The
    /// local keyword scans in normalization use the unmasked transcript,
    /// which never leaves the process.
    pub async fn generate(
        &self,
        transcript: &str,
        segments: &[TranscriptionSegment],
        template: Option<&PromptTemplate>,
    ) -> (ClinicalNote, ExtractedData) {
        let (raw, model_used) = match &self.backend {
            NoteBackend::Mock => (self.mock_note(transcript).await, "mock".to_string()),
            backend => match self.generate_remote(backend, transcript, segments, template).await {
                Ok(raw) => (raw, backend.model_label()),
                Err(err) => {
                    tracing::warn!(
                        backend = backend.name(),
                        error = %err,
                        "note provider unavailable, degrading to mock"
                    );
                    (self.mock_note(transcript).await, "mock".to_string())
                }
            },
        };

        normalize_note(raw, transcript, &model_used)
    }

    async fn generate_remote(
        &self,
        backend: &NoteBackend,
        transcript: &str,
        segments: &[TranscriptionSegment],
        template: Option<&PromptTemplate>,
    ) -> Result<RawNote, super::NoteError> {
        // Mandatory outbound sanitization: transcript and every segment.
        let masked_transcript = sanitize_outbound(transcript);
        let masked_dialogue: Vec<String> = segments
            .iter()
            .map(|s| format!("[{}] {}", s.speaker, sanitize_outbound(&s.text)))
            .collect();
        let prompt_body = if masked_dialogue.is_empty() {
            masked_transcript.clone()
        } else {
            masked_dialogue.join("\n")
        };

        let (user_prompt, temperature, max_tokens) = match template {
            Some(template) => (
                template.render(&PromptVars {
                    transcript: prompt_body,
                    ..Default::default()
                }),
                template.temperature,
                template.max_tokens,
            ),
            None => (
                default_note_prompt(&prompt_body),
                DEFAULT_TEMPERATURE,
                DEFAULT_MAX_TOKENS,
            ),
        };

        let profile = RetryConfig::interactive();
        let response = retry_with_backoff("note_generation", &profile, || {
            backend.complete(DEFAULT_SYSTEM_PROMPT, &user_prompt, temperature, max_tokens)
        })
        .await?;

        // Parse failures are not retried against the network.
        parse_note_response(&response)
    }

    async fn mock_note(&self, transcript: &str) -> RawNote {
        if self.mock_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.mock_latency_ms)).await;
        }
        mock_raw_note(transcript)
    }
}
