//! Transcription orchestration: provider → retry → fallback → PHI scan.

use std::time::Duration;

use super::mock::mock_transcription;
use super::provider::{RawTranscription, TranscriptionClient};
use super::speakers::{assign_speakers_heuristic, map_diarized_speakers, speaker_map_for};
use super::types::{AudioSource, TranscriptionResult, TranscriptionSegment};
use crate::config::PipelineConfig;
use crate::phi::detect_phi;
use crate::retry::{retry_with_backoff, RetryConfig};

/// Turns encounter audio into a transcript with speaker-tagged segments
/// and a PHI entity scan. Stateless across calls.
pub struct TranscriptionAdapter {
    client: Option<TranscriptionClient>,
    mock_latency_ms: u64,
    language: String,
}

impl TranscriptionAdapter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            client: TranscriptionClient::from_config(config),
            mock_latency_ms: config.mock_latency_ms,
            language: config.language.clone(),
        }
    }

    /// Transcribe one audio payload.
    ///
    /// Guaranteed to return a non-empty, well-formed result: provider
    /// failures after retries degrade to the deterministic mock and are
    /// logged for operational visibility, never surfaced as errors.
    pub async fn transcribe(
        &self,
        audio: &AudioSource,
        duration_hint_secs: f64,
    ) -> TranscriptionResult {
        if let Some(client) = &self.client {
            let profile = RetryConfig::bulk_transcription();
            match retry_with_backoff("transcription", &profile, || client.request(audio)).await {
                Ok(raw) => return self.build_result(raw, duration_hint_secs),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        file = %audio.file_name,
                        "transcription provider failed after retries, using mock"
                    );
                }
            }
        }

        if self.mock_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.mock_latency_ms)).await;
        }
        mock_transcription(duration_hint_secs, &self.language)
    }

    /// Assemble the final result from a parsed provider response.
    fn build_result(&self, raw: RawTranscription, duration_hint_secs: f64) -> TranscriptionResult {
        let diarized = raw.segments.iter().any(|s| s.speaker.is_some());
        let (segments, speakers) = if raw.segments.is_empty() {
            // Text-only response, no timing information: a single doctor-tagged
            // segment spanning the whole recording.
            let duration = raw.duration.unwrap_or(duration_hint_secs).max(0.0);
            let segments = vec![TranscriptionSegment {
                speaker: "speaker_0".into(),
                text: raw.text.clone(),
                start_secs: 0.0,
                end_secs: duration,
                confidence: 0.9,
            }];
            let speakers = speaker_map_for(&segments);
            (segments, speakers)
        } else if diarized {
            map_diarized_speakers(&raw.segments)
        } else {
            assign_speakers_heuristic(&raw.segments)
        };

        let duration_secs = raw
            .duration
            .unwrap_or_else(|| segments.iter().fold(0.0, |acc, s| acc.max(s.end_secs)));

        let phi_entities = detect_phi(&raw.text);
        if !phi_entities.is_empty() {
            tracing::debug!(count = phi_entities.len(), "PHI detected in transcript");
        }

        TranscriptionResult {
            text: raw.text,
            segments,
            speakers,
            phi_entities,
            language: raw.language.unwrap_or_else(|| self.language.clone()),
            duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::provider::parse_response_body;
    use crate::transcription::types::SpeakerRole;

    fn mock_adapter() -> TranscriptionAdapter {
        TranscriptionAdapter::new(&PipelineConfig::mock_only())
    }

    fn audio() -> AudioSource {
        AudioSource::new(vec![0u8; 16], "visit.wav")
    }

    #[tokio::test]
    async fn no_provider_key_uses_mock() {
        let result = mock_adapter().transcribe(&audio(), 60.0).await;
        assert!(!result.text.is_empty());
        assert!(!result.segments.is_empty());
        assert!((result.duration_secs - 60.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn mock_latency_zero_returns_immediately() {
        let started = std::time::Instant::now();
        let result = mock_adapter().transcribe(&audio(), 30.0).await;
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(!result.segments.is_empty());
    }

    #[test]
    fn text_only_response_becomes_single_doctor_segment() {
        let adapter = mock_adapter();
        let raw = parse_response_body(r#"{"text": "short visit note"}"#).unwrap();
        let result = adapter.build_result(raw, 42.0);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].speaker, "speaker_0");
        assert_eq!(result.speakers["speaker_0"].role, SpeakerRole::Doctor);
        assert!((result.duration_secs - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn diarized_response_maps_stable_ids() {
        let adapter = mock_adapter();
        let body = r#"{
            "segments": [
                {"speaker": "S1", "text": "what brings you in", "start": 0.0, "end": 2.0},
                {"speaker": "S2", "text": "my arm hurts", "start": 2.2, "end": 4.0}
            ]
        }"#;
        let raw = parse_response_body(body).unwrap();
        let result = adapter.build_result(raw, 0.0);
        assert_eq!(result.segments[0].speaker, "speaker_0");
        assert_eq!(result.segments[1].speaker, "speaker_1");
        assert_eq!(result.speakers["speaker_1"].role, SpeakerRole::Patient);
    }

    #[test]
    fn undiarized_response_uses_heuristic() {
        let adapter = mock_adapter();
        let body = r#"{
            "text": "any allergies? yes to penicillin",
            "segments": [
                {"text": "any allergies?", "start": 0.0, "end": 1.5},
                {"text": "yes to penicillin", "start": 1.7, "end": 3.5}
            ]
        }"#;
        let raw = parse_response_body(body).unwrap();
        let result = adapter.build_result(raw, 0.0);
        assert_eq!(result.segments[0].speaker, "speaker_0");
        assert_eq!(result.segments[1].speaker, "speaker_1");
    }

    #[test]
    fn transcript_phi_is_scanned() {
        let adapter = mock_adapter();
        let raw =
            parse_response_body(r#"{"text": "callback number is 555-867-5309"}"#).unwrap();
        let result = adapter.build_result(raw, 10.0);
        assert_eq!(result.phi_entities.len(), 1);
    }
}
