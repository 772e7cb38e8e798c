//! HTTP client for the speech-to-text provider.
//!
//! The upload is a multipart form `{file, model, language, response_format}`.
//! Providers answer in one of three shapes (plain text, timestamped
//! segments without diarization, or diarized segments), all folded into
//! [`RawTranscription`] here; speaker attribution happens in `speakers`.

use serde::Deserialize;

use super::types::AudioSource;
use super::TranscriptionError;
use crate::config::PipelineConfig;
use crate::retry::ProviderError;

/// Content types by audio file extension; unmapped extensions fall back to
/// a generic audio type.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("wav", "audio/wav"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("webm", "audio/webm"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
];

const FALLBACK_CONTENT_TYPE: &str = "audio/webm";

/// Infer the upload content type from a file name's extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name.rsplit('.').next().unwrap_or_default().to_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Provider response folded into one shape. `segments` is empty for
/// text-only responses; `speaker` is `None` for undiarized segments.
#[derive(Debug, Clone)]
pub struct RawTranscription {
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub speaker: Option<String>,
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Wire mirror of the provider's JSON body; every field tolerated missing.
#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Option<Vec<RawSegment>>,
}

/// Speech-to-text HTTP client. Built only when a provider key is
/// configured.
pub struct TranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl TranscriptionClient {
    /// `None` when no transcription key is configured.
    pub fn from_config(config: &PipelineConfig) -> Option<Self> {
        let api_key = config.transcription_api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            base_url: config.transcription_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.transcription_model.clone(),
            language: config.language.clone(),
        })
    }

    /// One transcription attempt. Retry policy lives in the adapter.
    pub async fn request(&self, audio: &AudioSource) -> Result<RawTranscription, ProviderError> {
        let content_type = content_type_for(&audio.file_name);
        let file_part = reqwest::multipart::Part::bytes(audio.bytes.clone())
            .file_name(audio.file_name.clone())
            .mime_str(content_type)
            .map_err(|e| ProviderError::NonRetryable(format!("bad content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "verbose_json");

        let url = format!("{}/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response_body(&body).map_err(|e| ProviderError::NonRetryable(e.to_string()))
    }
}

/// Fold a provider body into [`RawTranscription`]. Non-JSON bodies are
/// accepted as plain-transcript responses (shape a).
pub fn parse_response_body(body: &str) -> Result<RawTranscription, TranscriptionError> {
    match serde_json::from_str::<WireResponse>(body) {
        Ok(wire) => {
            let segments = wire.segments.unwrap_or_default();
            let text = match wire.text {
                Some(text) if !text.trim().is_empty() => text,
                // Some diarizing providers omit the flat transcript.
                _ => segments
                    .iter()
                    .map(|s| s.text.trim())
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            if text.trim().is_empty() {
                return Err(TranscriptionError::MalformedResponse(
                    "response carries neither text nor segments".into(),
                ));
            }
            Ok(RawTranscription {
                text,
                language: wire.language,
                duration: wire.duration,
                segments,
            })
        }
        Err(_) if !body.trim().is_empty() => Ok(RawTranscription {
            text: body.trim().to_string(),
            language: None,
            duration: None,
            segments: Vec::new(),
        }),
        Err(e) => Err(TranscriptionError::MalformedResponse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_table_covers_known_extensions() {
        assert_eq!(content_type_for("visit.wav"), "audio/wav");
        assert_eq!(content_type_for("visit.MP3"), "audio/mpeg");
        assert_eq!(content_type_for("visit.m4a"), "audio/mp4");
        assert_eq!(content_type_for("visit.ogg"), "audio/ogg");
        assert_eq!(content_type_for("visit.flac"), "audio/flac");
    }

    #[test]
    fn unknown_extension_falls_back_to_webm() {
        assert_eq!(content_type_for("visit.aiff"), "audio/webm");
        assert_eq!(content_type_for("no_extension"), "audio/webm");
    }

    #[test]
    fn parses_text_only_shape() {
        let raw = parse_response_body(r#"{"text": "hello there", "language": "en"}"#).unwrap();
        assert_eq!(raw.text, "hello there");
        assert_eq!(raw.language.as_deref(), Some("en"));
        assert!(raw.segments.is_empty());
    }

    #[test]
    fn parses_timestamped_shape_without_speakers() {
        let body = r#"{
            "text": "hello there general",
            "duration": 4.0,
            "segments": [
                {"text": "hello there", "start": 0.0, "end": 2.0},
                {"text": "general", "start": 2.0, "end": 4.0, "confidence": 0.8}
            ]
        }"#;
        let raw = parse_response_body(body).unwrap();
        assert_eq!(raw.segments.len(), 2);
        assert!(raw.segments[0].speaker.is_none());
        assert_eq!(raw.segments[1].confidence, Some(0.8));
    }

    #[test]
    fn parses_diarized_shape() {
        let body = r#"{
            "segments": [
                {"speaker": "A", "text": "how are you", "start": 0.0, "end": 1.5},
                {"speaker": "B", "text": "fine thanks", "start": 1.6, "end": 3.0}
            ]
        }"#;
        let raw = parse_response_body(body).unwrap();
        assert_eq!(raw.text, "how are you fine thanks");
        assert_eq!(raw.segments[0].speaker.as_deref(), Some("A"));
    }

    #[test]
    fn plain_text_body_accepted_as_transcript() {
        let raw = parse_response_body("just a raw transcript line").unwrap();
        assert_eq!(raw.text, "just a raw transcript line");
        assert!(raw.segments.is_empty());
    }

    #[test]
    fn empty_body_is_malformed() {
        assert!(parse_response_body("").is_err());
        assert!(parse_response_body(r#"{"segments": []}"#).is_err());
    }
}
