use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::phi::PhiEntity;

/// One-shot audio payload. The caller owns the file read; nothing here
/// outlives the transcription call.
#[derive(Debug, Clone)]
pub struct AudioSource {
    pub bytes: Vec<u8>,
    /// Original file name; the extension drives content-type inference.
    pub file_name: String,
}

impl AudioSource {
    pub fn new(bytes: Vec<u8>, file_name: &str) -> Self {
        Self {
            bytes,
            file_name: file_name.to_string(),
        }
    }
}

/// Inferred role of a speaker in the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    Doctor,
    Patient,
    Unknown,
}

/// Per-speaker metadata, built once per transcription call and immutable
/// afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerInfo {
    pub role: SpeakerRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SpeakerInfo {
    pub fn doctor() -> Self {
        Self {
            role: SpeakerRole::Doctor,
            display_name: None,
        }
    }

    pub fn patient() -> Self {
        Self {
            role: SpeakerRole::Patient,
            display_name: None,
        }
    }
}

/// A time-aligned utterance. The sequence is time-monotonic by convention
/// but not enforced; downstream consumers treat it as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionSegment {
    pub speaker: String,
    pub text: String,
    pub start_secs: f64,
    pub end_secs: f64,
    pub confidence: f64,
}

/// Everything the transcription stage hands downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    /// Full transcript text (not PHI-masked; `phi_entities` locates spans).
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
    /// Stable `speaker_N` ids to role metadata.
    pub speakers: BTreeMap<String, SpeakerInfo>,
    /// PHI found in `text`; recomputed on every call.
    pub phi_entities: Vec<PhiEntity>,
    pub language: String,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_serializes_camel_case() {
        let segment = TranscriptionSegment {
            speaker: "speaker_0".into(),
            text: "hello".into(),
            start_secs: 0.0,
            end_secs: 1.5,
            confidence: 0.9,
        };
        let json = serde_json::to_string(&segment).unwrap();
        assert!(json.contains("\"startSecs\""));
        assert!(json.contains("\"endSecs\""));
    }

    #[test]
    fn speaker_info_omits_missing_display_name() {
        let json = serde_json::to_string(&SpeakerInfo::doctor()).unwrap();
        assert!(!json.contains("displayName"));
        assert!(json.contains("\"doctor\""));
    }
}
