//! Speaker attribution for provider responses.
//!
//! Diarized responses get their raw tokens mapped to stable `speaker_N` ids.
//! Undiarized timestamped responses get a turn-taking heuristic: long pauses
//! and questions flip the current speaker, and clinical vocabulary early in
//! the conversation pins a segment to the doctor. This is a heuristic, not a
//! diarization model; accuracy is best-effort.

use std::collections::BTreeMap;

use super::provider::RawSegment;
use super::types::{SpeakerInfo, SpeakerRole, TranscriptionSegment};

/// Inter-segment pause that suggests the other party started talking.
const PAUSE_FLIP_THRESHOLD_SECS: f64 = 2.0;

/// Default per-segment confidence when the provider reports none.
const DEFAULT_SEGMENT_CONFIDENCE: f64 = 0.9;

/// Lowercase substrings that mark clinician speech.
const CLINICAL_VOCABULARY: &[&str] = &[
    "examin",
    "prescri",
    "diagnos",
    "symptom",
    "medication",
    "blood pressure",
    "history",
    "allergi",
];

fn contains_clinical_vocabulary(text: &str) -> bool {
    let lower = text.to_lowercase();
    CLINICAL_VOCABULARY.iter().any(|term| lower.contains(term))
}

/// Heuristic speaker assignment for timestamped segments without
/// diarization (response shape b).
///
/// Starts with the doctor speaker; flips on a pause longer than the
/// threshold or after a question; a segment in the first third of the
/// conversation containing clinical vocabulary is force-assigned to the
/// doctor.
pub fn assign_speakers_heuristic(
    raw: &[RawSegment],
) -> (Vec<TranscriptionSegment>, BTreeMap<String, SpeakerInfo>) {
    let total_secs = raw.iter().fold(0.0_f64, |acc, s| acc.max(s.end));
    let first_third_secs = total_secs / 3.0;

    let mut current = 0usize;
    let mut segments = Vec::with_capacity(raw.len());

    for (index, segment) in raw.iter().enumerate() {
        if index > 0 {
            let previous = &raw[index - 1];
            let gap = segment.start - previous.end;
            let question = previous.text.trim_end().ends_with('?');
            if gap > PAUSE_FLIP_THRESHOLD_SECS || question {
                current = 1 - current;
            }
        }
        if segment.start < first_third_secs && contains_clinical_vocabulary(&segment.text) {
            current = 0;
        }
        segments.push(TranscriptionSegment {
            speaker: format!("speaker_{current}"),
            text: segment.text.trim().to_string(),
            start_secs: segment.start,
            end_secs: segment.end,
            confidence: segment.confidence.unwrap_or(DEFAULT_SEGMENT_CONFIDENCE),
        });
    }

    let speakers = speaker_map_for(&segments);
    (segments, speakers)
}

/// Map diarized provider tokens to stable `speaker_N` ids in order of
/// first appearance (response shape c). The first id is labeled doctor,
/// subsequent ones patient.
pub fn map_diarized_speakers(
    raw: &[RawSegment],
) -> (Vec<TranscriptionSegment>, BTreeMap<String, SpeakerInfo>) {
    let mut token_ids: Vec<String> = Vec::new();
    let mut segments = Vec::with_capacity(raw.len());
    let mut speakers = BTreeMap::new();

    for segment in raw {
        let token = segment.speaker.clone().unwrap_or_else(|| "unknown".into());
        let position = match token_ids.iter().position(|t| *t == token) {
            Some(position) => position,
            None => {
                token_ids.push(token.clone());
                let position = token_ids.len() - 1;
                let mut info = if position == 0 {
                    SpeakerInfo::doctor()
                } else {
                    SpeakerInfo::patient()
                };
                let id = format!("speaker_{position}");
                if token != id {
                    info.display_name = Some(token.clone());
                }
                speakers.insert(id, info);
                position
            }
        };
        segments.push(TranscriptionSegment {
            speaker: format!("speaker_{position}"),
            text: segment.text.trim().to_string(),
            start_secs: segment.start,
            end_secs: segment.end,
            confidence: segment.confidence.unwrap_or(DEFAULT_SEGMENT_CONFIDENCE),
        });
    }

    (segments, speakers)
}

/// Build the speaker map from assigned segment ids: `speaker_0` is the
/// doctor, anything else the patient.
pub fn speaker_map_for(segments: &[TranscriptionSegment]) -> BTreeMap<String, SpeakerInfo> {
    let mut speakers = BTreeMap::new();
    for segment in segments {
        speakers.entry(segment.speaker.clone()).or_insert_with(|| {
            if segment.speaker == "speaker_0" {
                SpeakerInfo::doctor()
            } else {
                SpeakerInfo::patient()
            }
        });
    }
    speakers
}
