//! Doctor/patient partitioning of transcript segments.
//!
//! Upstream adapters do not always emit canonical speaker tags, so tag
//! matching gets an alternating-turn fallback: when no tag is recognized at
//! all, even-indexed segments go to the doctor and odd ones to the patient.

use crate::transcription::TranscriptionSegment;

/// Ordered statement lists per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleStatements {
    pub doctor: Vec<String>,
    pub patient: Vec<String>,
}

/// Tag conventions covering providers and common shorthand.
const DOCTOR_TAGS: &[&str] = &[
    "speaker_0",
    "doctor",
    "provider",
    "dr",
    "dr.",
    "md",
    "physician",
    "clinician",
];

const PATIENT_TAGS: &[&str] = &["speaker_1", "patient", "pt", "client"];

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

fn matches_any(tag: &str, conventions: &[&str]) -> bool {
    conventions
        .iter()
        .any(|c| tag == *c || tag.starts_with(&format!("{c} ")))
}

/// Partition segments into doctor and patient statements.
///
/// Primary rule: normalized speaker-tag matching against the role
/// conventions. Fallback: if neither list could be populated from tags,
/// alternate by index starting with the doctor.
pub fn classify_statements(segments: &[TranscriptionSegment]) -> RoleStatements {
    let mut statements = RoleStatements::default();

    for segment in segments {
        let tag = normalize_tag(&segment.speaker);
        if matches_any(&tag, DOCTOR_TAGS) {
            statements.doctor.push(segment.text.clone());
        } else if matches_any(&tag, PATIENT_TAGS) {
            statements.patient.push(segment.text.clone());
        }
    }

    if statements.doctor.is_empty() && statements.patient.is_empty() && !segments.is_empty() {
        tracing::debug!(
            segments = segments.len(),
            "no recognized speaker tags, alternating by index"
        );
        for (index, segment) in segments.iter().enumerate() {
            if index % 2 == 0 {
                statements.doctor.push(segment.text.clone());
            } else {
                statements.patient.push(segment.text.clone());
            }
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(speaker: &str, text: &str) -> TranscriptionSegment {
        TranscriptionSegment {
            speaker: speaker.into(),
            text: text.into(),
            start_secs: 0.0,
            end_secs: 1.0,
            confidence: 0.9,
        }
    }

    #[test]
    fn canonical_speaker_ids_partition() {
        let statements = classify_statements(&[
            segment("speaker_0", "what brings you in"),
            segment("speaker_1", "a rash on my arm"),
            segment("speaker_0", "how long"),
        ]);
        assert_eq!(statements.doctor.len(), 2);
        assert_eq!(statements.patient, vec!["a rash on my arm"]);
    }

    #[test]
    fn named_conventions_partition() {
        let statements = classify_statements(&[
            segment("Doctor", "any allergies"),
            segment("Patient", "penicillin"),
            segment("DR. Lee", "noted"),
            segment("pt", "thanks"),
        ]);
        assert_eq!(statements.doctor.len(), 2);
        assert_eq!(statements.patient.len(), 2);
    }

    #[test]
    fn unknown_tags_alternate_starting_with_doctor() {
        let statements = classify_statements(&[
            segment("X", "first"),
            segment("X", "second"),
            segment("X", "third"),
            segment("X", "fourth"),
        ]);
        assert_eq!(statements.doctor, vec!["first", "third"]);
        assert_eq!(statements.patient, vec!["second", "fourth"]);
    }

    #[test]
    fn partial_tag_match_disables_fallback() {
        // One recognized doctor tag means unrecognized tags are just dropped,
        // not alternated.
        let statements = classify_statements(&[
            segment("doctor", "hello"),
            segment("mystery", "who am i"),
        ]);
        assert_eq!(statements.doctor, vec!["hello"]);
        assert!(statements.patient.is_empty());
    }

    #[test]
    fn empty_segments_yield_empty_statements() {
        let statements = classify_statements(&[]);
        assert!(statements.doctor.is_empty());
        assert!(statements.patient.is_empty());
    }
}
