//! End-to-end encounter documentation.
//!
//! Coordinates: transcribe → classify roles → generate note → normalize.
//! One invocation per recording; no state survives between invocations, so
//! concurrent encounters proceed with independent retry clocks and may
//! complete in any order. Cancellation is the caller's job; aborting the
//! in-flight HTTP request surfaces as a non-retryable failure, which lands
//! on the mock fallback rather than retrying forever.

use crate::config::PipelineConfig;
use crate::note::{ClinicalNote, ExtractedData, NoteGenerator, PromptTemplate};
use crate::roles::{classify_statements, RoleStatements};
use crate::transcription::{AudioSource, TranscriptionAdapter, TranscriptionResult};

/// Everything one pipeline invocation hands back to the caller.
/// Persistence, HTTP shaping, and audit logging happen upstream.
#[derive(Debug, Clone)]
pub struct EncounterBundle {
    pub transcription: TranscriptionResult,
    pub statements: RoleStatements,
    pub note: ClinicalNote,
    pub extracted: ExtractedData,
}

/// The ambient documentation pipeline. Construct once per configuration;
/// each `process` call is independent.
pub struct DocumentationPipeline {
    transcription: TranscriptionAdapter,
    notes: NoteGenerator,
}

impl DocumentationPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            transcription: TranscriptionAdapter::new(config),
            notes: NoteGenerator::new(config),
        }
    }

    /// Document one recorded encounter end to end.
    pub async fn process(
        &self,
        audio: &AudioSource,
        duration_hint_secs: f64,
        template: Option<&PromptTemplate>,
    ) -> EncounterBundle {
        // Step 1: transcribe (provider or mock, always well-formed)
        let transcription = self.transcription.transcribe(audio, duration_hint_secs).await;
        tracing::info!(
            segments = transcription.segments.len(),
            phi_entities = transcription.phi_entities.len(),
            duration_secs = transcription.duration_secs,
            "transcription complete"
        );

        // Step 2: partition statements by speaker role
        let statements = classify_statements(&transcription.segments);

        // Step 3: generate + normalize the note
        let (note, extracted) = self
            .notes
            .generate(&transcription.text, &transcription.segments, template)
            .await;
        tracing::info!(
            model = %note.model_used,
            overall_confidence = note.overall_confidence,
            differentials = note.differential_diagnoses.len(),
            "note generated"
        );

        EncounterBundle {
            transcription,
            statements,
            note,
            extracted,
        }
    }

    /// Generate a note for an existing transcript, skipping transcription.
    pub async fn note_from_transcript(
        &self,
        transcript: &str,
        segments: &[crate::transcription::TranscriptionSegment],
        template: Option<&PromptTemplate>,
    ) -> (ClinicalNote, ExtractedData) {
        self.notes.generate(transcript, segments, template).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_pipeline() -> DocumentationPipeline {
        DocumentationPipeline::new(&PipelineConfig::mock_only())
    }

    #[tokio::test]
    async fn end_to_end_mock_encounter() {
        let pipeline = mock_pipeline();
        let audio = AudioSource::new(vec![0u8; 32], "visit.wav");
        let bundle = pipeline.process(&audio, 120.0, None).await;

        // Transcription is well-formed
        assert!(!bundle.transcription.text.is_empty());
        assert!(!bundle.transcription.segments.is_empty());
        assert!((bundle.transcription.duration_secs - 120.0).abs() < f64::EPSILON);

        // Both roles got statements
        assert!(!bundle.statements.doctor.is_empty());
        assert!(!bundle.statements.patient.is_empty());

        // The note upholds its invariants
        let sum: f64 = bundle
            .note
            .differential_diagnoses
            .iter()
            .map(|d| d.confidence)
            .sum();
        assert!((sum - 1.0).abs() < 1e-3);
        assert!(bundle.note.overall_confidence > 0.0 && bundle.note.overall_confidence < 1.0);
    }

    #[tokio::test]
    async fn detergent_scenario_produces_expected_note() {
        let pipeline = mock_pipeline();
        let transcript = "I've had a rash for two weeks since I used a new detergent. \
                          It itches constantly. No fever. I'm allergic to penicillin.";
        let (note, extracted) = pipeline.note_from_transcript(transcript, &[], None).await;

        assert!(note.assessment.contains("L23.9"));
        assert!(extracted.allergies.iter().any(|a| a.allergen == "Penicillin"));
        assert!(note
            .patient_summary
            .your_concerns
            .contains(&"Rash".to_string()));
    }

    #[tokio::test]
    async fn concurrent_invocations_are_independent() {
        let pipeline = std::sync::Arc::new(mock_pipeline());
        let mut handles = Vec::new();
        for i in 0..4u32 {
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                let audio = AudioSource::new(vec![0u8; 8], "visit.webm");
                pipeline.process(&audio, 30.0 + f64::from(i), None).await
            }));
        }
        for handle in handles {
            let bundle = handle.await.unwrap();
            assert!(!bundle.note.differential_diagnoses.is_empty());
        }
    }

    #[tokio::test]
    async fn zero_mock_latency_is_fast_and_valid() {
        let pipeline = mock_pipeline();
        let started = std::time::Instant::now();
        let audio = AudioSource::new(vec![0u8; 8], "visit.mp3");
        let bundle = pipeline.process(&audio, 45.0, None).await;
        assert!(started.elapsed() < std::time::Duration::from_millis(250));
        assert!(!bundle.transcription.segments.is_empty());
        assert!(!bundle.note.recommended_tests.is_empty());
    }
}
