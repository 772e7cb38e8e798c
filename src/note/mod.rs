//! Clinical note generation.
//!
//! A structured SOAP-style prompt goes to a chat provider (Anthropic
//! preferred, then OpenAI, then the deterministic mock); the loosely-typed
//! response is parsed, then normalized into a strict, confidence-scored
//! [`ClinicalNote`] + [`ExtractedData`]. Parse failures degrade to the mock
//! generator, so the caller always receives a well-formed note.

pub mod generator;
pub mod mock_note;
pub mod normalize;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod types;

pub use generator::NoteGenerator;
pub use prompt::{PromptTemplate, PromptVars};
pub use provider::NoteBackend;
pub use types::{
    AllergyEntry, ClinicalNote, CodeSuggestion, DifferentialDiagnosis, ExtractedData,
    FollowUpTask, MedicationEntry, PatientSummary, RecommendedTest, SectionConfidence,
    TaskPriority, TestUrgency,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("provider call failed: {0}")]
    Provider(#[from] crate::retry::ProviderError),

    #[error("response is not parseable as a note: {0}")]
    Parse(String),
}
