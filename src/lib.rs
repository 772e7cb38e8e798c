//! Ambient clinical documentation: encounter audio in, a structured and
//! de-identified clinical note out.
//!
//! The stages, in order: transcription (provider-backed with a deterministic
//! mock fallback), speaker role classification, PHI redaction of everything
//! leaving the process, LLM note generation, and normalization into a
//! [`note::ClinicalNote`] that always upholds its invariants regardless of
//! how messy the provider response was.
//!
//! [`pipeline::DocumentationPipeline`] wires the stages together; each module
//! is also usable on its own.

pub mod config;
pub mod note;
pub mod phi;
pub mod pipeline;
pub mod retry;
pub mod roles;
pub mod transcription;

pub use config::PipelineConfig;
pub use note::{ClinicalNote, ExtractedData, NoteGenerator};
pub use phi::{detect_phi, redact_phi, sanitize_outbound};
pub use pipeline::{DocumentationPipeline, EncounterBundle};
pub use transcription::{AudioSource, TranscriptionAdapter, TranscriptionResult};

use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber honoring `RUST_LOG`. Call once from
/// the hosting binary before constructing a pipeline.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clinscribe=info")),
        )
        .init();
}
