//! Speech-to-text adapter: provider call, speaker attribution, PHI scan.
//!
//! The adapter never surfaces a provider failure to the caller: once retries
//! exhaust it degrades to a deterministic mock conversation, so downstream
//! stages always see a well-formed, non-empty transcript.

pub mod adapter;
pub mod mock;
pub mod provider;
pub mod speakers;
pub mod types;

pub use adapter::TranscriptionAdapter;
pub use types::{
    AudioSource, SpeakerInfo, SpeakerRole, TranscriptionResult, TranscriptionSegment,
};

use thiserror::Error;

/// Internal transcription failures. These never escape the adapter; they
/// route the call onto the mock fallback path.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("provider call failed: {0}")]
    Provider(#[from] crate::retry::ProviderError),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}
