//! Strict output schema for the note-generation stage.
//!
//! Providers return loosely-structured JSON; everything here is what the
//! normalizer guarantees to the rest of the system.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The six canonical narrative sections, one confidence each. Having a
/// struct rather than a map is what makes "exactly six keys" a type-level
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfidence {
    pub chief_complaint: f64,
    pub hpi: f64,
    pub ros: f64,
    pub physical_exam: f64,
    pub assessment: f64,
    pub plan: f64,
}

impl SectionConfidence {
    pub fn uniform(value: f64) -> Self {
        Self {
            chief_complaint: value,
            hpi: value,
            ros: value,
            physical_exam: value,
            assessment: value,
            plan: value,
        }
    }

    /// Arithmetic mean of the six sections.
    pub fn mean(&self) -> f64 {
        (self.chief_complaint
            + self.hpi
            + self.ros
            + self.physical_exam
            + self.assessment
            + self.plan)
            / 6.0
    }
}

/// A ranked candidate condition with supporting reasoning and billing code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifferentialDiagnosis {
    pub condition: String,
    pub icd10: String,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestUrgency {
    #[default]
    Routine,
    Soon,
    Urgent,
}

impl TestUrgency {
    /// Coerce a provider string; anything unrecognized is routine.
    pub fn coerce(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "urgent" | "stat" | "immediate" => Self::Urgent,
            "soon" | "prompt" => Self::Soon,
            _ => Self::Routine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedTest {
    pub name: String,
    pub urgency: TestUrgency,
    pub reason: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn coerce(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "high" | "urgent" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpTask {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
}

/// Patient-friendly digest of the encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub summary: String,
    pub your_concerns: Vec<String>,
    pub next_steps: String,
    pub follow_up: String,
}

/// The normalized clinical note handed to the rest of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalNote {
    pub chief_complaint: String,
    pub hpi: String,
    pub ros: String,
    pub physical_exam: String,
    pub assessment: String,
    pub plan: String,
    /// Mean of the six section confidences.
    pub overall_confidence: f64,
    pub section_confidence: SectionConfidence,
    /// Confidences sum to 1.0 (± rounding), length ≤ 5, sorted descending.
    pub differential_diagnoses: Vec<DifferentialDiagnosis>,
    pub recommended_tests: Vec<RecommendedTest>,
    pub patient_summary: PatientSummary,
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSuggestion {
    pub code: String,
    pub description: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergyEntry {
    pub allergen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    pub confidence: f64,
}

/// Side-channel structured findings, independent of the narrative sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub suggested_icd10: Vec<CodeSuggestion>,
    pub suggested_cpt: Vec<CodeSuggestion>,
    pub medications: Vec<MedicationEntry>,
    pub allergies: Vec<AllergyEntry>,
    pub follow_up_tasks: Vec<FollowUpTask>,
}
