//! Prompt construction for note generation.
//!
//! Either the fixed default SOAP-note JSON-schema prompt, or a configurable
//! template with `{{variable}}` substitution. Unknown variables are left
//! intact so a template author can spot them in the output.

use serde::{Deserialize, Serialize};

/// System prompt for the default SOAP template.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a clinical documentation assistant. From the encounter transcript \
you produce a structured SOAP-style note as a single JSON object. Use ONLY \
information present in the transcript. Never invent findings, medications, \
or history. Every confidence value is a number between 0 and 1.";

/// JSON schema the default prompt instructs the model to fill.
const DEFAULT_SCHEMA: &str = r#"{
  "chiefComplaint": "string",
  "hpi": "string",
  "ros": "string",
  "physicalExam": "string",
  "assessment": "string",
  "plan": "string",
  "sectionConfidence": {"chiefComplaint": 0.0, "hpi": 0.0, "ros": 0.0, "physicalExam": 0.0, "assessment": 0.0, "plan": 0.0},
  "differentialDiagnoses": [{"condition": "string", "icd10": "string", "confidence": 0.0, "reasoning": "string"}],
  "recommendedTests": [{"name": "string", "urgency": "routine|soon|urgent", "reason": "string", "confidence": 0.0}],
  "suggestedIcd10": [{"code": "string", "description": "string", "confidence": 0.0}],
  "suggestedCpt": [{"code": "string", "description": "string", "confidence": 0.0}],
  "medications": [{"name": "string", "dosage": "string", "frequency": "string", "confidence": 0.0}],
  "allergies": [{"allergen": "string", "reaction": "string", "severity": "string", "confidence": 0.0}],
  "followUpTasks": [{"task": "string", "dueDate": "YYYY-MM-DD", "priority": "low|medium|high"}],
  "patientSummary": {"summary": "string", "yourConcerns": ["string"], "nextSteps": "string", "followUp": "string"}
}"#;

/// Default generation parameters.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 4_096;

/// Build the default SOAP prompt for a (already PHI-masked) transcript.
pub fn default_note_prompt(masked_transcript: &str) -> String {
    format!(
        "Produce the clinical note for the following encounter transcript.\n\
         Respond with exactly one JSON object matching this schema, and \
         nothing else:\n\n{DEFAULT_SCHEMA}\n\nTRANSCRIPT:\n{masked_transcript}"
    )
}

/// Variables available for template substitution.
#[derive(Debug, Clone, Default)]
pub struct PromptVars {
    pub transcript: String,
    pub patient_name: Option<String>,
    pub date: Option<String>,
}

/// A configurable prompt template with provider-declared output sections
/// and generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    /// Body with `{{transcript}}`, `{{patientName}}`, `{{date}}` markers.
    pub template: String,
    /// Section names the template asks the provider to emit.
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl PromptTemplate {
    /// Substitute known variables. Unknown `{{markers}}` stay as-is.
    pub fn render(&self, vars: &PromptVars) -> String {
        let mut out = self.template.clone();
        out = out.replace("{{transcript}}", &vars.transcript);
        if let Some(name) = &vars.patient_name {
            out = out.replace("{{patientName}}", name);
        }
        if let Some(date) = &vars.date {
            out = out.replace("{{date}}", date);
        }
        out
    }
}
