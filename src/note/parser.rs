//! Parse-then-validate for provider note responses.
//!
//! Providers are instructed to return a single JSON object, optionally
//! wrapped in code fences. Arrays are parsed leniently (a malformed item is
//! skipped, not fatal), but a response with no usable narrative section at
//! all is a parse failure, which routes the pipeline to the mock generator.

use serde::Deserialize;
use serde_json::Value;

use super::NoteError;

/// Loosely-typed note as the provider returned it. Confidences stay as raw
/// JSON values; the normalizer owns coercion.
#[derive(Debug, Default)]
pub struct RawNote {
    pub chief_complaint: Option<String>,
    pub hpi: Option<String>,
    pub ros: Option<String>,
    pub physical_exam: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub section_confidence: Option<RawSectionConfidence>,
    pub differential_diagnoses: Vec<RawDifferential>,
    pub recommended_tests: Vec<RawTest>,
    pub suggested_icd10: Vec<RawCode>,
    pub suggested_cpt: Vec<RawCode>,
    pub medications: Vec<RawMedication>,
    pub allergies: Vec<RawAllergy>,
    pub follow_up_tasks: Vec<RawTask>,
    pub patient_summary: Option<RawPatientSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSectionConfidence {
    pub chief_complaint: Option<Value>,
    pub hpi: Option<Value>,
    pub ros: Option<Value>,
    pub physical_exam: Option<Value>,
    pub assessment: Option<Value>,
    pub plan: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDifferential {
    #[serde(alias = "name")]
    pub condition: String,
    #[serde(default, alias = "icd10Code", alias = "icdCode")]
    pub icd10: Option<String>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTest {
    #[serde(alias = "test")]
    pub name: String,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCode {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confidence: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMedication {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub confidence: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAllergy {
    #[serde(alias = "name")]
    pub allergen: String,
    #[serde(default)]
    pub reaction: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub confidence: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    #[serde(alias = "description")]
    pub task: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPatientSummary {
    pub summary: Option<String>,
    pub your_concerns: Vec<String>,
    pub next_steps: Option<String>,
    pub follow_up: Option<String>,
}

/// Wire mirror: arrays kept as raw values for lenient per-item parsing.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireNote {
    chief_complaint: Option<String>,
    hpi: Option<String>,
    ros: Option<String>,
    physical_exam: Option<String>,
    assessment: Option<String>,
    plan: Option<String>,
    section_confidence: Option<RawSectionConfidence>,
    differential_diagnoses: Option<Vec<Value>>,
    recommended_tests: Option<Vec<Value>>,
    suggested_icd10: Option<Vec<Value>>,
    suggested_cpt: Option<Vec<Value>>,
    medications: Option<Vec<Value>>,
    allergies: Option<Vec<Value>>,
    follow_up_tasks: Option<Vec<Value>>,
    patient_summary: Option<RawPatientSummary>,
}

/// Parse a provider response into a [`RawNote`].
///
/// Fails when the body (after fence stripping) is not a JSON object, or
/// when no narrative section came through. Either way the caller degrades
/// to the mock generator rather than retrying the network.
pub fn parse_note_response(response: &str) -> Result<RawNote, NoteError> {
    let cleaned = strip_code_fences(response);
    let wire: WireNote = serde_json::from_str(cleaned)
        .map_err(|e| NoteError::Parse(format!("invalid note JSON: {e}")))?;

    let note = RawNote {
        chief_complaint: wire.chief_complaint,
        hpi: wire.hpi,
        ros: wire.ros,
        physical_exam: wire.physical_exam,
        assessment: wire.assessment,
        plan: wire.plan,
        section_confidence: wire.section_confidence,
        differential_diagnoses: parse_array_lenient(wire.differential_diagnoses.as_deref()),
        recommended_tests: parse_array_lenient(wire.recommended_tests.as_deref()),
        suggested_icd10: parse_array_lenient(wire.suggested_icd10.as_deref()),
        suggested_cpt: parse_array_lenient(wire.suggested_cpt.as_deref()),
        medications: parse_array_lenient(wire.medications.as_deref()),
        allergies: parse_array_lenient(wire.allergies.as_deref()),
        follow_up_tasks: parse_array_lenient(wire.follow_up_tasks.as_deref()),
        patient_summary: wire.patient_summary,
    };

    let has_narrative = [
        &note.chief_complaint,
        &note.hpi,
        &note.ros,
        &note.physical_exam,
        &note.assessment,
        &note.plan,
    ]
    .iter()
    .any(|s| s.as_deref().is_some_and(|v| !v.trim().is_empty()));

    if !has_narrative {
        return Err(NoteError::Parse(
            "response contains no narrative sections".into(),
        ));
    }

    Ok(note)
}

/// Strip an optional ``` / ```json fence pair around the JSON body.
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(fence_start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[fence_start + 3..];
    // Skip a language tag like "json" up to the first newline.
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse an array leniently, skipping items that fail to deserialize.
fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: Option<&[Value]>) -> Vec<T> {
    match items {
        None => Vec::new(),
        Some(values) => values
            .iter()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json_object() {
        let note = parse_note_response(
            r#"{"chiefComplaint": "rash", "assessment": "contact dermatitis"}"#,
        )
        .unwrap();
        assert_eq!(note.chief_complaint.as_deref(), Some("rash"));
        assert_eq!(note.assessment.as_deref(), Some("contact dermatitis"));
    }

    #[test]
    fn parses_fenced_json() {
        let response = "Here is the note:\n```json\n{\"hpi\": \"two week history\"}\n```\n";
        let note = parse_note_response(response).unwrap();
        assert_eq!(note.hpi.as_deref(), Some("two week history"));
    }

    #[test]
    fn parses_fence_without_language_tag() {
        let response = "```\n{\"plan\": \"topical steroid\"}\n```";
        let note = parse_note_response(response).unwrap();
        assert_eq!(note.plan.as_deref(), Some("topical steroid"));
    }

    #[test]
    fn non_json_is_parse_error() {
        assert!(parse_note_response("I could not generate a note today.").is_err());
    }

    #[test]
    fn empty_object_is_parse_error() {
        assert!(parse_note_response("{}").is_err());
    }

    #[test]
    fn lenient_arrays_skip_bad_items() {
        let response = r#"{
            "assessment": "ok",
            "differentialDiagnoses": [
                {"condition": "Contact dermatitis", "icd10": "L23.9", "confidence": 0.6},
                {"nonsense": true},
                {"name": "Atopic dermatitis", "confidence": "0.3"}
            ]
        }"#;
        let note = parse_note_response(response).unwrap();
        assert_eq!(note.differential_diagnoses.len(), 2);
        assert_eq!(note.differential_diagnoses[0].condition, "Contact dermatitis");
        // "name" alias accepted
        assert_eq!(note.differential_diagnoses[1].condition, "Atopic dermatitis");
    }

    #[test]
    fn loose_confidence_values_survive_parsing() {
        let response = r#"{
            "assessment": "ok",
            "recommendedTests": [{"name": "patch test", "confidence": "high"}]
        }"#;
        let note = parse_note_response(response).unwrap();
        assert_eq!(note.recommended_tests.len(), 1);
        assert!(note.recommended_tests[0].confidence.is_some());
    }

    #[test]
    fn section_confidence_tolerates_partial_keys() {
        let response = r#"{
            "chiefComplaint": "rash",
            "sectionConfidence": {"chiefComplaint": 90, "plan": 0.7}
        }"#;
        let note = parse_note_response(response).unwrap();
        let confidence = note.section_confidence.unwrap();
        assert!(confidence.chief_complaint.is_some());
        assert!(confidence.hpi.is_none());
    }
}
