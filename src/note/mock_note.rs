//! Deterministic mock note generation.
//!
//! Canned clinical logic keyed on transcript keywords. The output is a
//! [`RawNote`] fed through the same normalizer as real provider output, so
//! every downstream invariant holds on the mock path too.

use chrono::{Duration, Utc};
use serde_json::json;

use super::parser::{
    RawAllergy, RawDifferential, RawMedication, RawNote, RawSectionConfidence, RawTask, RawTest,
};

/// Allergens the mock recognizes in phrases like "allergic to penicillin".
const KNOWN_ALLERGENS: &[&str] = &["penicillin", "sulfa", "latex", "aspirin", "codeine"];

/// Build a clinically plausible raw note from the transcript.
pub fn mock_raw_note(transcript: &str) -> RawNote {
    let lower = transcript.to_lowercase();

    let mut note = if lower.contains("detergent") || lower.contains("rash") {
        dermatitis_note()
    } else if lower.contains("cough") || lower.contains("congestion") {
        respiratory_note()
    } else {
        generic_note()
    };

    if lower.contains("allerg") {
        for allergen in KNOWN_ALLERGENS {
            if lower.contains(allergen) {
                note.allergies.push(RawAllergy {
                    allergen: capitalize(allergen),
                    reaction: None,
                    severity: Some("unknown".into()),
                    confidence: Some(json!(0.85)),
                });
            }
        }
    }

    note
}

fn dermatitis_note() -> RawNote {
    let due = (Utc::now().date_naive() + Duration::days(14))
        .format("%Y-%m-%d")
        .to_string();

    RawNote {
        chief_complaint: Some("Rash, approximately two weeks duration".into()),
        hpi: Some(
            "Patient reports a pruritic rash beginning roughly two weeks ago, \
             temporally associated with a change in laundry detergent. Itching is \
             worse at night. No systemic symptoms reported."
                .into(),
        ),
        ros: Some(
            "Skin: positive for rash and pruritus. Constitutional: denies fever \
             or chills. All other systems reviewed and negative."
                .into(),
        ),
        physical_exam: Some(
            "Erythematous, mildly scaly eruption over exposed areas consistent \
             with contact exposure pattern. No vesicles, no secondary infection."
                .into(),
        ),
        assessment: Some(
            "Contact dermatitis (L23.9), likely allergic reaction to new laundry \
             detergent. Differential includes atopic dermatitis and urticaria."
                .into(),
        ),
        plan: Some(
            "Discontinue the new detergent and rewash exposed clothing. Start \
             topical corticosteroid twice daily for two weeks. Oral antihistamine \
             at night for pruritus. Return if worsening or no improvement."
                .into(),
        ),
        section_confidence: Some(section_confidence(0.85)),
        differential_diagnoses: vec![
            RawDifferential {
                condition: "Contact dermatitis".into(),
                icd10: Some("L23.9".into()),
                confidence: Some(json!(0.6)),
                reasoning: Some("New detergent exposure preceding a pruritic rash".into()),
            },
            RawDifferential {
                condition: "Atopic dermatitis".into(),
                icd10: Some("L20.9".into()),
                confidence: Some(json!(0.25)),
                reasoning: Some("Pruritic eruption; consider if history of atopy".into()),
            },
            RawDifferential {
                condition: "Urticaria".into(),
                icd10: Some("L50.9".into()),
                confidence: Some(json!(0.15)),
                reasoning: Some("Pruritus with possible allergic trigger".into()),
            },
        ],
        recommended_tests: vec![RawTest {
            name: "Patch testing".into(),
            urgency: Some("routine".into()),
            reason: Some("Identify contact allergen if rash persists after avoidance".into()),
            confidence: Some(json!(0.6)),
        }],
        suggested_icd10: vec![super::parser::RawCode {
            code: "L23.9".into(),
            description: Some("Allergic contact dermatitis, unspecified cause".into()),
            confidence: Some(json!(0.6)),
        }],
        suggested_cpt: vec![super::parser::RawCode {
            code: "99213".into(),
            description: Some("Office visit, established patient, low complexity".into()),
            confidence: Some(json!(0.7)),
        }],
        medications: vec![RawMedication {
            name: "Hydrocortisone 1% cream".into(),
            dosage: Some("apply thin layer".into()),
            frequency: Some("twice daily".into()),
            confidence: Some(json!(0.7)),
        }],
        allergies: Vec::new(),
        follow_up_tasks: vec![RawTask {
            task: "Re-evaluate rash if not improved".into(),
            due_date: Some(due),
            priority: Some("medium".into()),
        }],
        patient_summary: None,
    }
}

fn respiratory_note() -> RawNote {
    RawNote {
        chief_complaint: Some("Cough and congestion".into()),
        hpi: Some(
            "Patient reports several days of cough and nasal congestion without \
             shortness of breath or chest pain."
                .into(),
        ),
        ros: Some("Respiratory: positive cough. Denies dyspnea, fever resolved.".into()),
        physical_exam: Some("Lungs clear to auscultation. Oropharynx mildly erythematous.".into()),
        assessment: Some("Upper respiratory infection (J06.9), likely viral.".into()),
        plan: Some(
            "Supportive care with fluids and rest. Return if fever recurs or \
             symptoms persist beyond ten days."
                .into(),
        ),
        section_confidence: Some(section_confidence(0.8)),
        follow_up_tasks: vec![RawTask {
            task: "Return visit if symptoms persist beyond ten days".into(),
            due_date: None,
            priority: Some("low".into()),
        }],
        ..Default::default()
    }
}

fn generic_note() -> RawNote {
    RawNote {
        chief_complaint: Some("General consultation".into()),
        hpi: Some("Details as discussed during the encounter.".into()),
        ros: Some("Reviewed and otherwise negative.".into()),
        physical_exam: Some("Focused examination performed, findings as noted.".into()),
        assessment: Some("Assessment pending clinical correlation.".into()),
        plan: Some("Plan discussed with the patient; follow up as needed.".into()),
        section_confidence: Some(section_confidence(0.6)),
        ..Default::default()
    }
}

fn section_confidence(value: f64) -> RawSectionConfidence {
    RawSectionConfidence {
        chief_complaint: Some(json!(value)),
        hpi: Some(json!(value)),
        ros: Some(json!(value)),
        physical_exam: Some(json!(value)),
        assessment: Some(json!(value)),
        plan: Some(json!(value)),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detergent_transcript_yields_dermatitis_assessment() {
        let note = mock_raw_note("rash for two weeks since using a new detergent");
        assert!(note.assessment.unwrap().contains("L23.9"));
        assert_eq!(note.differential_diagnoses.len(), 3);
    }

    #[test]
    fn penicillin_allergy_extracted() {
        let note = mock_raw_note("I'm allergic to penicillin and have a rash");
        assert_eq!(note.allergies.len(), 1);
        assert_eq!(note.allergies[0].allergen, "Penicillin");
    }

    #[test]
    fn cough_transcript_yields_respiratory_note() {
        let note = mock_raw_note("bad cough and congestion for three days");
        assert!(note.assessment.unwrap().contains("J06.9"));
    }

    #[test]
    fn unknown_transcript_yields_generic_note() {
        let note = mock_raw_note("annual wellness check, no complaints");
        assert!(note.chief_complaint.unwrap().contains("General"));
        assert!(note.allergies.is_empty());
    }

    #[test]
    fn mock_notes_always_have_all_sections() {
        for transcript in ["rash", "cough", "wellness"] {
            let note = mock_raw_note(transcript);
            assert!(note.chief_complaint.is_some());
            assert!(note.hpi.is_some());
            assert!(note.ros.is_some());
            assert!(note.physical_exam.is_some());
            assert!(note.assessment.is_some());
            assert!(note.plan.is_some());
        }
    }
}
