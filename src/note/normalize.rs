//! Normalization of loosely-structured provider output into the strict
//! note schema.
//!
//! Whatever the provider returned, the output here upholds the contract:
//! clamped confidences, exactly six section scores, differential
//! confidences summing to 1.0, capped and deduplicated lists, and a
//! patient summary with deterministic fallbacks.

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use super::parser::{RawDifferential, RawNote, RawSectionConfidence, RawTest};
use super::types::{
    AllergyEntry, ClinicalNote, CodeSuggestion, DifferentialDiagnosis, ExtractedData,
    FollowUpTask, MedicationEntry, PatientSummary, RecommendedTest, SectionConfidence,
    TaskPriority, TestUrgency,
};

pub const CONFIDENCE_FLOOR: f64 = 0.01;
pub const CONFIDENCE_CEILING: f64 = 0.99;

/// Fallback for missing or invalid section confidences.
const DEFAULT_SECTION_CONFIDENCE: f64 = 0.7;
/// Fallback for missing or invalid item confidences.
const DEFAULT_ITEM_CONFIDENCE: f64 = 0.5;

const MAX_DIFFERENTIALS: usize = 5;
const MAX_TESTS: usize = 5;

const MISSING_SECTION: &str = "Not documented.";

/// Symptom keyword library for the patient-summary concern scan.
const SYMPTOM_KEYWORDS: &[&str] = &[
    "rash",
    "itching",
    "pain",
    "burning",
    "redness",
    "swelling",
    "scaling",
    "bleeding",
    "blistering",
    "drainage",
    "fever",
];

/// Coerce a loose JSON confidence to a clamped numeric value.
///
/// Non-numeric values fall back to `default`; values on a 0–100 scale are
/// rescaled to 0–1; everything is clamped to `[0.01, 0.99]`. A value like
/// 1.5 is treated as a percentage; the clamp is the safety net, not an
/// intent guess.
pub fn coerce_confidence(value: Option<&Value>, default: f64) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse().unwrap_or(default),
        _ => default,
    };
    let scaled = if number > 1.0 && number <= 100.0 {
        number / 100.0
    } else {
        number
    };
    scaled.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

/// Produce the final note + extracted data from a raw provider (or mock)
/// note.
pub fn normalize_note(raw: RawNote, transcript: &str, model_used: &str) -> (ClinicalNote, ExtractedData) {
    let section_confidence = normalize_section_confidence(raw.section_confidence.as_ref());

    let chief_complaint = narrative(raw.chief_complaint);
    let hpi = narrative(raw.hpi);

    let differential_diagnoses = normalize_differentials(
        raw.differential_diagnoses,
        &format!("{chief_complaint} {transcript}"),
    );
    let recommended_tests =
        normalize_tests(raw.recommended_tests, &format!("{chief_complaint} {transcript}"));

    let follow_up_tasks: Vec<FollowUpTask> = raw
        .follow_up_tasks
        .into_iter()
        .filter(|t| !t.task.trim().is_empty())
        .map(|t| FollowUpTask {
            task: t.task.trim().to_string(),
            due_date: t.due_date.as_deref().and_then(parse_due_date),
            priority: t
                .priority
                .as_deref()
                .map(TaskPriority::coerce)
                .unwrap_or_default(),
        })
        .collect();

    let patient_summary = build_patient_summary(
        raw.patient_summary.as_ref(),
        &chief_complaint,
        &hpi,
        transcript,
        raw.plan.as_deref().unwrap_or_default(),
        &follow_up_tasks,
    );

    let extracted = ExtractedData {
        suggested_icd10: raw
            .suggested_icd10
            .into_iter()
            .map(|c| CodeSuggestion {
                code: c.code,
                description: c.description.unwrap_or_default(),
                confidence: coerce_confidence(c.confidence.as_ref(), DEFAULT_ITEM_CONFIDENCE),
            })
            .collect(),
        suggested_cpt: raw
            .suggested_cpt
            .into_iter()
            .map(|c| CodeSuggestion {
                code: c.code,
                description: c.description.unwrap_or_default(),
                confidence: coerce_confidence(c.confidence.as_ref(), DEFAULT_ITEM_CONFIDENCE),
            })
            .collect(),
        medications: raw
            .medications
            .into_iter()
            .map(|m| MedicationEntry {
                name: m.name,
                dosage: m.dosage,
                frequency: m.frequency,
                confidence: coerce_confidence(m.confidence.as_ref(), DEFAULT_ITEM_CONFIDENCE),
            })
            .collect(),
        allergies: raw
            .allergies
            .into_iter()
            .map(|a| AllergyEntry {
                allergen: a.allergen,
                reaction: a.reaction,
                severity: a.severity,
                confidence: coerce_confidence(a.confidence.as_ref(), DEFAULT_ITEM_CONFIDENCE),
            })
            .collect(),
        follow_up_tasks: follow_up_tasks.clone(),
    };

    let note = ClinicalNote {
        chief_complaint,
        hpi,
        ros: narrative(raw.ros),
        physical_exam: narrative(raw.physical_exam),
        assessment: narrative(raw.assessment),
        plan: narrative(raw.plan),
        overall_confidence: section_confidence.mean(),
        section_confidence,
        differential_diagnoses,
        recommended_tests,
        patient_summary,
        generated_at: Utc::now(),
        model_used: model_used.to_string(),
    };

    (note, extracted)
}

fn narrative(section: Option<String>) -> String {
    match section {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => MISSING_SECTION.to_string(),
    }
}

fn normalize_section_confidence(raw: Option<&RawSectionConfidence>) -> SectionConfidence {
    let coerce = |v: Option<&Value>| coerce_confidence(v, DEFAULT_SECTION_CONFIDENCE);
    match raw {
        None => SectionConfidence::uniform(DEFAULT_SECTION_CONFIDENCE),
        Some(raw) => SectionConfidence {
            chief_complaint: coerce(raw.chief_complaint.as_ref()),
            hpi: coerce(raw.hpi.as_ref()),
            ros: coerce(raw.ros.as_ref()),
            physical_exam: coerce(raw.physical_exam.as_ref()),
            assessment: coerce(raw.assessment.as_ref()),
            plan: coerce(raw.plan.as_ref()),
        },
    }
}

/// Dedupe, cap, fill, and re-weight differential diagnoses so the
/// surviving confidences sum to 1.0, sorted descending.
pub fn normalize_differentials(
    raw: Vec<RawDifferential>,
    fallback_text: &str,
) -> Vec<DifferentialDiagnosis> {
    let mut candidates: Vec<DifferentialDiagnosis> = raw
        .into_iter()
        .filter(|d| !d.condition.trim().is_empty())
        .map(|d| DifferentialDiagnosis {
            condition: d.condition.trim().to_string(),
            icd10: d.icd10.unwrap_or_else(|| "R69".into()),
            confidence: coerce_confidence(d.confidence.as_ref(), DEFAULT_ITEM_CONFIDENCE),
            reasoning: d.reasoning.unwrap_or_default(),
        })
        .collect();

    if candidates.is_empty() {
        candidates = rule_based_differentials(fallback_text);
    }

    // Case-insensitive dedupe by condition, first occurrence wins.
    let mut seen: Vec<String> = Vec::new();
    candidates.retain(|d| {
        let key = d.condition.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(MAX_DIFFERENTIALS);

    // Re-weight so the surviving set sums to 1.0.
    let sum: f64 = candidates.iter().map(|d| d.confidence).sum();
    if sum > 0.0 {
        for candidate in &mut candidates {
            candidate.confidence /= sum;
        }
    } else if !candidates.is_empty() {
        let uniform = 1.0 / candidates.len() as f64;
        for candidate in &mut candidates {
            candidate.confidence = uniform;
        }
    }

    candidates
}

/// Rule-based differentials keyed on transcript keywords; used when the
/// provider returned none.
fn rule_based_differentials(text: &str) -> Vec<DifferentialDiagnosis> {
    let lower = text.to_lowercase();

    if lower.contains("detergent") || lower.contains("rash") {
        return vec![
            DifferentialDiagnosis {
                condition: "Contact dermatitis".into(),
                icd10: "L23.9".into(),
                confidence: 0.55,
                reasoning: "Pruritic rash with temporal link to a new product exposure".into(),
            },
            DifferentialDiagnosis {
                condition: "Atopic dermatitis".into(),
                icd10: "L20.9".into(),
                confidence: 0.25,
                reasoning: "Chronic pruritic eruption in flexural distribution".into(),
            },
            DifferentialDiagnosis {
                condition: "Urticaria".into(),
                icd10: "L50.9".into(),
                confidence: 0.20,
                reasoning: "Pruritic wheals, possible allergic trigger".into(),
            },
        ];
    }
    if lower.contains("cough") || lower.contains("congestion") || lower.contains("sore throat") {
        return vec![
            DifferentialDiagnosis {
                condition: "Upper respiratory infection".into(),
                icd10: "J06.9".into(),
                confidence: 0.6,
                reasoning: "Acute upper airway symptoms without red flags".into(),
            },
            DifferentialDiagnosis {
                condition: "Acute bronchitis".into(),
                icd10: "J20.9".into(),
                confidence: 0.4,
                reasoning: "Productive cough without focal findings".into(),
            },
        ];
    }
    if lower.contains("headache") {
        return vec![
            DifferentialDiagnosis {
                condition: "Tension-type headache".into(),
                icd10: "G44.209".into(),
                confidence: 0.7,
                reasoning: "Bilateral pressure-type pain without aura".into(),
            },
            DifferentialDiagnosis {
                condition: "Migraine".into(),
                icd10: "G43.909".into(),
                confidence: 0.3,
                reasoning: "Episodic headache, consider if photophobia present".into(),
            },
        ];
    }

    vec![DifferentialDiagnosis {
        condition: "Clinical correlation required".into(),
        icd10: "R69".into(),
        confidence: 1.0,
        reasoning: "Transcript lacks sufficient detail for a differential".into(),
    }]
}

/// Dedupe and cap recommended tests; fill rule-based when empty.
pub fn normalize_tests(raw: Vec<RawTest>, fallback_text: &str) -> Vec<RecommendedTest> {
    let mut tests: Vec<RecommendedTest> = raw
        .into_iter()
        .filter(|t| !t.name.trim().is_empty())
        .map(|t| RecommendedTest {
            name: t.name.trim().to_string(),
            urgency: t.urgency.as_deref().map(TestUrgency::coerce).unwrap_or_default(),
            reason: t.reason.unwrap_or_default(),
            confidence: coerce_confidence(t.confidence.as_ref(), DEFAULT_ITEM_CONFIDENCE),
        })
        .collect();

    let mut seen: Vec<String> = Vec::new();
    tests.retain(|t| {
        let key = t.name.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    tests.truncate(MAX_TESTS);

    if tests.is_empty() {
        tests = rule_based_tests(fallback_text);
    }

    tests
}

fn rule_based_tests(text: &str) -> Vec<RecommendedTest> {
    let lower = text.to_lowercase();

    if lower.contains("rash") || lower.contains("detergent") {
        return vec![
            RecommendedTest {
                name: "Patch testing".into(),
                urgency: TestUrgency::Routine,
                reason: "Identify the contact allergen if the rash persists".into(),
                confidence: 0.6,
            },
            RecommendedTest {
                name: "KOH preparation".into(),
                urgency: TestUrgency::Routine,
                reason: "Exclude dermatophyte infection".into(),
                confidence: 0.4,
            },
        ];
    }
    if lower.contains("cough") {
        return vec![RecommendedTest {
            name: "Chest X-ray".into(),
            urgency: TestUrgency::Soon,
            reason: "Exclude pneumonia if symptoms persist".into(),
            confidence: 0.5,
        }];
    }

    vec![RecommendedTest {
        name: "Complete blood count".into(),
        urgency: TestUrgency::Routine,
        reason: "Baseline evaluation".into(),
        confidence: 0.4,
    }]
}

fn parse_due_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// Derive the patient summary with deterministic fallbacks.
fn build_patient_summary(
    raw: Option<&super::parser::RawPatientSummary>,
    chief_complaint: &str,
    hpi: &str,
    transcript: &str,
    plan: &str,
    tasks: &[FollowUpTask],
) -> PatientSummary {
    let haystack = format!("{chief_complaint} {hpi} {transcript}").to_lowercase();
    let mut concerns: Vec<String> = SYMPTOM_KEYWORDS
        .iter()
        .filter(|keyword| haystack.contains(**keyword))
        .map(|keyword| capitalize(keyword))
        .collect();

    if concerns.is_empty() {
        let first_clause = chief_complaint
            .split([',', '.', ';'])
            .next()
            .unwrap_or(chief_complaint)
            .trim();
        if !first_clause.is_empty() {
            concerns.push(first_clause.to_string());
        }
    }

    let earliest_due = tasks.iter().filter_map(|t| t.due_date).min();
    let follow_up = match (raw.and_then(|r| r.follow_up.clone()), earliest_due) {
        (_, Some(date)) => format!("Follow up by {}", date.format("%Y-%m-%d")),
        (Some(text), None) if !text.trim().is_empty() => text,
        _ => "Follow up as needed, or sooner if symptoms worsen.".into(),
    };

    let summary = raw
        .and_then(|r| r.summary.clone())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("Visit regarding: {chief_complaint}"));

    let next_steps = raw
        .and_then(|r| r.next_steps.clone())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| {
            if plan.trim().is_empty() || plan == MISSING_SECTION {
                "Review the plan with your care team.".into()
            } else {
                plan.split(['.', ';'])
                    .next()
                    .unwrap_or(plan)
                    .trim()
                    .to_string()
            }
        });

    let raw_concerns: Vec<String> = raw
        .map(|r| r.your_concerns.clone())
        .unwrap_or_default()
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect();
    // Keyword-derived concerns win; provider-sent ones only fill a gap.
    if concerns.is_empty() {
        concerns = raw_concerns;
    }

    PatientSummary {
        summary,
        your_concerns: concerns,
        next_steps,
        follow_up,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
