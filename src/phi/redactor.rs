//! Offset-safe PHI masking.

use super::detector::detect_phi;
use super::PhiEntity;

/// Replace every entity span in `text` with its mask value.
///
/// Replacements are applied from the highest start offset down, so earlier
/// replacements cannot shift the offsets of spans not yet applied. The
/// output equals performing all replacements simultaneously against the
/// original offsets.
pub fn redact_phi(text: &str, entities: &[PhiEntity]) -> String {
    let mut ordered: Vec<&PhiEntity> = entities.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = text.to_string();
    for entity in ordered {
        if entity.end <= out.len() && out.is_char_boundary(entity.start) {
            out.replace_range(entity.start..entity.end, &entity.masked_value);
        }
    }
    out
}

/// The outbound sanitizer: detect and mask in one call.
///
/// Mandatory on any text leaving the system boundary toward a third-party
/// provider.
pub fn sanitize_outbound(text: &str) -> String {
    let entities = detect_phi(text);
    if entities.is_empty() {
        return text.to_string();
    }
    tracing::debug!(count = entities.len(), "masking PHI in outbound text");
    redact_phi(text, &entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::PhiCategory;

    #[test]
    fn redacts_single_entity() {
        let text = "SSN is 123-45-6789, thanks";
        let redacted = redact_phi(text, &detect_phi(text));
        assert_eq!(redacted, "SSN is [SSN], thanks");
    }

    #[test]
    fn redacts_multiple_entities_without_offset_drift() {
        let text = "SSN 123-45-6789, phone 555-867-5309, email a@b.org end";
        let redacted = redact_phi(text, &detect_phi(text));
        assert_eq!(redacted, "SSN [SSN], phone [PHONE], email [EMAIL] end");
    }

    #[test]
    fn masking_round_trip_removes_masked_categories() {
        let text = "DOB: 03/14/1985, MRN: 8675309, reach 555-867-5309 or \
                    jane@example.com, SSN 123-45-6789, zip 62704";
        let entities = detect_phi(text);
        assert!(!entities.is_empty());
        let masked_categories: Vec<PhiCategory> =
            entities.iter().map(|e| e.category).collect();

        let redacted = redact_phi(text, &entities);
        let residual = detect_phi(&redacted);
        for entity in &residual {
            assert!(
                !masked_categories.contains(&entity.category),
                "category {} survived redaction in {:?}",
                entity.category,
                redacted
            );
        }
    }

    #[test]
    fn zip_mask_preserves_shape() {
        let text = "zip 62704-1234 here";
        let redacted = redact_phi(text, &detect_phi(text));
        assert_eq!(redacted, "zip #####-#### here");
    }

    #[test]
    fn empty_entity_list_is_identity() {
        let text = "no identifiers in this sentence";
        assert_eq!(redact_phi(text, &[]), text);
    }

    #[test]
    fn sanitize_outbound_masks_in_one_call() {
        let out = sanitize_outbound("call me at 555-867-5309");
        assert_eq!(out, "call me at [PHONE]");
    }

    #[test]
    fn sanitize_outbound_clean_text_unchanged() {
        let text = "rash on both forearms, worse at night";
        assert_eq!(sanitize_outbound(text), text);
    }
}
