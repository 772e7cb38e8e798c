//! PHI entity scanning with global overlap resolution.

use super::patterns;
use super::PhiEntity;

/// Scan `text` for PHI entities across every category pattern.
///
/// Patterns run in their declared priority order against a shared set of
/// claimed ranges; an overlapping later match is discarded, so the earlier
/// category wins ambiguous spans. The result is sorted by start offset and
/// contains no overlapping ranges. Pure: never fails, empty in → empty out.
pub fn detect_phi(text: &str) -> Vec<PhiEntity> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut entities = Vec::new();

    for pattern in patterns::all() {
        for found in pattern.regex.find_iter(text) {
            let (start, end) = (found.start(), found.end());
            let overlaps = claimed.iter().any(|&(s, e)| start < e && s < end);
            if overlaps {
                continue;
            }
            claimed.push((start, end));
            entities.push(PhiEntity {
                category: pattern.category,
                text: found.as_str().to_string(),
                start,
                end,
                masked_value: pattern.mask_for(found.as_str()),
            });
        }
    }

    entities.sort_by_key(|e| e.start);
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::PhiCategory;

    #[test]
    fn empty_text_yields_no_entities() {
        assert!(detect_phi("").is_empty());
    }

    #[test]
    fn clean_clinical_text_yields_no_entities() {
        let entities = detect_phi("Patient reports a rash on both arms for two weeks.");
        assert!(entities.is_empty());
    }

    #[test]
    fn detects_ssn_phone_and_email() {
        let text = "SSN 123-45-6789, call 555-867-5309, email jane.doe@example.com";
        let entities = detect_phi(text);
        let categories: Vec<_> = entities.iter().map(|e| e.category).collect();
        assert!(categories.contains(&PhiCategory::Ssn));
        assert!(categories.contains(&PhiCategory::Phone));
        assert!(categories.contains(&PhiCategory::Email));
    }

    #[test]
    fn no_two_entities_overlap() {
        let text = "DOB: 03/14/1985, MRN: 8675309, lives at 42 Elm Street, \
                    Springfield 62704, policy number: XK9912345, 192.168.0.1";
        let entities = detect_phi(text);
        for (i, a) in entities.iter().enumerate() {
            for b in entities.iter().skip(i + 1) {
                assert!(
                    a.end <= b.start || b.end <= a.start,
                    "{:?} overlaps {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn entities_sorted_by_start_offset() {
        let text = "email jane@example.com then SSN 123-45-6789 then 555-867-5309";
        let entities = detect_phi(text);
        assert!(entities.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn address_claim_leaves_standalone_zip_detectable() {
        // The address pattern runs before ZIP; a standalone ZIP nearby is
        // still caught.
        let text = "Send mail to 42 Elm Street, zip is 62704.";
        let entities = detect_phi(text);
        assert!(entities.iter().any(|e| e.category == PhiCategory::StreetAddress));
        let zips: Vec<_> = entities
            .iter()
            .filter(|e| e.category == PhiCategory::Zip)
            .collect();
        assert_eq!(zips.len(), 1);
        assert_eq!(zips[0].text, "62704");
    }

    #[test]
    fn labeled_dob_wins_over_slash_dob() {
        let entities = detect_phi("DOB: 03/14/1985");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].category, PhiCategory::DobLabeled);
    }

    #[test]
    fn offsets_point_at_matched_text() {
        let text = "reach me at nurse.kim@clinic.org today";
        let entities = detect_phi(text);
        assert_eq!(entities.len(), 1);
        assert_eq!(&text[entities[0].start..entities[0].end], entities[0].text);
    }

    #[test]
    fn detects_po_box_and_credit_card() {
        let text = "billing: P.O. Box 991, card 4111 1111 1111 1111";
        let entities = detect_phi(text);
        assert!(entities.iter().any(|e| e.category == PhiCategory::PoBox));
        assert!(entities.iter().any(|e| e.category == PhiCategory::CreditCard));
    }

    #[test]
    fn detects_mrn_both_styles() {
        let labeled = detect_phi("MRN: 8675309");
        assert!(labeled.iter().any(|e| e.category == PhiCategory::MrnLabeled));
        let compact = detect_phi("chart MR#8675309");
        assert!(compact.iter().any(|e| e.category == PhiCategory::MrnCompact));
    }

    #[test]
    fn detects_license_and_account() {
        let text = "driver's license: D1234567, account number: 99887766";
        let entities = detect_phi(text);
        assert!(entities.iter().any(|e| e.category == PhiCategory::DriversLicense));
        assert!(entities.iter().any(|e| e.category == PhiCategory::AccountNumber));
    }
}
