//! Ordered PHI category pattern table.
//!
//! The list order is load-bearing: the detector claims character ranges in
//! this order, and a later pattern's match is discarded when it overlaps an
//! already-claimed range. A ZIP code inside a street address is therefore
//! suppressed on purpose: the address claim wins.

use std::sync::LazyLock;

use regex::Regex;

use super::PhiCategory;

/// A single category pattern with its masking rule.
pub struct PhiPattern {
    pub category: PhiCategory,
    pub regex: Regex,
    mask: MaskRule,
}

enum MaskRule {
    /// Fixed replacement literal.
    Literal(&'static str),
    /// Replace every digit with `#`, keep separators (ZIP style).
    HashDigits,
}

impl PhiPattern {
    /// Mask value for a concrete match.
    pub fn mask_for(&self, matched: &str) -> String {
        match &self.mask {
            MaskRule::Literal(literal) => (*literal).to_string(),
            MaskRule::HashDigits => matched
                .chars()
                .map(|c| if c.is_ascii_digit() { '#' } else { c })
                .collect(),
        }
    }
}

fn pattern(category: PhiCategory, re: &str, mask: MaskRule) -> PhiPattern {
    PhiPattern {
        category,
        // Patterns are fixed literals; a failure here is a programming error.
        regex: Regex::new(re).expect("invalid PHI pattern"),
        mask,
    }
}

/// All category patterns, in detection priority order.
pub fn all() -> &'static [PhiPattern] {
    static PATTERNS: LazyLock<Vec<PhiPattern>> = LazyLock::new(|| {
        vec![
            pattern(
                PhiCategory::Ssn,
                r"\b\d{3}-\d{2}-\d{4}\b",
                MaskRule::Literal("[SSN]"),
            ),
            pattern(
                PhiCategory::Phone,
                r"(?:\+?1[-.\s])?(?:\(\d{3}\)\s?|\d{3}[-.\s])\d{3}[-.\s]\d{4}\b",
                MaskRule::Literal("[PHONE]"),
            ),
            pattern(
                PhiCategory::DobLabeled,
                r"(?i)\b(?:DOB|date of birth)[:\s]+\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
                MaskRule::Literal("[DOB]"),
            ),
            pattern(
                PhiCategory::DobSlash,
                r"\b(?:0?[1-9]|1[0-2])/(?:0?[1-9]|[12]\d|3[01])/(?:19|20)\d{2}\b",
                MaskRule::Literal("[DOB]"),
            ),
            pattern(
                PhiCategory::MrnLabeled,
                r"(?i)\b(?:MRN|medical record(?: number)?)[:#\s]+\d{5,10}\b",
                MaskRule::Literal("[MRN]"),
            ),
            pattern(
                PhiCategory::MrnCompact,
                r"(?i)\bMR#\s?\d{5,10}\b",
                MaskRule::Literal("[MRN]"),
            ),
            pattern(
                PhiCategory::Email,
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
                MaskRule::Literal("[EMAIL]"),
            ),
            pattern(
                PhiCategory::StreetAddress,
                r"(?i)\b\d{1,6}\s+(?:[A-Za-z0-9'.]+\s+){1,4}(?:street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|court|ct|place|pl|way)\b\.?(?:,?\s+(?:apt|suite|unit|#)\s*\w+)?",
                MaskRule::Literal("[ADDRESS]"),
            ),
            pattern(
                PhiCategory::PoBox,
                r"(?i)\bP\.?\s?O\.?\s?Box\s+\d+\b",
                MaskRule::Literal("[ADDRESS]"),
            ),
            pattern(
                PhiCategory::Zip,
                r"\b\d{5}(?:-\d{4})?\b",
                MaskRule::HashDigits,
            ),
            pattern(
                PhiCategory::InsuranceId,
                r"(?i)\b(?:policy|member|insurance)\s*(?:id|number|no\.?|#)?[:\s#]+[A-Z0-9-]{6,17}\b",
                MaskRule::Literal("[INSURANCE-ID]"),
            ),
            pattern(
                PhiCategory::CreditCard,
                r"\b\d{4}[-\s]\d{4}[-\s]\d{4}[-\s]\d{4}\b",
                MaskRule::Literal("[CARD]"),
            ),
            pattern(
                PhiCategory::IpAddress,
                r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
                MaskRule::Literal("[IP]"),
            ),
            pattern(
                PhiCategory::DriversLicense,
                r"(?i)\b(?:driver'?s?\s+licen[sc]e|DL)\s*(?:number|no\.?|#)?[:\s#]+[A-Z0-9]{5,13}\b",
                MaskRule::Literal("[LICENSE]"),
            ),
            pattern(
                PhiCategory::AccountNumber,
                r"(?i)\b(?:account|acct)\s*(?:number|no\.?|#)?[:\s#]+\d{6,14}\b",
                MaskRule::Literal("[ACCOUNT]"),
            ),
        ]
    });
    &PATTERNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_is_fixed() {
        let patterns = all();
        assert_eq!(patterns[0].category, PhiCategory::Ssn);
        assert_eq!(patterns[1].category, PhiCategory::Phone);
        assert_eq!(patterns[9].category, PhiCategory::Zip);
        assert_eq!(patterns.len(), 15);
    }

    #[test]
    fn zip_mask_tracks_match_length() {
        let zip = &all()[9];
        assert_eq!(zip.mask_for("94110"), "#####");
        assert_eq!(zip.mask_for("94110-1234"), "#####-####");
    }

    #[test]
    fn ssn_pattern_matches_standard_form() {
        let ssn = &all()[0];
        assert!(ssn.regex.is_match("patient SSN 123-45-6789 on file"));
        assert!(!ssn.regex.is_match("order 123-456-789"));
    }

    #[test]
    fn phone_pattern_matches_common_forms() {
        let phone = &all()[1];
        assert!(phone.regex.is_match("call 555-123-4567"));
        assert!(phone.regex.is_match("call (555) 123-4567"));
        assert!(phone.regex.is_match("call +1 555.123.4567"));
    }

    #[test]
    fn address_pattern_matches_street_forms() {
        let address = &all()[7];
        assert!(address.regex.is_match("lives at 42 Elm Street"));
        assert!(address.regex.is_match("123 Main St, Apt 4B"));
    }
}
