//! PHI (Protected Health Information) detection and redaction.
//!
//! Detection is pure and infallible: it either finds entities or returns an
//! empty list, never an error. Entities are recomputed on every call; there
//! is no cross-call resolution memory. Category order in [`patterns`] is the
//! tie-break for ambiguous spans and must not be reordered casually.

pub mod detector;
pub mod patterns;
pub mod redactor;

pub use detector::detect_phi;
pub use redactor::{redact_phi, sanitize_outbound};

use serde::{Deserialize, Serialize};
use std::fmt;

/// PHI identifier categories, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhiCategory {
    Ssn,
    Phone,
    DobLabeled,
    DobSlash,
    MrnLabeled,
    MrnCompact,
    Email,
    StreetAddress,
    PoBox,
    Zip,
    InsuranceId,
    CreditCard,
    IpAddress,
    DriversLicense,
    AccountNumber,
}

impl PhiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssn => "ssn",
            Self::Phone => "phone",
            Self::DobLabeled => "dob_labeled",
            Self::DobSlash => "dob_slash",
            Self::MrnLabeled => "mrn_labeled",
            Self::MrnCompact => "mrn_compact",
            Self::Email => "email",
            Self::StreetAddress => "street_address",
            Self::PoBox => "po_box",
            Self::Zip => "zip",
            Self::InsuranceId => "insurance_id",
            Self::CreditCard => "credit_card",
            Self::IpAddress => "ip_address",
            Self::DriversLicense => "drivers_license",
            Self::AccountNumber => "account_number",
        }
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected PHI span. Offsets are byte offsets into the source text;
/// resolved entities never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhiEntity {
    #[serde(rename = "type")]
    pub category: PhiCategory,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub masked_value: String,
}
