use serde::{Deserialize, Serialize};

/// Identifier of a certification rule in the external rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(i64);

impl RuleId {
    /// Creates a rule identifier from its catalog value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying catalog value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Period terms of a rule, snapshotted into every eligibility row at sync time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleTerms {
    /// Months a certificate stays valid after its certification date.
    pub validity_months: u32,
    /// Months before expiry when the certificate becomes due for renewal.
    pub reminder_months: u32,
    /// Months after joining by which the employee must be certified.
    pub required_after_join_months: Option<u32>,
}

/// Read-only rule catalog entry: a certification, level and sub-field triple
/// plus its period terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationRule {
    /// Rule identifier.
    pub id: RuleId,
    /// Certification code.
    pub certification_code: String,
    /// Certification display name.
    pub certification_name: String,
    /// Certification level display name.
    pub level_name: Option<String>,
    /// Numeric certification level used for ordering.
    pub level: Option<i32>,
    /// Sub-field code.
    pub sub_field_code: Option<String>,
    /// Sub-field display name.
    pub sub_field_name: Option<String>,
    /// Validity, reminder and grace periods.
    pub terms: RuleTerms,
}
