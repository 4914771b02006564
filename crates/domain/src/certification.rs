use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{EmployeeId, RuleId};

/// Read-only certification record held by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeCertification {
    /// Record identifier in the certification register.
    pub id: i64,
    /// Certificate holder.
    pub employee_id: EmployeeId,
    /// Rule the certificate satisfies.
    pub rule_id: RuleId,
    /// Date the certificate was issued.
    pub cert_date: Option<NaiveDate>,
    /// Last day the certificate is valid; absent for non-expiring certificates.
    pub valid_until: Option<NaiveDate>,
    /// First day of the renewal reminder window.
    pub reminder_date: Option<NaiveDate>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EmployeeCertification {
    /// Returns whether the record can satisfy a requirement at all.
    ///
    /// Deleted records and records without a certification date never match.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.deleted_at.is_none() && self.cert_date.is_some()
    }

    /// Returns whether this record supersedes `other` for the same requirement.
    ///
    /// The later certification date wins; equal dates fall back to the higher
    /// record identifier so the choice stays deterministic.
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        (self.cert_date, self.id) > (other.cert_date, other.id)
    }
}
