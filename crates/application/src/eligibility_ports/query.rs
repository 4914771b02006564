use chrono::{DateTime, NaiveDate, Utc};

use certwatch_domain::{
    EligibilityId, EligibilitySource, EligibilityStatus, EmployeeId, JobPositionId,
    RemainingTime, RuleId,
};

/// Filters and paging for the eligibility listing.
///
/// Empty filter lists match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityListQuery {
    /// Employee filter.
    pub employee_ids: Vec<EmployeeId>,
    /// Job position filter.
    pub job_position_ids: Vec<JobPositionId>,
    /// Certification code filter.
    pub certification_codes: Vec<String>,
    /// Numeric level filter.
    pub levels: Vec<i32>,
    /// Sub-field code filter.
    pub sub_field_codes: Vec<String>,
    /// Status filter.
    pub statuses: Vec<EligibilityStatus>,
    /// Source filter.
    pub sources: Vec<EligibilitySource>,
    /// Case-insensitive free-text search.
    pub search: Option<String>,
    /// Zero-based page index.
    pub page: usize,
    /// Page size.
    pub size: usize,
}

impl Default for EligibilityListQuery {
    fn default() -> Self {
        Self {
            employee_ids: Vec::new(),
            job_position_ids: Vec::new(),
            certification_codes: Vec::new(),
            levels: Vec::new(),
            sub_field_codes: Vec::new(),
            statuses: Vec::new(),
            sources: Vec::new(),
            search: None,
            page: 0,
            size: 20,
        }
    }
}

/// Eligibility row joined with employee and rule display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityView {
    /// Row identifier.
    pub id: EligibilityId,
    /// Employee identifier.
    pub employee_id: EmployeeId,
    /// Staff number, when the employee is still in the directory.
    pub nip: Option<String>,
    /// Employee name.
    pub employee_name: Option<String>,
    /// Current job position.
    pub job_position_id: Option<JobPositionId>,
    /// Current job title.
    pub job_title: Option<String>,
    /// Join date.
    pub join_date: Option<NaiveDate>,
    /// Rule identifier.
    pub rule_id: RuleId,
    /// Certification code, when the rule is still in the catalog.
    pub certification_code: Option<String>,
    /// Certification name.
    pub certification_name: Option<String>,
    /// Level display name.
    pub level_name: Option<String>,
    /// Numeric level.
    pub level: Option<i32>,
    /// Sub-field code.
    pub sub_field_code: Option<String>,
    /// Sub-field name.
    pub sub_field_name: Option<String>,
    /// Derived status.
    pub status: EligibilityStatus,
    /// Requirement provenance.
    pub source: EligibilitySource,
    /// Certificate expiry date.
    pub due_date: Option<NaiveDate>,
    /// Whether the row is live.
    pub is_active: bool,
    /// Tombstone timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Deadline for first certification after joining.
    pub mandatory_by: Option<NaiveDate>,
    /// Snapshotted validity period.
    pub validity_months: u32,
    /// Snapshotted reminder lead time.
    pub reminder_months: u32,
    /// Time left until the due date.
    pub remaining: Option<RemainingTime>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One page of the eligibility listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPage {
    /// Rows on this page.
    pub items: Vec<EligibilityView>,
    /// Rows matching the filters across all pages.
    pub total: usize,
    /// Zero-based page index.
    pub page: usize,
    /// Page size.
    pub size: usize,
}
