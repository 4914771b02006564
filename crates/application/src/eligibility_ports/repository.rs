use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use certwatch_core::AppResult;
use certwatch_domain::{
    EligibilityId, EligibilitySource, EligibilityStatus, EmployeeEligibility, EmployeeId,
};

use super::RefreshScope;

/// Kind of write the reconciler asks the store to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityChangeKind {
    /// Insert a new live row.
    Created,
    /// Clear the tombstone on an existing row and refresh its terms.
    Resurrected,
    /// Tombstone a live row.
    Tombstoned,
    /// Overwrite the snapshotted terms of a live row.
    TermsRefreshed,
}

/// One row write produced by reconciliation or a manual override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityChange {
    /// Write kind.
    pub kind: EligibilityChangeKind,
    /// Desired row state after the write.
    pub row: EmployeeEligibility,
}

/// Status-sync output for one live row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityStatusUpdate {
    /// Row identifier.
    pub id: EligibilityId,
    /// Derived status.
    pub status: EligibilityStatus,
    /// Derived due date.
    pub due_date: Option<NaiveDate>,
    /// Modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&EmployeeEligibility> for EligibilityStatusUpdate {
    fn from(value: &EmployeeEligibility) -> Self {
        Self {
            id: value.id(),
            status: value.status(),
            due_date: value.due_date(),
            updated_at: value.updated_at(),
        }
    }
}

/// Row-level filter for eligibility reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityRowQuery {
    /// Restricts to these employees when non-empty.
    pub employee_ids: Vec<EmployeeId>,
    /// Includes tombstoned rows.
    pub include_tombstoned: bool,
    /// Restricts to these statuses when non-empty.
    pub statuses: Vec<EligibilityStatus>,
    /// Restricts to these sources when non-empty.
    pub sources: Vec<EligibilitySource>,
}

impl EligibilityRowQuery {
    /// Returns every row, live or tombstoned, in a refresh scope.
    #[must_use]
    pub fn all_in_scope(scope: RefreshScope) -> Self {
        Self {
            employee_ids: scope.employee_id().into_iter().collect(),
            include_tombstoned: true,
            ..Self::default()
        }
    }

    /// Returns live rows in a refresh scope.
    #[must_use]
    pub fn live_in_scope(scope: RefreshScope) -> Self {
        Self {
            employee_ids: scope.employee_id().into_iter().collect(),
            include_tombstoned: false,
            ..Self::default()
        }
    }

    /// Returns whether a row passes this filter.
    #[must_use]
    pub fn matches(&self, row: &EmployeeEligibility) -> bool {
        (self.include_tombstoned || row.is_active())
            && (self.employee_ids.is_empty() || self.employee_ids.contains(&row.employee_id()))
            && (self.statuses.is_empty() || self.statuses.contains(&row.status()))
            && (self.sources.is_empty() || self.sources.contains(&row.source()))
    }
}

/// Persistence port for engine-owned eligibility rows.
///
/// Implementations must keep at most one live row per
/// `(employee_id, rule_id, source)`. A write that would create a second live
/// row must fold into the existing one instead of failing.
#[async_trait]
pub trait EligibilityRepository: Send + Sync {
    /// Lists rows matching the filter.
    async fn list_rows(&self, query: EligibilityRowQuery) -> AppResult<Vec<EmployeeEligibility>>;

    /// Finds one row by identifier, live or tombstoned.
    async fn find_row(&self, id: EligibilityId) -> AppResult<Option<EmployeeEligibility>>;

    /// Applies one employee's reconciliation writes atomically and returns the
    /// identifiers of the rows actually written.
    async fn apply_changes(&self, changes: Vec<EligibilityChange>)
    -> AppResult<Vec<EligibilityId>>;

    /// Persists status-sync output in bulk and returns the number of rows updated.
    async fn save_statuses(&self, updates: Vec<EligibilityStatusUpdate>) -> AppResult<usize>;
}
