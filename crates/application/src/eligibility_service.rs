use std::sync::Arc;

use serde::Serialize;

use certwatch_domain::EmployeeId;

use crate::eligibility_ports::{
    Clock, EligibilityListingRepository, EligibilityRepository, SourceSnapshotRepository,
};

mod overrides;
mod query;
mod refresh;

/// Per-employee failure recorded during a refresh pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeRefreshFailure {
    /// Employee whose reconciliation failed.
    pub employee_id: EmployeeId,
    /// Failure description.
    pub reason: String,
}

/// Outcome of a refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Employees reconciled in the pass, including failed ones.
    pub employees_processed: usize,
    /// Distinct eligibility rows written.
    pub rows_touched: usize,
    /// Required rules skipped because they are missing from the catalog.
    pub skipped_requirements: usize,
    /// Employees whose reconciliation failed.
    pub failures: Vec<EmployeeRefreshFailure>,
}

impl RefreshReport {
    /// Returns the identifiers of employees that failed.
    #[must_use]
    pub fn failed_employee_ids(&self) -> Vec<EmployeeId> {
        self.failures
            .iter()
            .map(|failure| failure.employee_id)
            .collect()
    }
}

/// Eligibility reconciliation engine and its query surface.
#[derive(Clone)]
pub struct EligibilityService {
    sources: Arc<dyn SourceSnapshotRepository>,
    repository: Arc<dyn EligibilityRepository>,
    clock: Arc<dyn Clock>,
    listing: Option<Arc<dyn EligibilityListingRepository>>,
}

impl EligibilityService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        sources: Arc<dyn SourceSnapshotRepository>,
        repository: Arc<dyn EligibilityRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            repository,
            clock,
            listing: None,
        }
    }

    /// Lets the store page the eligibility listing itself. Without one the
    /// service filters and pages the live rows in memory.
    #[must_use]
    pub fn with_listing(mut self, listing: Arc<dyn EligibilityListingRepository>) -> Self {
        self.listing = Some(listing);
        self
    }
}
