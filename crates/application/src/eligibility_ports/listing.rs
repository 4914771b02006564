use async_trait::async_trait;

use certwatch_core::AppResult;
use certwatch_domain::{CertificationRule, Employee, EmployeeEligibility};

use super::EligibilityListQuery;

/// Live eligibility row with the directory and catalog entries it is shown with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEligibility {
    /// Stored row.
    pub row: EmployeeEligibility,
    /// Directory entry; absent once the employee left the directory.
    pub employee: Option<Employee>,
    /// Catalog entry; absent once the rule left the catalog.
    pub rule: Option<CertificationRule>,
}

/// One page of listed rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListedEligibilityPage {
    /// Rows on the requested page, in listing order.
    pub rows: Vec<ListedEligibility>,
    /// Rows matching the filters across all pages.
    pub total: usize,
}

/// Store that filters, searches, orders and pages the eligibility listing
/// itself instead of handing every live row to the service.
///
/// Implementations must honour every filter of [`EligibilityListQuery`] and
/// order rows by job title, certification code, level, sub-field code and
/// status severity, with missing display values last, then by employee, rule
/// and source.
#[async_trait]
pub trait EligibilityListingRepository: Send + Sync {
    /// Returns the requested page of live rows.
    async fn list_page(&self, query: &EligibilityListQuery) -> AppResult<ListedEligibilityPage>;
}
