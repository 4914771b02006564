use async_trait::async_trait;

use certwatch_core::AppResult;
use certwatch_domain::{
    CertificationRule, Employee, EmployeeCertification, EmployeeId, JobMapping, ManualException,
};

/// Population covered by one refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Every employee in the directory.
    All,
    /// A single employee.
    Employee(EmployeeId),
}

impl RefreshScope {
    /// Returns the scoped employee, if any.
    #[must_use]
    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self {
            Self::All => None,
            Self::Employee(employee_id) => Some(*employee_id),
        }
    }
}

/// Read-only port over the externally owned tables a refresh pass reads.
///
/// Every method is one bulk read; a pass calls each at most once.
#[async_trait]
pub trait SourceSnapshotRepository: Send + Sync {
    /// Lists employees in scope.
    async fn list_employees(&self, scope: RefreshScope) -> AppResult<Vec<Employee>>;

    /// Lists the full rule catalog.
    async fn list_rules(&self) -> AppResult<Vec<CertificationRule>>;

    /// Lists active, non-deleted job mappings relevant to the scope.
    ///
    /// For a single employee this is the mappings of their job position.
    async fn list_active_job_mappings(&self, scope: RefreshScope) -> AppResult<Vec<JobMapping>>;

    /// Lists active, non-deleted manual exceptions in scope.
    async fn list_active_manual_exceptions(
        &self,
        scope: RefreshScope,
    ) -> AppResult<Vec<ManualException>>;

    /// Lists non-deleted certification records in scope.
    async fn list_certifications(
        &self,
        scope: RefreshScope,
    ) -> AppResult<Vec<EmployeeCertification>>;
}
