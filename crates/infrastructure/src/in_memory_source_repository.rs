use async_trait::async_trait;
use certwatch_application::{RefreshScope, SourceSnapshotRepository};
use certwatch_core::AppResult;
use certwatch_domain::{
    CertificationRule, Employee, EmployeeCertification, EmployeeId, JobMapping, JobPositionId,
    ManualException,
};
use tokio::sync::RwLock;

/// Seedable in-memory stand-in for the externally owned source tables.
#[derive(Debug, Default)]
pub struct InMemorySourceRepository {
    employees: RwLock<Vec<Employee>>,
    rules: RwLock<Vec<CertificationRule>>,
    job_mappings: RwLock<Vec<JobMapping>>,
    manual_exceptions: RwLock<Vec<ManualException>>,
    certifications: RwLock<Vec<EmployeeCertification>>,
}

impl InMemorySourceRepository {
    /// Creates an empty source repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an employee.
    pub async fn upsert_employee(&self, employee: Employee) {
        let mut employees = self.employees.write().await;
        employees.retain(|stored| stored.id != employee.id);
        employees.push(employee);
    }

    /// Inserts or replaces a catalog rule.
    pub async fn upsert_rule(&self, rule: CertificationRule) {
        let mut rules = self.rules.write().await;
        rules.retain(|stored| stored.id != rule.id);
        rules.push(rule);
    }

    /// Adds a job mapping.
    pub async fn add_job_mapping(&self, mapping: JobMapping) {
        self.job_mappings.write().await.push(mapping);
    }

    /// Adds a manual exception.
    pub async fn add_manual_exception(&self, exception: ManualException) {
        self.manual_exceptions.write().await.push(exception);
    }

    /// Adds a certification record.
    pub async fn add_certification(&self, certification: EmployeeCertification) {
        self.certifications.write().await.push(certification);
    }
}

fn in_scope(scope: RefreshScope, employee_id: EmployeeId) -> bool {
    scope
        .employee_id()
        .is_none_or(|scoped| scoped == employee_id)
}

#[async_trait]
impl SourceSnapshotRepository for InMemorySourceRepository {
    async fn list_employees(&self, scope: RefreshScope) -> AppResult<Vec<Employee>> {
        let mut employees: Vec<Employee> = self
            .employees
            .read()
            .await
            .iter()
            .filter(|employee| in_scope(scope, employee.id))
            .cloned()
            .collect();
        employees.sort_by_key(|employee| employee.id);

        Ok(employees)
    }

    async fn list_rules(&self) -> AppResult<Vec<CertificationRule>> {
        Ok(self.rules.read().await.clone())
    }

    async fn list_active_job_mappings(&self, scope: RefreshScope) -> AppResult<Vec<JobMapping>> {
        let positions: Vec<JobPositionId> = self
            .employees
            .read()
            .await
            .iter()
            .filter(|employee| in_scope(scope, employee.id))
            .filter_map(Employee::job_position_id)
            .collect();

        Ok(self
            .job_mappings
            .read()
            .await
            .iter()
            .filter(|mapping| mapping.is_active && mapping.deleted_at.is_none())
            .filter(|mapping| {
                scope == RefreshScope::All || positions.contains(&mapping.job_position_id)
            })
            .cloned()
            .collect())
    }

    async fn list_active_manual_exceptions(
        &self,
        scope: RefreshScope,
    ) -> AppResult<Vec<ManualException>> {
        Ok(self
            .manual_exceptions
            .read()
            .await
            .iter()
            .filter(|exception| exception.is_active && exception.deleted_at.is_none())
            .filter(|exception| in_scope(scope, exception.employee_id))
            .cloned()
            .collect())
    }

    async fn list_certifications(
        &self,
        scope: RefreshScope,
    ) -> AppResult<Vec<EmployeeCertification>> {
        Ok(self
            .certifications
            .read()
            .await
            .iter()
            .filter(|certification| certification.deleted_at.is_none())
            .filter(|certification| in_scope(scope, certification.employee_id))
            .cloned()
            .collect())
    }
}
