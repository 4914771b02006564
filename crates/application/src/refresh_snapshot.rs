use std::collections::{BTreeSet, HashMap};

use certwatch_core::AppResult;
use certwatch_domain::{
    CertificationRule, Employee, EmployeeCertification, EmployeeId, JobMapping, JobPositionId,
    ManualException, RequirementAssignment, RuleId,
};

use crate::certification_matcher::CertificationIndex;
use crate::eligibility_ports::{RefreshScope, SourceSnapshotRepository};

/// Immutable lookup tables for one refresh pass.
///
/// Built once before any employee is processed and dropped when the pass
/// ends; an edit to a source table mid-pass is picked up by the next pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct RefreshSnapshot {
    employees: Vec<Employee>,
    rules: HashMap<RuleId, CertificationRule>,
    mappings_by_position: HashMap<JobPositionId, BTreeSet<RuleId>>,
    exceptions_by_employee: HashMap<EmployeeId, BTreeSet<RuleId>>,
    certifications: CertificationIndex,
}

impl RefreshSnapshot {
    /// Loads every source table the pass needs with one bulk read each.
    pub(crate) async fn load(
        sources: &dyn SourceSnapshotRepository,
        scope: RefreshScope,
    ) -> AppResult<Self> {
        let employees = sources.list_employees(scope).await?;
        let rules = sources.list_rules().await?;
        let mappings = sources.list_active_job_mappings(scope).await?;
        let exceptions = sources.list_active_manual_exceptions(scope).await?;
        let certifications = sources.list_certifications(scope).await?;

        Ok(Self::from_parts(
            employees,
            rules,
            mappings,
            exceptions,
            certifications,
        ))
    }

    pub(crate) fn from_parts(
        employees: Vec<Employee>,
        rules: Vec<CertificationRule>,
        mappings: Vec<JobMapping>,
        exceptions: Vec<ManualException>,
        certifications: Vec<EmployeeCertification>,
    ) -> Self {
        let mut mappings_by_position: HashMap<JobPositionId, BTreeSet<RuleId>> = HashMap::new();
        let mut exceptions_by_employee: HashMap<EmployeeId, BTreeSet<RuleId>> = HashMap::new();

        let assignments = mappings
            .into_iter()
            .map(RequirementAssignment::Job)
            .chain(exceptions.into_iter().map(RequirementAssignment::Manual))
            .filter(RequirementAssignment::is_effective);

        for assignment in assignments {
            let rule_id = assignment.rule_id();
            match assignment {
                RequirementAssignment::Job(mapping) => {
                    mappings_by_position
                        .entry(mapping.job_position_id)
                        .or_default()
                        .insert(rule_id);
                }
                RequirementAssignment::Manual(exception) => {
                    exceptions_by_employee
                        .entry(exception.employee_id)
                        .or_default()
                        .insert(rule_id);
                }
            }
        }

        Self {
            employees,
            rules: rules.into_iter().map(|rule| (rule.id, rule)).collect(),
            mappings_by_position,
            exceptions_by_employee,
            certifications: CertificationIndex::from_records(certifications),
        }
    }

    pub(crate) fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub(crate) fn rules(&self) -> &HashMap<RuleId, CertificationRule> {
        &self.rules
    }

    pub(crate) fn mappings_by_position(&self) -> &HashMap<JobPositionId, BTreeSet<RuleId>> {
        &self.mappings_by_position
    }

    pub(crate) fn exceptions_by_employee(&self) -> &HashMap<EmployeeId, BTreeSet<RuleId>> {
        &self.exceptions_by_employee
    }

    pub(crate) fn certifications(&self) -> &CertificationIndex {
        &self.certifications
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn groups_only_effective_assignments() {
        let snapshot = RefreshSnapshot::from_parts(
            Vec::new(),
            Vec::new(),
            vec![
                JobMapping {
                    job_position_id: JobPositionId::new(5),
                    rule_id: RuleId::new(1),
                    is_active: true,
                    deleted_at: None,
                },
                JobMapping {
                    job_position_id: JobPositionId::new(5),
                    rule_id: RuleId::new(2),
                    is_active: false,
                    deleted_at: None,
                },
            ],
            vec![ManualException {
                employee_id: EmployeeId::new(100),
                rule_id: RuleId::new(3),
                is_active: true,
                deleted_at: Some(Utc::now()),
            }],
            Vec::new(),
        );

        assert_eq!(
            snapshot.mappings_by_position().get(&JobPositionId::new(5)),
            Some(&BTreeSet::from([RuleId::new(1)]))
        );
        assert!(snapshot.exceptions_by_employee().is_empty());
        assert!(snapshot.certifications().is_empty());
    }
}
