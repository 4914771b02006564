use std::collections::{BTreeSet, HashMap};

use certwatch_domain::{
    EligibilitySource, Employee, EmployeeId, JobPositionId, RequirementKey, RuleId,
};

/// Rule sets required for one employee, split by channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRequirements {
    /// Rules inherited from the employee's job position.
    pub mapping_rules: BTreeSet<RuleId>,
    /// Rules manually assigned to the employee.
    pub manual_rules: BTreeSet<RuleId>,
}

impl ResolvedRequirements {
    /// Returns the required `(rule, source)` keys.
    ///
    /// A rule required through both channels yields one key per channel.
    #[must_use]
    pub fn required_keys(&self) -> BTreeSet<RequirementKey> {
        let by_job = self.mapping_rules.iter().map(|rule_id| RequirementKey {
            rule_id: *rule_id,
            source: EligibilitySource::ByJob,
        });
        let by_name = self.manual_rules.iter().map(|rule_id| RequirementKey {
            rule_id: *rule_id,
            source: EligibilitySource::ByName,
        });

        by_job.chain(by_name).collect()
    }
}

/// Resolves the rules required for an employee from pre-grouped source maps.
///
/// An employee without a job position simply has no mapping rules.
#[must_use]
pub fn resolve_requirements(
    employee: &Employee,
    mappings_by_position: &HashMap<JobPositionId, BTreeSet<RuleId>>,
    exceptions_by_employee: &HashMap<EmployeeId, BTreeSet<RuleId>>,
) -> ResolvedRequirements {
    let mapping_rules = employee
        .job_position_id()
        .and_then(|job_position_id| mappings_by_position.get(&job_position_id))
        .cloned()
        .unwrap_or_default();
    let manual_rules = exceptions_by_employee
        .get(&employee.id)
        .cloned()
        .unwrap_or_default();

    ResolvedRequirements {
        mapping_rules,
        manual_rules,
    }
}

#[cfg(test)]
mod tests {
    use certwatch_domain::JobPosition;

    use super::*;

    fn employee(id: i64, job_position_id: Option<i64>) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            nip: format!("NIP-{id}"),
            name: format!("Employee {id}"),
            job_position: job_position_id.map(|value| JobPosition {
                id: JobPositionId::new(value),
                name: format!("Position {value}"),
            }),
            join_date: None,
        }
    }

    fn rules(ids: &[i64]) -> BTreeSet<RuleId> {
        ids.iter().copied().map(RuleId::new).collect()
    }

    #[test]
    fn resolves_job_and_manual_rules_independently() {
        let mappings = HashMap::from([(JobPositionId::new(5), rules(&[1, 2]))]);
        let exceptions = HashMap::from([(EmployeeId::new(100), rules(&[2, 3]))]);

        let resolved = resolve_requirements(&employee(100, Some(5)), &mappings, &exceptions);

        assert_eq!(resolved.mapping_rules, rules(&[1, 2]));
        assert_eq!(resolved.manual_rules, rules(&[2, 3]));

        let keys = resolved.required_keys();
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&RequirementKey {
            rule_id: RuleId::new(2),
            source: EligibilitySource::ByJob,
        }));
        assert!(keys.contains(&RequirementKey {
            rule_id: RuleId::new(2),
            source: EligibilitySource::ByName,
        }));
    }

    #[test]
    fn employee_without_job_position_has_no_mapping_rules() {
        let mappings = HashMap::from([(JobPositionId::new(5), rules(&[1]))]);
        let exceptions = HashMap::new();

        let resolved = resolve_requirements(&employee(101, None), &mappings, &exceptions);

        assert!(resolved.mapping_rules.is_empty());
        assert!(resolved.manual_rules.is_empty());
        assert!(resolved.required_keys().is_empty());
    }
}
