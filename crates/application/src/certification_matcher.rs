use std::collections::HashMap;

use certwatch_domain::{EmployeeCertification, EmployeeId, RuleId};

/// Latest usable certification per `(employee, rule)`, built from one bulk read.
#[derive(Debug, Clone, Default)]
pub struct CertificationIndex {
    latest: HashMap<(EmployeeId, RuleId), EmployeeCertification>,
}

impl CertificationIndex {
    /// Builds the index, keeping only the newest usable record per pair.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = EmployeeCertification>) -> Self {
        let mut latest: HashMap<(EmployeeId, RuleId), EmployeeCertification> = HashMap::new();

        for record in records.into_iter().filter(EmployeeCertification::is_usable) {
            let key = (record.employee_id, record.rule_id);
            match latest.get(&key) {
                Some(current) if !record.supersedes(current) => {}
                _ => {
                    latest.insert(key, record);
                }
            }
        }

        Self { latest }
    }

    /// Returns the latest certification an employee holds for a rule.
    #[must_use]
    pub fn latest(
        &self,
        employee_id: EmployeeId,
        rule_id: RuleId,
    ) -> Option<&EmployeeCertification> {
        self.latest.get(&(employee_id, rule_id))
    }

    /// Returns the number of indexed pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// Returns whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn record(id: i64, rule_id: i64, cert_date: Option<(i32, u32, u32)>) -> EmployeeCertification {
        let cert_date =
            cert_date.and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day));
        EmployeeCertification {
            id,
            employee_id: EmployeeId::new(100),
            rule_id: RuleId::new(rule_id),
            cert_date,
            valid_until: None,
            reminder_date: None,
            deleted_at: None,
        }
    }

    #[test]
    fn keeps_latest_certification_date_per_pair() {
        let index = CertificationIndex::from_records(vec![
            record(1, 1, Some((2022, 3, 1))),
            record(2, 1, Some((2023, 6, 1))),
            record(3, 1, Some((2021, 1, 1))),
            record(4, 2, Some((2020, 1, 1))),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(
            index
                .latest(EmployeeId::new(100), RuleId::new(1))
                .map(|found| found.id),
            Some(2)
        );
        assert!(index.latest(EmployeeId::new(101), RuleId::new(1)).is_none());
    }

    #[test]
    fn skips_deleted_and_undated_records() {
        let mut deleted = record(5, 1, Some((2024, 1, 1)));
        deleted.deleted_at = Some(Utc::now());

        let index = CertificationIndex::from_records(vec![
            record(1, 1, Some((2022, 1, 1))),
            deleted,
            record(6, 1, None),
        ]);

        assert_eq!(
            index
                .latest(EmployeeId::new(100), RuleId::new(1))
                .map(|found| found.id),
            Some(1)
        );
    }

    #[test]
    fn equal_dates_prefer_the_newer_record() {
        let index = CertificationIndex::from_records(vec![
            record(9, 1, Some((2023, 6, 1))),
            record(4, 1, Some((2023, 6, 1))),
        ]);

        assert_eq!(
            index
                .latest(EmployeeId::new(100), RuleId::new(1))
                .map(|found| found.id),
            Some(9)
        );
    }
}
