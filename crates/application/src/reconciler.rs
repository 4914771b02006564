use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use certwatch_domain::{
    CertificationRule, EmployeeEligibility, EmployeeId, RequirementKey, RuleId,
};

use crate::eligibility_ports::{EligibilityChange, EligibilityChangeKind};
use crate::requirement_resolver::ResolvedRequirements;

/// Writes needed to make one employee's stored rows match their required set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Row writes, at most one per row.
    pub changes: Vec<EligibilityChange>,
    /// Required rules skipped because the catalog no longer has them and no
    /// prior row holds a snapshot of their terms.
    pub missing_rules: Vec<RuleId>,
    /// Required rules missing from the catalog whose existing rows keep their
    /// last snapshot.
    pub stale_rules: Vec<RuleId>,
}

#[derive(Default)]
struct KeyedRows {
    live: Vec<EmployeeEligibility>,
    tombstoned: Vec<EmployeeEligibility>,
}

/// Diffs an employee's required set against their stored rows.
///
/// `existing` must contain the employee's rows in both lifecycle states so a
/// withdrawn requirement that reappears resurrects its old row instead of
/// creating a new one. Rows whose values would not change produce no write.
#[must_use]
pub fn reconcile_employee(
    employee_id: EmployeeId,
    required: &ResolvedRequirements,
    existing: &[EmployeeEligibility],
    catalog: &HashMap<RuleId, CertificationRule>,
    now: DateTime<Utc>,
) -> ReconcilePlan {
    let required_keys = required.required_keys();
    let mut rows_by_key = group_by_key(employee_id, existing);
    let mut plan = ReconcilePlan::default();

    for (key, rows) in &mut rows_by_key {
        if !required_keys.contains(key) {
            for mut row in rows.live.drain(..) {
                if row.tombstone(now) {
                    plan.push(EligibilityChangeKind::Tombstoned, row);
                }
            }
            continue;
        }

        let terms = catalog.get(&key.rule_id).map(|rule| rule.terms);
        if terms.is_none() {
            plan.stale_rules.push(key.rule_id);
        }

        let mut live = std::mem::take(&mut rows.live).into_iter();
        if let Some(mut keeper) = live.next() {
            let refreshed = terms.is_some_and(|terms| keeper.refresh_terms(terms, now));
            if refreshed {
                plan.push(EligibilityChangeKind::TermsRefreshed, keeper);
            }

            // Any later live duplicate collapses into the oldest row.
            for mut duplicate in live {
                if duplicate.tombstone(now) {
                    plan.push(EligibilityChangeKind::Tombstoned, duplicate);
                }
            }
            continue;
        }

        if let Some(mut revived) = rows.tombstoned.pop() {
            revived.reactivate(now);
            if let Some(terms) = terms {
                revived.refresh_terms(terms, now);
            }
            plan.push(EligibilityChangeKind::Resurrected, revived);
        }
    }

    for key in required_keys.difference(&rows_by_key.keys().copied().collect::<BTreeSet<_>>()) {
        match catalog.get(&key.rule_id) {
            Some(rule) => plan.push(
                EligibilityChangeKind::Created,
                EmployeeEligibility::new(employee_id, *key, rule.terms, now),
            ),
            None => plan.missing_rules.push(key.rule_id),
        }
    }

    plan
}

impl ReconcilePlan {
    fn push(&mut self, kind: EligibilityChangeKind, row: EmployeeEligibility) {
        self.changes.push(EligibilityChange { kind, row });
    }
}

fn group_by_key(
    employee_id: EmployeeId,
    existing: &[EmployeeEligibility],
) -> BTreeMap<RequirementKey, KeyedRows> {
    let mut rows_by_key: BTreeMap<RequirementKey, KeyedRows> = BTreeMap::new();

    for row in existing.iter().filter(|row| row.employee_id() == employee_id) {
        let entry = rows_by_key.entry(row.key()).or_default();
        if row.is_active() {
            entry.live.push(row.clone());
        } else {
            entry.tombstoned.push(row.clone());
        }
    }

    for rows in rows_by_key.values_mut() {
        rows.live.sort_by_key(|row| (row.created_at(), row.id()));
        // The most recently withdrawn row is the one that comes back.
        rows.tombstoned
            .sort_by_key(|row| (row.deleted_at(), row.created_at(), row.id()));
    }

    rows_by_key
}
