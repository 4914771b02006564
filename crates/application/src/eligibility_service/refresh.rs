use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use certwatch_core::{AppError, AppResult};
use certwatch_domain::{EligibilityId, EmployeeEligibility, EmployeeId, derive_status};

use crate::eligibility_ports::{EligibilityRowQuery, EligibilityStatusUpdate, RefreshScope};
use crate::reconciler::reconcile_employee;
use crate::refresh_snapshot::RefreshSnapshot;
use crate::requirement_resolver::{ResolvedRequirements, resolve_requirements};

use super::{EligibilityService, EmployeeRefreshFailure, RefreshReport};

impl EligibilityService {
    /// Reconciles and status-syncs every employee in the directory.
    ///
    /// Live rows of employees no longer listed in the directory are
    /// tombstoned. A failure for one employee is recorded in the report and
    /// does not stop the pass.
    pub async fn refresh_all(&self) -> AppResult<RefreshReport> {
        self.run_refresh(RefreshScope::All).await
    }

    /// Reconciles and status-syncs a single employee, typically right after
    /// their job position or manual exceptions changed.
    ///
    /// An employee missing from the directory is only reported as not found
    /// when no live row is left to withdraw.
    pub async fn refresh_employee(&self, employee_id: EmployeeId) -> AppResult<RefreshReport> {
        let report = self.run_refresh(RefreshScope::Employee(employee_id)).await?;

        if let Some(failure) = report.failures.first() {
            return Err(AppError::Internal(format!(
                "failed to refresh eligibility for employee {employee_id}: {}",
                failure.reason
            )));
        }

        Ok(report)
    }

    async fn run_refresh(&self, scope: RefreshScope) -> AppResult<RefreshReport> {
        let now = self.clock.now();
        let today = self.clock.today();

        let snapshot = RefreshSnapshot::load(self.sources.as_ref(), scope).await?;
        let existing = self
            .repository
            .list_rows(EligibilityRowQuery::all_in_scope(scope))
            .await?;
        let mut rows_by_employee: HashMap<EmployeeId, Vec<EmployeeEligibility>> = HashMap::new();
        for row in existing {
            rows_by_employee
                .entry(row.employee_id())
                .or_default()
                .push(row);
        }

        let mut targets: Vec<(EmployeeId, ResolvedRequirements)> = snapshot
            .employees()
            .iter()
            .map(|employee| {
                let required = resolve_requirements(
                    employee,
                    snapshot.mappings_by_position(),
                    snapshot.exceptions_by_employee(),
                );
                (employee.id, required)
            })
            .collect();

        // Employees that left the directory still own live rows; an empty
        // required set tombstones them.
        let listed: HashSet<EmployeeId> = snapshot
            .employees()
            .iter()
            .map(|employee| employee.id)
            .collect();
        let mut departed: Vec<EmployeeId> = rows_by_employee
            .iter()
            .filter(|(employee_id, rows)| {
                !listed.contains(employee_id) && rows.iter().any(EmployeeEligibility::is_active)
            })
            .map(|(employee_id, _)| *employee_id)
            .collect();
        departed.sort_unstable();

        if let RefreshScope::Employee(employee_id) = scope
            && targets.is_empty()
            && departed.is_empty()
        {
            return Err(AppError::NotFound(format!(
                "employee {employee_id} does not exist"
            )));
        }

        for employee_id in departed {
            info!(
                employee_id = %employee_id,
                "employee left the directory; withdrawing eligibility rows"
            );
            targets.push((employee_id, ResolvedRequirements::default()));
        }

        let mut report = RefreshReport::default();
        let mut touched: HashSet<EligibilityId> = HashSet::new();
        let mut failed: HashSet<EmployeeId> = HashSet::new();

        for (employee_id, required) in targets {
            report.employees_processed += 1;

            let rows = rows_by_employee
                .get(&employee_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let plan = reconcile_employee(employee_id, &required, rows, snapshot.rules(), now);

            for rule_id in &plan.missing_rules {
                warn!(
                    employee_id = %employee_id,
                    rule_id = %rule_id,
                    "required rule is missing from the catalog; requirement skipped"
                );
            }
            for rule_id in &plan.stale_rules {
                warn!(
                    employee_id = %employee_id,
                    rule_id = %rule_id,
                    "required rule is missing from the catalog; keeping last snapshot"
                );
            }
            report.skipped_requirements += plan.missing_rules.len();

            if plan.changes.is_empty() {
                continue;
            }

            match self.repository.apply_changes(plan.changes).await {
                Ok(written) => touched.extend(written),
                Err(error) => {
                    warn!(
                        employee_id = %employee_id,
                        error = %error,
                        "eligibility reconciliation failed"
                    );
                    failed.insert(employee_id);
                    report.failures.push(EmployeeRefreshFailure {
                        employee_id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        // Status sync reads the rows reconciliation just wrote, so it only
        // starts once every employee in scope has been reconciled.
        let live_rows = self
            .repository
            .list_rows(EligibilityRowQuery::live_in_scope(scope))
            .await?;
        let mut updates = Vec::new();
        for mut row in live_rows {
            if failed.contains(&row.employee_id()) {
                continue;
            }

            let certification = snapshot
                .certifications()
                .latest(row.employee_id(), row.rule_id());
            if row.apply_status(derive_status(certification, today), now) {
                updates.push(EligibilityStatusUpdate::from(&row));
            }
        }

        if !updates.is_empty() {
            touched.extend(updates.iter().map(|update| update.id));
            self.repository.save_statuses(updates).await?;
        }

        report.rows_touched = touched.len();
        info!(
            scope = ?scope,
            employees = report.employees_processed,
            rows_touched = report.rows_touched,
            skipped_requirements = report.skipped_requirements,
            failed_employees = report.failures.len(),
            "eligibility refresh completed"
        );

        Ok(report)
    }
}
