use tracing::info;

use certwatch_core::{AppError, AppResult};
use certwatch_domain::{EligibilityId, EmployeeEligibility};

use crate::eligibility_ports::{
    EligibilityChange, EligibilityChangeKind, EligibilityRowQuery, EligibilityView,
};

use super::EligibilityService;

impl EligibilityService {
    /// Flips a row between live and tombstoned.
    ///
    /// The next refresh still reconciles the row against its requirement: a
    /// tombstoned row whose requirement persists is resurrected, and a revived
    /// row whose requirement is gone is tombstoned again.
    pub async fn toggle_active(&self, id: EligibilityId) -> AppResult<EligibilityView> {
        let mut row = self.require_row(id).await?;
        let now = self.clock.now();

        let kind = if row.is_active() {
            row.tombstone(now);
            EligibilityChangeKind::Tombstoned
        } else {
            self.ensure_no_live_twin(&row).await?;
            row.reactivate(now);
            EligibilityChangeKind::Resurrected
        };

        let written = self
            .repository
            .apply_changes(vec![EligibilityChange { kind, row }])
            .await?;

        // A revival may fold into a twin that went live in the meantime, so
        // the stored row the write landed on is the one reported back.
        let written_id = written.first().copied().unwrap_or(id);
        let stored = self.require_row(written_id).await?;
        info!(
            eligibility_id = %id,
            written_id = %written_id,
            employee_id = %stored.employee_id(),
            is_active = stored.is_active(),
            "eligibility toggled manually"
        );

        self.project_row(&stored).await
    }

    /// Tombstones a row. Deleting an already tombstoned row changes nothing.
    pub async fn soft_delete(&self, id: EligibilityId) -> AppResult<()> {
        let mut row = self.require_row(id).await?;

        if row.tombstone(self.clock.now()) {
            self.repository
                .apply_changes(vec![EligibilityChange {
                    kind: EligibilityChangeKind::Tombstoned,
                    row: row.clone(),
                }])
                .await?;
            info!(
                eligibility_id = %id,
                employee_id = %row.employee_id(),
                "eligibility soft-deleted manually"
            );
        }

        Ok(())
    }

    pub(super) async fn require_row(&self, id: EligibilityId) -> AppResult<EmployeeEligibility> {
        self.repository
            .find_row(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("eligibility {id} does not exist")))
    }

    async fn ensure_no_live_twin(&self, row: &EmployeeEligibility) -> AppResult<()> {
        let live_rows = self
            .repository
            .list_rows(EligibilityRowQuery {
                employee_ids: vec![row.employee_id()],
                ..EligibilityRowQuery::default()
            })
            .await?;

        if live_rows
            .iter()
            .any(|live| live.key() == row.key() && live.id() != row.id())
        {
            return Err(AppError::Conflict(format!(
                "employee {} already has a live {} eligibility for rule {}",
                row.employee_id(),
                row.source().as_str(),
                row.rule_id()
            )));
        }

        Ok(())
    }
}
