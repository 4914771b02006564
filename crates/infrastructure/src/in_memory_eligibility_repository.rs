use std::collections::HashMap;

use async_trait::async_trait;
use certwatch_application::{
    EligibilityChange, EligibilityChangeKind, EligibilityRepository, EligibilityRowQuery,
    EligibilityStatusUpdate,
};
use certwatch_core::{AppError, AppResult};
use certwatch_domain::{EligibilityId, EmployeeEligibility};
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

/// In-memory eligibility repository implementation.
///
/// Enforces the same single-live-row-per-key rule as the PostgreSQL schema and
/// folds conflicting writes into the live row the same way.
#[derive(Debug, Default)]
pub struct InMemoryEligibilityRepository {
    rows: RwLock<HashMap<EligibilityId, EmployeeEligibility>>,
}

impl InMemoryEligibilityRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

fn live_twin(
    rows: &HashMap<EligibilityId, EmployeeEligibility>,
    row: &EmployeeEligibility,
) -> Option<EligibilityId> {
    rows.values()
        .find(|stored| {
            stored.is_active()
                && stored.id() != row.id()
                && stored.employee_id() == row.employee_id()
                && stored.key() == row.key()
        })
        .map(EmployeeEligibility::id)
}

fn fold_into(
    rows: &mut HashMap<EligibilityId, EmployeeEligibility>,
    twin_id: EligibilityId,
    row: &EmployeeEligibility,
) -> EligibilityId {
    if let Some(twin) = rows.get_mut(&twin_id) {
        twin.refresh_terms(row.terms(), row.updated_at());
    }
    twin_id
}

#[async_trait]
impl EligibilityRepository for InMemoryEligibilityRepository {
    async fn list_rows(&self, query: EligibilityRowQuery) -> AppResult<Vec<EmployeeEligibility>> {
        let rows = self.rows.read().await;

        let mut values: Vec<EmployeeEligibility> = rows
            .values()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        values.sort_by_key(|row| (row.employee_id(), row.key(), row.created_at()));

        Ok(values)
    }

    async fn find_row(&self, id: EligibilityId) -> AppResult<Option<EmployeeEligibility>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn apply_changes(
        &self,
        changes: Vec<EligibilityChange>,
    ) -> AppResult<Vec<EligibilityId>> {
        let mut rows = self.rows.write().await;
        // Work on a copy so a failing change leaves the batch unapplied.
        let mut staged = rows.clone();
        let mut written = Vec::with_capacity(changes.len());

        for change in changes {
            let id = match change.kind {
                EligibilityChangeKind::Created | EligibilityChangeKind::Resurrected => {
                    if change.kind == EligibilityChangeKind::Resurrected
                        && !staged.contains_key(&change.row.id())
                    {
                        return Err(AppError::NotFound(format!(
                            "eligibility {} does not exist",
                            change.row.id()
                        )));
                    }

                    match live_twin(&staged, &change.row) {
                        Some(twin_id) => fold_into(&mut staged, twin_id, &change.row),
                        None => {
                            let id = change.row.id();
                            staged.insert(id, change.row);
                            id
                        }
                    }
                }
                EligibilityChangeKind::Tombstoned | EligibilityChangeKind::TermsRefreshed => {
                    let id = change.row.id();
                    if !staged.contains_key(&id) {
                        return Err(AppError::NotFound(format!(
                            "eligibility {id} does not exist"
                        )));
                    }
                    staged.insert(id, change.row);
                    id
                }
            };
            written.push(id);
        }

        *rows = staged;
        Ok(written)
    }

    async fn save_statuses(&self, updates: Vec<EligibilityStatusUpdate>) -> AppResult<usize> {
        let mut rows = self.rows.write().await;
        let mut saved = 0;

        for update in updates {
            let Some(row) = rows.get_mut(&update.id).filter(|row| row.is_active()) else {
                continue;
            };

            let mut parts = row.to_parts();
            parts.status = update.status;
            parts.due_date = update.due_date;
            parts.updated_at = update.updated_at;
            *row = EmployeeEligibility::from_parts(parts);
            saved += 1;
        }

        Ok(saved)
    }
}
