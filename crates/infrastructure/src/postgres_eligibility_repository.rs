use async_trait::async_trait;
use certwatch_application::{
    EligibilityChange, EligibilityChangeKind, EligibilityRepository, EligibilityRowQuery,
    EligibilityStatusUpdate,
};
use certwatch_core::{AppError, AppResult};
use certwatch_domain::{
    EligibilityId, EligibilityLifecycle, EligibilitySource, EligibilityStatus,
    EmployeeEligibility, EmployeeEligibilityParts, EmployeeId, RuleId, RuleTerms,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

mod listing;
mod writes;


/// PostgreSQL-backed eligibility repository.
#[derive(Clone)]
pub struct PostgresEligibilityRepository {
    pool: PgPool,
}

impl PostgresEligibilityRepository {
    /// Creates an eligibility repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EligibilityRow {
    id: Uuid,
    employee_id: i64,
    certification_rule_id: i64,
    source: String,
    status: String,
    due_date: Option<NaiveDate>,
    validity_months: i32,
    reminder_months: i32,
    required_after_join_months: Option<i32>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const ELIGIBILITY_COLUMNS: &str = r#"
    id,
    employee_id,
    certification_rule_id,
    source,
    status,
    due_date,
    validity_months,
    reminder_months,
    required_after_join_months,
    is_active,
    deleted_at,
    created_at,
    updated_at
"#;

#[async_trait]
impl EligibilityRepository for PostgresEligibilityRepository {
    async fn list_rows(&self, query: EligibilityRowQuery) -> AppResult<Vec<EmployeeEligibility>> {
        let employee_ids: Vec<i64> = query.employee_ids.iter().map(EmployeeId::as_i64).collect();
        let statuses: Vec<&str> = query.statuses.iter().map(EligibilityStatus::as_str).collect();
        let sources: Vec<&str> = query.sources.iter().map(EligibilitySource::as_str).collect();

        let rows = sqlx::query_as::<_, EligibilityRow>(&format!(
            r#"
            SELECT {ELIGIBILITY_COLUMNS}
            FROM employee_eligibilities
            WHERE (cardinality($1::BIGINT[]) = 0 OR employee_id = ANY($1))
              AND ($2 OR deleted_at IS NULL)
              AND (cardinality($3::TEXT[]) = 0 OR status = ANY($3))
              AND (cardinality($4::TEXT[]) = 0 OR source = ANY($4))
            ORDER BY employee_id, certification_rule_id, source, created_at
            "#
        ))
        .bind(employee_ids)
        .bind(query.include_tombstoned)
        .bind(statuses)
        .bind(sources)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list eligibility rows: {error}"))
        })?;

        rows.into_iter().map(eligibility_from_row).collect()
    }

    async fn find_row(&self, id: EligibilityId) -> AppResult<Option<EmployeeEligibility>> {
        let row = sqlx::query_as::<_, EligibilityRow>(&format!(
            r#"
            SELECT {ELIGIBILITY_COLUMNS}
            FROM employee_eligibilities
            WHERE id = $1
            "#
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find eligibility row '{id}': {error}"))
        })?;

        row.map(eligibility_from_row).transpose()
    }

    async fn apply_changes(
        &self,
        changes: Vec<EligibilityChange>,
    ) -> AppResult<Vec<EligibilityId>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start eligibility reconciliation transaction: {error}"
            ))
        })?;

        let mut written = Vec::with_capacity(changes.len());
        for change in &changes {
            let id = match change.kind {
                EligibilityChangeKind::Created => {
                    writes::insert_or_fold(&mut transaction, &change.row).await?
                }
                EligibilityChangeKind::Resurrected => {
                    writes::resurrect_or_fold(&mut transaction, &change.row).await?
                }
                EligibilityChangeKind::Tombstoned | EligibilityChangeKind::TermsRefreshed => {
                    writes::overwrite_lifecycle_and_terms(&mut transaction, &change.row).await?
                }
            };
            written.push(id);
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit eligibility reconciliation transaction: {error}"
            ))
        })?;

        Ok(written)
    }

    async fn save_statuses(&self, updates: Vec<EligibilityStatusUpdate>) -> AppResult<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Uuid> = updates.iter().map(|update| update.id.as_uuid()).collect();
        let statuses: Vec<&str> = updates.iter().map(|update| update.status.as_str()).collect();
        let due_dates: Vec<Option<NaiveDate>> =
            updates.iter().map(|update| update.due_date).collect();
        let updated_at: Vec<DateTime<Utc>> =
            updates.iter().map(|update| update.updated_at).collect();

        let result = sqlx::query(
            r#"
            UPDATE employee_eligibilities AS eligibility
            SET
                status = input.status,
                due_date = input.due_date,
                updated_at = input.updated_at
            FROM UNNEST($1::UUID[], $2::TEXT[], $3::DATE[], $4::TIMESTAMPTZ[])
                AS input(id, status, due_date, updated_at)
            WHERE eligibility.id = input.id
              AND eligibility.deleted_at IS NULL
            "#,
        )
        .bind(ids)
        .bind(statuses)
        .bind(due_dates)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save eligibility statuses: {error}"))
        })?;

        usize::try_from(result.rows_affected()).map_err(|error| {
            AppError::Internal(format!("invalid updated eligibility row count: {error}"))
        })
    }
}

fn eligibility_from_row(row: EligibilityRow) -> AppResult<EmployeeEligibility> {
    Ok(EmployeeEligibility::from_parts(EmployeeEligibilityParts {
        id: EligibilityId::from_uuid(row.id),
        employee_id: EmployeeId::new(row.employee_id),
        rule_id: RuleId::new(row.certification_rule_id),
        source: row.source.parse()?,
        status: row.status.parse()?,
        due_date: row.due_date,
        terms: RuleTerms {
            validity_months: months_from_column("validity_months", row.validity_months)?,
            reminder_months: months_from_column("reminder_months", row.reminder_months)?,
            required_after_join_months: row
                .required_after_join_months
                .map(|value| months_from_column("required_after_join_months", value))
                .transpose()?,
        },
        lifecycle: EligibilityLifecycle::from_columns(row.is_active, row.deleted_at)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(crate) fn months_from_column(column: &str, value: i32) -> AppResult<u32> {
    u32::try_from(value).map_err(|error| {
        AppError::DataIntegrity(format!("invalid {column} value {value}: {error}"))
    })
}

fn months_to_column(value: u32) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|error| AppError::Validation(format!("invalid month count {value}: {error}")))
}
