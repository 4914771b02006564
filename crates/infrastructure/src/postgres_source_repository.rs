use async_trait::async_trait;
use certwatch_application::{RefreshScope, SourceSnapshotRepository};
use certwatch_core::{AppError, AppResult};
use certwatch_domain::{
    CertificationRule, Employee, EmployeeCertification, EmployeeId, JobMapping, JobPosition,
    JobPositionId, ManualException, RuleId, RuleTerms,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use crate::postgres_eligibility_repository::months_from_column;


/// PostgreSQL reader over the externally owned employee, rule and
/// certification tables.
#[derive(Clone)]
pub struct PostgresSourceRepository {
    pool: PgPool,
}

impl PostgresSourceRepository {
    /// Creates a source reader with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: i64,
    nip: String,
    name: String,
    job_position_id: Option<i64>,
    job_position_name: Option<String>,
    join_date: Option<NaiveDate>,
}

#[derive(Debug, FromRow)]
struct RuleRow {
    id: i64,
    certification_code: String,
    certification_name: String,
    level_name: Option<String>,
    level: Option<i32>,
    sub_field_code: Option<String>,
    sub_field_name: Option<String>,
    validity_months: i32,
    reminder_months: i32,
    required_after_join_months: Option<i32>,
}

#[derive(Debug, FromRow)]
struct JobMappingRow {
    job_position_id: i64,
    certification_rule_id: i64,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct ManualExceptionRow {
    employee_id: i64,
    certification_rule_id: i64,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct CertificationRow {
    id: i64,
    employee_id: i64,
    certification_rule_id: i64,
    cert_date: Option<NaiveDate>,
    valid_until: Option<NaiveDate>,
    reminder_date: Option<NaiveDate>,
    deleted_at: Option<DateTime<Utc>>,
}

fn scoped_employee(scope: RefreshScope) -> Option<i64> {
    scope.employee_id().map(|employee_id| employee_id.as_i64())
}

#[async_trait]
impl SourceSnapshotRepository for PostgresSourceRepository {
    async fn list_employees(&self, scope: RefreshScope) -> AppResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT
                employee.id,
                employee.nip,
                employee.name,
                employee.job_position_id,
                position.name AS job_position_name,
                employee.join_date
            FROM employees AS employee
            LEFT JOIN job_positions AS position ON position.id = employee.job_position_id
            WHERE employee.deleted_at IS NULL
              AND ($1::BIGINT IS NULL OR employee.id = $1)
            ORDER BY employee.id
            "#,
        )
        .bind(scoped_employee(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list employees: {error}")))?;

        Ok(rows.into_iter().map(employee_from_row).collect())
    }

    async fn list_rules(&self) -> AppResult<Vec<CertificationRule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT
                id,
                certification_code,
                certification_name,
                level_name,
                level,
                sub_field_code,
                sub_field_name,
                validity_months,
                reminder_months,
                required_after_join_months
            FROM certification_rules
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list certification rules: {error}"))
        })?;

        rows.into_iter().map(rule_from_row).collect()
    }

    async fn list_active_job_mappings(&self, scope: RefreshScope) -> AppResult<Vec<JobMapping>> {
        let rows = sqlx::query_as::<_, JobMappingRow>(
            r#"
            SELECT
                mapping.job_position_id,
                mapping.certification_rule_id,
                mapping.is_active,
                mapping.deleted_at
            FROM job_certification_mappings AS mapping
            WHERE mapping.is_active
              AND mapping.deleted_at IS NULL
              AND (
                  $1::BIGINT IS NULL
                  OR mapping.job_position_id = (
                      SELECT employee.job_position_id
                      FROM employees AS employee
                      WHERE employee.id = $1
                  )
              )
            "#,
        )
        .bind(scoped_employee(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list job certification mappings: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| JobMapping {
                job_position_id: JobPositionId::new(row.job_position_id),
                rule_id: RuleId::new(row.certification_rule_id),
                is_active: row.is_active,
                deleted_at: row.deleted_at,
            })
            .collect())
    }

    async fn list_active_manual_exceptions(
        &self,
        scope: RefreshScope,
    ) -> AppResult<Vec<ManualException>> {
        let rows = sqlx::query_as::<_, ManualExceptionRow>(
            r#"
            SELECT employee_id, certification_rule_id, is_active, deleted_at
            FROM employee_certification_exceptions
            WHERE is_active
              AND deleted_at IS NULL
              AND ($1::BIGINT IS NULL OR employee_id = $1)
            "#,
        )
        .bind(scoped_employee(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list employee certification exceptions: {error}"
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| ManualException {
                employee_id: EmployeeId::new(row.employee_id),
                rule_id: RuleId::new(row.certification_rule_id),
                is_active: row.is_active,
                deleted_at: row.deleted_at,
            })
            .collect())
    }

    async fn list_certifications(
        &self,
        scope: RefreshScope,
    ) -> AppResult<Vec<EmployeeCertification>> {
        let rows = sqlx::query_as::<_, CertificationRow>(
            r#"
            SELECT
                id,
                employee_id,
                certification_rule_id,
                cert_date,
                valid_until,
                reminder_date,
                deleted_at
            FROM employee_certifications
            WHERE deleted_at IS NULL
              AND ($1::BIGINT IS NULL OR employee_id = $1)
            "#,
        )
        .bind(scoped_employee(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list employee certifications: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| EmployeeCertification {
                id: row.id,
                employee_id: EmployeeId::new(row.employee_id),
                rule_id: RuleId::new(row.certification_rule_id),
                cert_date: row.cert_date,
                valid_until: row.valid_until,
                reminder_date: row.reminder_date,
                deleted_at: row.deleted_at,
            })
            .collect())
    }
}

fn employee_from_row(row: EmployeeRow) -> Employee {
    let job_position = row.job_position_id.map(|id| JobPosition {
        id: JobPositionId::new(id),
        name: row.job_position_name.unwrap_or_default(),
    });

    Employee {
        id: EmployeeId::new(row.id),
        nip: row.nip,
        name: row.name,
        job_position,
        join_date: row.join_date,
    }
}

fn rule_from_row(row: RuleRow) -> AppResult<CertificationRule> {
    Ok(CertificationRule {
        id: RuleId::new(row.id),
        certification_code: row.certification_code,
        certification_name: row.certification_name,
        level_name: row.level_name,
        level: row.level,
        sub_field_code: row.sub_field_code,
        sub_field_name: row.sub_field_name,
        terms: RuleTerms {
            validity_months: months_from_column("validity_months", row.validity_months)?,
            reminder_months: months_from_column("reminder_months", row.reminder_months)?,
            required_after_join_months: row
                .required_after_join_months
                .map(|value| months_from_column("required_after_join_months", value))
                .transpose()?,
        },
    })
}
