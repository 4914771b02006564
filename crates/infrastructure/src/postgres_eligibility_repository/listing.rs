use certwatch_application::{
    EligibilityListQuery, EligibilityListingRepository, ListedEligibility, ListedEligibilityPage,
};
use certwatch_domain::{CertificationRule, Employee, JobPosition, JobPositionId};

use super::*;

/// Live rows joined with their directory and catalog entries, narrowed by
/// the listing filters. Binds `$1` to `$8`.
const LISTED_ROWS: &str = r#"
    SELECT
        eligibility.id,
        eligibility.employee_id,
        eligibility.certification_rule_id,
        eligibility.source,
        eligibility.status,
        eligibility.due_date,
        eligibility.validity_months,
        eligibility.reminder_months,
        eligibility.required_after_join_months,
        eligibility.is_active,
        eligibility.deleted_at,
        eligibility.created_at,
        eligibility.updated_at,
        employee.id IS NOT NULL AS employee_listed,
        employee.nip,
        employee.name AS employee_name,
        employee.job_position_id,
        CASE
            WHEN employee.job_position_id IS NULL THEN NULL
            ELSE COALESCE(job_position.name, '')
        END AS job_title,
        employee.join_date,
        catalog.id IS NOT NULL AS rule_listed,
        catalog.certification_code,
        catalog.certification_name,
        catalog.level_name,
        catalog.level,
        catalog.sub_field_code,
        catalog.sub_field_name,
        catalog.validity_months AS rule_validity_months,
        catalog.reminder_months AS rule_reminder_months,
        catalog.required_after_join_months AS rule_required_after_join_months,
        CASE eligibility.status
            WHEN 'NOT_YET_CERTIFIED' THEN 0
            WHEN 'ACTIVE' THEN 1
            WHEN 'DUE' THEN 2
            ELSE 3
        END AS status_rank
    FROM employee_eligibilities AS eligibility
    LEFT JOIN employees AS employee
        ON employee.id = eligibility.employee_id
       AND employee.deleted_at IS NULL
    LEFT JOIN job_positions AS job_position
        ON job_position.id = employee.job_position_id
    LEFT JOIN certification_rules AS catalog
        ON catalog.id = eligibility.certification_rule_id
       AND catalog.deleted_at IS NULL
    WHERE eligibility.deleted_at IS NULL
      AND (cardinality($1::BIGINT[]) = 0 OR eligibility.employee_id = ANY($1))
      AND (cardinality($2::BIGINT[]) = 0 OR employee.job_position_id = ANY($2))
      AND (cardinality($3::TEXT[]) = 0 OR lower(catalog.certification_code) = ANY($3))
      AND (cardinality($4::INT[]) = 0 OR catalog.level = ANY($4))
      AND (cardinality($5::TEXT[]) = 0 OR lower(catalog.sub_field_code) = ANY($5))
      AND (cardinality($6::TEXT[]) = 0 OR eligibility.status = ANY($6))
      AND (cardinality($7::TEXT[]) = 0 OR eligibility.source = ANY($7))
      AND (
          $8::TEXT IS NULL
          OR strpos(lower(employee.nip), $8) > 0
          OR strpos(lower(employee.name), $8) > 0
          OR strpos(lower(job_position.name), $8) > 0
          OR strpos(lower(catalog.certification_code), $8) > 0
          OR strpos(lower(catalog.certification_name), $8) > 0
          OR strpos(lower(catalog.sub_field_name), $8) > 0
          OR strpos(lower(eligibility.source), $8) > 0
      )
"#;

#[derive(Debug, FromRow)]
struct ListedRow {
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
    employee_listed: bool,
    nip: Option<String>,
    employee_name: Option<String>,
    job_position_id: Option<i64>,
    job_title: Option<String>,
    join_date: Option<NaiveDate>,
    rule_listed: bool,
    certification_code: Option<String>,
    certification_name: Option<String>,
    level_name: Option<String>,
    level: Option<i32>,
    sub_field_code: Option<String>,
    sub_field_name: Option<String>,
    rule_validity_months: Option<i32>,
    rule_reminder_months: Option<i32>,
    rule_required_after_join_months: Option<i32>,
}

/// Filter values bound to `LISTED_ROWS`, normalized the way the SQL compares
/// them.
struct ListingBinds {
    employee_ids: Vec<i64>,
    job_position_ids: Vec<i64>,
    certification_codes: Vec<String>,
    levels: Vec<i32>,
    sub_field_codes: Vec<String>,
    statuses: Vec<&'static str>,
    sources: Vec<&'static str>,
    search: Option<String>,
}

impl ListingBinds {
    fn from_query(query: &EligibilityListQuery) -> Self {
        Self {
            employee_ids: query.employee_ids.iter().map(EmployeeId::as_i64).collect(),
            job_position_ids: query
                .job_position_ids
                .iter()
                .map(JobPositionId::as_i64)
                .collect(),
            certification_codes: query
                .certification_codes
                .iter()
                .map(|code| code.to_ascii_lowercase())
                .collect(),
            levels: query.levels.clone(),
            sub_field_codes: query
                .sub_field_codes
                .iter()
                .map(|code| code.to_ascii_lowercase())
                .collect(),
            statuses: query.statuses.iter().map(EligibilityStatus::as_str).collect(),
            sources: query.sources.iter().map(EligibilitySource::as_str).collect(),
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_lowercase),
        }
    }
}

#[async_trait]
impl EligibilityListingRepository for PostgresEligibilityRepository {
    async fn list_page(&self, query: &EligibilityListQuery) -> AppResult<ListedEligibilityPage> {
        let binds = ListingBinds::from_query(query);
        let limit = i64::try_from(query.size)
            .map_err(|_| AppError::Validation(format!("page size {} is too large", query.size)))?;
        let offset = query
            .page
            .checked_mul(query.size)
            .and_then(|offset| i64::try_from(offset).ok())
            .ok_or_else(|| AppError::Validation(format!("page {} is too large", query.page)))?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM ({LISTED_ROWS}) AS listed"
        ))
        .bind(binds.employee_ids.clone())
        .bind(binds.job_position_ids.clone())
        .bind(binds.certification_codes.clone())
        .bind(binds.levels.clone())
        .bind(binds.sub_field_codes.clone())
        .bind(binds.statuses.clone())
        .bind(binds.sources.clone())
        .bind(binds.search.clone())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count eligibility rows: {error}")))?;

        let rows = sqlx::query_as::<_, ListedRow>(&format!(
            r#"
            SELECT *
            FROM ({LISTED_ROWS}) AS listed
            ORDER BY
                job_title COLLATE "C" NULLS LAST,
                certification_code COLLATE "C" NULLS LAST,
                level NULLS LAST,
                sub_field_code COLLATE "C" NULLS LAST,
                status_rank,
                employee_id,
                certification_rule_id,
                source COLLATE "C"
            LIMIT $9 OFFSET $10
            "#
        ))
        .bind(binds.employee_ids)
        .bind(binds.job_position_ids)
        .bind(binds.certification_codes)
        .bind(binds.levels)
        .bind(binds.sub_field_codes)
        .bind(binds.statuses)
        .bind(binds.sources)
        .bind(binds.search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list eligibility page: {error}")))?;

        Ok(ListedEligibilityPage {
            rows: rows
                .into_iter()
                .map(listed_from_row)
                .collect::<AppResult<Vec<_>>>()?,
            total: usize::try_from(total).map_err(|error| {
                AppError::Internal(format!("invalid eligibility row count {total}: {error}"))
            })?,
        })
    }
}

fn listed_from_row(row: ListedRow) -> AppResult<ListedEligibility> {
    let employee = row.employee_listed.then(|| Employee {
        id: EmployeeId::new(row.employee_id),
        nip: row.nip.unwrap_or_default(),
        name: row.employee_name.unwrap_or_default(),
        job_position: row.job_position_id.map(|id| JobPosition {
            id: JobPositionId::new(id),
            name: row.job_title.unwrap_or_default(),
        }),
        join_date: row.join_date,
    });

    let rule = match (
        row.rule_listed,
        row.rule_validity_months,
        row.rule_reminder_months,
    ) {
        (true, Some(validity_months), Some(reminder_months)) => Some(CertificationRule {
            id: RuleId::new(row.certification_rule_id),
            certification_code: row.certification_code.unwrap_or_default(),
            certification_name: row.certification_name.unwrap_or_default(),
            level_name: row.level_name,
            level: row.level,
            sub_field_code: row.sub_field_code,
            sub_field_name: row.sub_field_name,
            terms: RuleTerms {
                validity_months: months_from_column("validity_months", validity_months)?,
                reminder_months: months_from_column("reminder_months", reminder_months)?,
                required_after_join_months: row
                    .rule_required_after_join_months
                    .map(|value| months_from_column("required_after_join_months", value))
                    .transpose()?,
            },
        }),
        _ => None,
    };

    let stored = eligibility_from_row(EligibilityRow {
        id: row.id,
        employee_id: row.employee_id,
        certification_rule_id: row.certification_rule_id,
        source: row.source,
        status: row.status,
        due_date: row.due_date,
        validity_months: row.validity_months,
        reminder_months: row.reminder_months,
        required_after_join_months: row.required_after_join_months,
        is_active: row.is_active,
        deleted_at: row.deleted_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })?;

    Ok(ListedEligibility {
        row: stored,
        employee,
        rule,
    })
}
