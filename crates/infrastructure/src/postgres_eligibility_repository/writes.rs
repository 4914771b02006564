use sqlx::Connection;

use super::*;

/// Inserts a new live row. When a live row with the same key already exists
/// the insert folds into it and returns the existing identifier.
pub(super) async fn insert_or_fold(
    connection: &mut PgConnection,
    row: &EmployeeEligibility,
) -> AppResult<EligibilityId> {
    let terms = row.terms();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO employee_eligibilities (
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
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, NULL, $10, $11)
        ON CONFLICT (employee_id, certification_rule_id, source) WHERE deleted_at IS NULL
        DO UPDATE SET
            validity_months = EXCLUDED.validity_months,
            reminder_months = EXCLUDED.reminder_months,
            required_after_join_months = EXCLUDED.required_after_join_months,
            updated_at = CASE
                WHEN (
                    employee_eligibilities.validity_months,
                    employee_eligibilities.reminder_months,
                    employee_eligibilities.required_after_join_months
                ) IS DISTINCT FROM (
                    EXCLUDED.validity_months,
                    EXCLUDED.reminder_months,
                    EXCLUDED.required_after_join_months
                )
                THEN EXCLUDED.updated_at
                ELSE employee_eligibilities.updated_at
            END
        RETURNING id
        "#,
    )
    .bind(row.id().as_uuid())
    .bind(row.employee_id().as_i64())
    .bind(row.rule_id().as_i64())
    .bind(row.source().as_str())
    .bind(row.status().as_str())
    .bind(row.due_date())
    .bind(months_to_column(terms.validity_months)?)
    .bind(months_to_column(terms.reminder_months)?)
    .bind(terms.required_after_join_months.map(months_to_column).transpose()?)
    .bind(row.created_at())
    .bind(row.updated_at())
    .fetch_one(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to insert eligibility for employee '{}' and rule '{}': {error}",
            row.employee_id(),
            row.rule_id()
        ))
    })?;

    Ok(EligibilityId::from_uuid(id))
}

/// Clears the tombstone on a row. When another live row with the same key
/// appeared in the meantime the write folds into that row instead.
///
/// The update runs under a savepoint: a twin inserted by a concurrent writer
/// is invisible to the `NOT EXISTS` guard until it commits, and then surfaces
/// as a unique violation that must not abort the surrounding transaction.
pub(super) async fn resurrect_or_fold(
    connection: &mut PgConnection,
    row: &EmployeeEligibility,
) -> AppResult<EligibilityId> {
    let terms = row.terms();

    let mut savepoint = connection.begin().await.map_err(|error| {
        AppError::Internal(format!(
            "failed to open savepoint for eligibility '{}': {error}",
            row.id()
        ))
    })?;

    let resurrected = sqlx::query(
        r#"
        UPDATE employee_eligibilities AS eligibility
        SET
            is_active = TRUE,
            deleted_at = NULL,
            validity_months = $2,
            reminder_months = $3,
            required_after_join_months = $4,
            updated_at = $5
        WHERE eligibility.id = $1
          AND NOT EXISTS (
              SELECT 1
              FROM employee_eligibilities AS live
              WHERE live.employee_id = eligibility.employee_id
                AND live.certification_rule_id = eligibility.certification_rule_id
                AND live.source = eligibility.source
                AND live.deleted_at IS NULL
                AND live.id <> eligibility.id
          )
        "#,
    )
    .bind(row.id().as_uuid())
    .bind(months_to_column(terms.validity_months)?)
    .bind(months_to_column(terms.reminder_months)?)
    .bind(terms.required_after_join_months.map(months_to_column).transpose()?)
    .bind(row.updated_at())
    .execute(&mut *savepoint)
    .await;

    let resurrected = match resurrected {
        Ok(result) => {
            savepoint.commit().await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to release savepoint for eligibility '{}': {error}",
                    row.id()
                ))
            })?;
            result.rows_affected() == 1
        }
        Err(error) if is_unique_violation(&error) => {
            savepoint.rollback().await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to roll back savepoint for eligibility '{}': {error}",
                    row.id()
                ))
            })?;
            false
        }
        Err(error) => {
            return Err(AppError::Internal(format!(
                "failed to resurrect eligibility '{}': {error}",
                row.id()
            )));
        }
    };

    if resurrected {
        return Ok(row.id());
    }

    let twin = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE employee_eligibilities
        SET
            validity_months = $4,
            reminder_months = $5,
            required_after_join_months = $6,
            updated_at = CASE
                WHEN (validity_months, reminder_months, required_after_join_months)
                    IS DISTINCT FROM ($4, $5, $6)
                THEN $7
                ELSE updated_at
            END
        WHERE employee_id = $1
          AND certification_rule_id = $2
          AND source = $3
          AND deleted_at IS NULL
        RETURNING id
        "#,
    )
    .bind(row.employee_id().as_i64())
    .bind(row.rule_id().as_i64())
    .bind(row.source().as_str())
    .bind(months_to_column(terms.validity_months)?)
    .bind(months_to_column(terms.reminder_months)?)
    .bind(terms.required_after_join_months.map(months_to_column).transpose()?)
    .bind(row.updated_at())
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to fold eligibility '{}' into its live twin: {error}",
            row.id()
        ))
    })?;

    twin.map(EligibilityId::from_uuid)
        .ok_or_else(|| AppError::NotFound(format!("eligibility {} does not exist", row.id())))
}

/// Overwrites the lifecycle and snapshotted terms of an existing row.
pub(super) async fn overwrite_lifecycle_and_terms(
    connection: &mut PgConnection,
    row: &EmployeeEligibility,
) -> AppResult<EligibilityId> {
    let terms = row.terms();

    let result = sqlx::query(
        r#"
        UPDATE employee_eligibilities
        SET
            is_active = $2,
            deleted_at = $3,
            validity_months = $4,
            reminder_months = $5,
            required_after_join_months = $6,
            updated_at = $7
        WHERE id = $1
        "#,
    )
    .bind(row.id().as_uuid())
    .bind(row.is_active())
    .bind(row.deleted_at())
    .bind(months_to_column(terms.validity_months)?)
    .bind(months_to_column(terms.reminder_months)?)
    .bind(terms.required_after_join_months.map(months_to_column).transpose()?)
    .bind(row.updated_at())
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to update eligibility '{}': {error}",
            row.id()
        ))
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "eligibility {} does not exist",
            row.id()
        )));
    }

    Ok(row.id())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|database_error| database_error.is_unique_violation())
}
