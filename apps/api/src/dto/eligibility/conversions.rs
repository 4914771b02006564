use std::str::FromStr;

use certwatch_application::{EligibilityListQuery, EligibilityPage, EligibilityView, RefreshReport};
use certwatch_core::AppError;
use certwatch_domain::{EmployeeId, JobPositionId};

use super::types::{
    EligibilityListParams, EligibilityPageResponse, EligibilityResponse, RefreshFailureResponse,
    RefreshReportResponse,
};

impl From<EligibilityView> for EligibilityResponse {
    fn from(value: EligibilityView) -> Self {
        Self {
            id: value.id.to_string(),
            employee_id: value.employee_id.as_i64(),
            nip: value.nip,
            employee_name: value.employee_name,
            job_position_id: value.job_position_id.map(|id| id.as_i64()),
            job_title: value.job_title,
            join_date: value.join_date,
            rule_id: value.rule_id.as_i64(),
            certification_code: value.certification_code,
            certification_name: value.certification_name,
            level_name: value.level_name,
            level: value.level,
            sub_field_code: value.sub_field_code,
            sub_field_name: value.sub_field_name,
            status: value.status.as_str(),
            source: value.source.as_str(),
            due_date: value.due_date,
            is_active: value.is_active,
            deleted_at: value.deleted_at,
            mandatory_by: value.mandatory_by,
            validity_months: value.validity_months,
            reminder_months: value.reminder_months,
            remaining: value.remaining,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<EligibilityPage> for EligibilityPageResponse {
    fn from(value: EligibilityPage) -> Self {
        Self {
            items: value
                .items
                .into_iter()
                .map(EligibilityResponse::from)
                .collect(),
            total: value.total,
            page: value.page,
            size: value.size,
        }
    }
}

impl From<RefreshReport> for RefreshReportResponse {
    fn from(value: RefreshReport) -> Self {
        Self {
            employees_processed: value.employees_processed,
            rows_touched: value.rows_touched,
            skipped_requirements: value.skipped_requirements,
            failures: value
                .failures
                .into_iter()
                .map(|failure| RefreshFailureResponse {
                    employee_id: failure.employee_id.as_i64(),
                    reason: failure.reason,
                })
                .collect(),
        }
    }
}

impl TryFrom<EligibilityListParams> for EligibilityListQuery {
    type Error = AppError;

    fn try_from(value: EligibilityListParams) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        Ok(Self {
            employee_ids: parse_list::<i64>("employee_ids", value.employee_ids.as_deref())?
                .into_iter()
                .map(EmployeeId::new)
                .collect(),
            job_position_ids: parse_list::<i64>(
                "job_position_ids",
                value.job_position_ids.as_deref(),
            )?
            .into_iter()
            .map(JobPositionId::new)
            .collect(),
            certification_codes: split_list(value.certification_codes.as_deref()),
            levels: parse_list("levels", value.levels.as_deref())?,
            sub_field_codes: split_list(value.sub_field_codes.as_deref()),
            statuses: parse_list("statuses", value.statuses.as_deref())?,
            sources: parse_list("sources", value.sources.as_deref())?,
            search: value.search,
            page: value.page.unwrap_or(defaults.page),
            size: value.size.unwrap_or(defaults.size),
        })
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_list<T>(name: &str, value: Option<&str>) -> Result<Vec<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    split_list(value)
        .into_iter()
        .map(|item| {
            item.parse::<T>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{item}': {error}"))
            })
        })
        .collect()
}
