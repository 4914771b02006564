use certwatch_domain::RemainingTime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Query string accepted by the eligibility listing.
///
/// List-valued filters are comma separated, e.g. `statuses=DUE,EXPIRED`.
#[derive(Debug, Default, Deserialize)]
pub struct EligibilityListParams {
    pub employee_ids: Option<String>,
    pub job_position_ids: Option<String>,
    pub certification_codes: Option<String>,
    pub levels: Option<String>,
    pub sub_field_codes: Option<String>,
    pub statuses: Option<String>,
    pub sources: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

/// API representation of an eligibility row with display fields.
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub id: String,
    pub employee_id: i64,
    pub nip: Option<String>,
    pub employee_name: Option<String>,
    pub job_position_id: Option<i64>,
    pub job_title: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub rule_id: i64,
    pub certification_code: Option<String>,
    pub certification_name: Option<String>,
    pub level_name: Option<String>,
    pub level: Option<i32>,
    pub sub_field_code: Option<String>,
    pub sub_field_name: Option<String>,
    pub status: &'static str,
    pub source: &'static str,
    pub due_date: Option<NaiveDate>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub mandatory_by: Option<NaiveDate>,
    pub validity_months: u32,
    pub reminder_months: u32,
    pub remaining: Option<RemainingTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the eligibility listing.
#[derive(Debug, Serialize)]
pub struct EligibilityPageResponse {
    pub items: Vec<EligibilityResponse>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

/// Per-employee failure in a refresh report.
#[derive(Debug, Serialize)]
pub struct RefreshFailureResponse {
    pub employee_id: i64,
    pub reason: String,
}

/// Outcome of a refresh pass.
#[derive(Debug, Serialize)]
pub struct RefreshReportResponse {
    pub employees_processed: usize,
    pub rows_touched: usize,
    pub skipped_requirements: usize,
    pub failures: Vec<RefreshFailureResponse>,
}
