use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use certwatch_application::EligibilityListQuery;
use certwatch_core::AppError;
use certwatch_domain::{EligibilityId, EmployeeId};
use uuid::Uuid;

use crate::dto::{
    EligibilityListParams, EligibilityPageResponse, EligibilityResponse, RefreshReportResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[cfg(test)]
mod tests;

pub async fn refresh_all_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<RefreshReportResponse>> {
    let report = state.eligibility_service.refresh_all().await?;

    Ok(Json(RefreshReportResponse::from(report)))
}

pub async fn refresh_employee_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<i64>,
) -> ApiResult<Json<RefreshReportResponse>> {
    let report = state
        .eligibility_service
        .refresh_employee(EmployeeId::new(employee_id))
        .await?;

    Ok(Json(RefreshReportResponse::from(report)))
}

pub async fn list_eligibility_handler(
    State(state): State<AppState>,
    Query(params): Query<EligibilityListParams>,
) -> ApiResult<Json<EligibilityPageResponse>> {
    let query = EligibilityListQuery::try_from(params)?;
    let page = state.eligibility_service.list_eligibility(query).await?;

    Ok(Json(EligibilityPageResponse::from(page)))
}

pub async fn get_eligibility_handler(
    State(state): State<AppState>,
    Path(eligibility_id): Path<String>,
) -> ApiResult<Json<EligibilityResponse>> {
    let view = state
        .eligibility_service
        .get_eligibility(parse_eligibility_id(eligibility_id.as_str())?)
        .await?;

    Ok(Json(EligibilityResponse::from(view)))
}

pub async fn toggle_eligibility_handler(
    State(state): State<AppState>,
    Path(eligibility_id): Path<String>,
) -> ApiResult<Json<EligibilityResponse>> {
    let view = state
        .eligibility_service
        .toggle_active(parse_eligibility_id(eligibility_id.as_str())?)
        .await?;

    Ok(Json(EligibilityResponse::from(view)))
}

pub async fn delete_eligibility_handler(
    State(state): State<AppState>,
    Path(eligibility_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .eligibility_service
        .soft_delete(parse_eligibility_id(eligibility_id.as_str())?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_eligibility_id(value: &str) -> Result<EligibilityId, AppError> {
    Uuid::parse_str(value)
        .map(EligibilityId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid eligibility id '{value}': {error}")))
}
