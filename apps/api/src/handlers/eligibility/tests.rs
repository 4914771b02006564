use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use certwatch_application::{Clock, EligibilityService};
use certwatch_core::AppError;
use certwatch_domain::{
    CertificationRule, Employee, EmployeeCertification, EmployeeId, JobMapping, JobPosition,
    JobPositionId, RuleId, RuleTerms,
};
use certwatch_infrastructure::{InMemoryEligibilityRepository, InMemorySourceRepository};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use crate::dto::EligibilityListParams;
use crate::error::ApiError;
use crate::state::AppState;

use super::{
    delete_eligibility_handler, get_eligibility_handler, list_eligibility_handler,
    refresh_all_handler, refresh_employee_handler, toggle_eligibility_handler,
};

struct MidMayClock;

impl Clock for MidMayClock {
    fn now(&self) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .map(|value| value.and_utc())
            .unwrap_or_default()
    }
}

/// E100 in job 5 holds a certificate for R1 issued 2023-06-01; E101 in job 5
/// holds nothing.
async fn seeded_state() -> AppState {
    let sources = Arc::new(InMemorySourceRepository::new());
    for (id, name) in [(100, "Alice"), (101, "Bob")] {
        sources
            .upsert_employee(Employee {
                id: EmployeeId::new(id),
                nip: format!("E{id}"),
                name: name.to_owned(),
                job_position: Some(JobPosition {
                    id: JobPositionId::new(5),
                    name: "Branch Teller".to_owned(),
                }),
                join_date: NaiveDate::from_ymd_opt(2023, 1, 10),
            })
            .await;
    }
    sources
        .upsert_rule(CertificationRule {
            id: RuleId::new(1),
            certification_code: "K3".to_owned(),
            certification_name: "Occupational Safety".to_owned(),
            level_name: Some("Level 1".to_owned()),
            level: Some(1),
            sub_field_code: None,
            sub_field_name: None,
            terms: RuleTerms {
                validity_months: 12,
                reminder_months: 1,
                required_after_join_months: Some(6),
            },
        })
        .await;
    sources
        .add_job_mapping(JobMapping {
            job_position_id: JobPositionId::new(5),
            rule_id: RuleId::new(1),
            is_active: true,
            deleted_at: None,
        })
        .await;
    sources
        .add_certification(EmployeeCertification {
            id: 1,
            employee_id: EmployeeId::new(100),
            rule_id: RuleId::new(1),
            cert_date: NaiveDate::from_ymd_opt(2023, 6, 1),
            valid_until: NaiveDate::from_ymd_opt(2024, 6, 1),
            reminder_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            deleted_at: None,
        })
        .await;

    AppState {
        eligibility_service: EligibilityService::new(
            sources,
            Arc::new(InMemoryEligibilityRepository::new()),
            Arc::new(MidMayClock),
        ),
        postgres_pool: None,
    }
}

fn status_of(error: ApiError) -> StatusCode {
    error.into_response().status()
}

async fn due_row_id(state: &AppState) -> String {
    let page = list_eligibility_handler(
        State(state.clone()),
        Query(EligibilityListParams {
            statuses: Some("DUE".to_owned()),
            ..EligibilityListParams::default()
        }),
    )
    .await;
    assert!(page.is_ok());
    let Ok(Json(page)) = page else {
        return String::new();
    };
    assert_eq!(page.items.len(), 1);
    page.items
        .first()
        .map(|item| item.id.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn refresh_then_list_returns_derived_rows() {
    let state = seeded_state().await;

    let report = refresh_all_handler(State(state.clone())).await;
    assert!(report.is_ok());
    let Ok(Json(report)) = report else {
        return;
    };
    assert_eq!(report.employees_processed, 2);
    assert_eq!(report.rows_touched, 2);

    let page = list_eligibility_handler(
        State(state.clone()),
        Query(EligibilityListParams {
            statuses: Some("due, expired".to_owned()),
            ..EligibilityListParams::default()
        }),
    )
    .await;
    assert!(page.is_ok());
    let Ok(Json(page)) = page else {
        return;
    };
    assert_eq!(page.total, 1);

    let serialized = serde_json::to_value(&page.items[0]);
    assert!(serialized.is_ok());
    let serialized = serialized.unwrap_or_default();
    assert_eq!(serialized["employee_id"], json!(100));
    assert_eq!(serialized["status"], json!("DUE"));
    assert_eq!(serialized["source"], json!("BY_JOB"));
    assert_eq!(serialized["due_date"], json!("2024-06-01"));
    assert_eq!(
        serialized["remaining"],
        json!({"kind": "remaining", "months": 0, "days": 17})
    );
}

#[tokio::test]
async fn toggle_and_delete_round_trip_through_handlers() {
    let state = seeded_state().await;
    assert!(refresh_all_handler(State(state.clone())).await.is_ok());
    let id = due_row_id(&state).await;

    let toggled = toggle_eligibility_handler(State(state.clone()), Path(id.clone())).await;
    assert!(toggled.is_ok());
    let Ok(Json(toggled)) = toggled else {
        return;
    };
    assert!(!toggled.is_active);

    let toggled = toggle_eligibility_handler(State(state.clone()), Path(id.clone())).await;
    assert!(toggled.is_ok());

    let deleted = delete_eligibility_handler(State(state.clone()), Path(id.clone())).await;
    assert!(matches!(deleted, Ok(StatusCode::NO_CONTENT)));

    let detail = get_eligibility_handler(State(state.clone()), Path(id)).await;
    assert!(detail.is_ok());
    let Ok(Json(detail)) = detail else {
        return;
    };
    assert!(!detail.is_active);
    assert!(detail.deleted_at.is_some());
}

#[tokio::test]
async fn malformed_input_maps_to_bad_request() {
    let state = seeded_state().await;

    let detail = get_eligibility_handler(State(state.clone()), Path("not-a-uuid".to_owned())).await;
    let Err(error) = detail else {
        panic!("malformed eligibility id must be rejected");
    };
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);

    let page = list_eligibility_handler(
        State(state.clone()),
        Query(EligibilityListParams {
            statuses: Some("BOGUS".to_owned()),
            ..EligibilityListParams::default()
        }),
    )
    .await;
    let Err(error) = page else {
        panic!("unknown status filter must be rejected");
    };
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);

    let page = list_eligibility_handler(
        State(state),
        Query(EligibilityListParams {
            size: Some(0),
            ..EligibilityListParams::default()
        }),
    )
    .await;
    let Err(error) = page else {
        panic!("empty page size must be rejected");
    };
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_targets_map_to_not_found() {
    let state = seeded_state().await;

    let refreshed = refresh_employee_handler(State(state.clone()), Path(999)).await;
    let Err(error) = refreshed else {
        panic!("unknown employee must be reported");
    };
    assert_eq!(status_of(error), StatusCode::NOT_FOUND);

    let toggled = toggle_eligibility_handler(
        State(state),
        Path("6f1b2d3c-0000-4000-8000-000000000001".to_owned()),
    )
    .await;
    let Err(error) = toggled else {
        panic!("unknown eligibility must be reported");
    };
    assert_eq!(status_of(error), StatusCode::NOT_FOUND);
}

#[test]
fn application_errors_map_to_http_statuses() {
    let cases = [
        (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
        (AppError::NotFound("gone".to_owned()), StatusCode::NOT_FOUND),
        (AppError::Conflict("twin".to_owned()), StatusCode::CONFLICT),
        (
            AppError::DataIntegrity("broken".to_owned()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal("boom".to_owned()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(status_of(ApiError(error)), expected);
    }
}
