use axum::Router;
use axum::routing::{get, post, put};
use certwatch_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let eligibility_routes = Router::new()
        .route(
            "/api/eligibility",
            get(handlers::eligibility::list_eligibility_handler),
        )
        .route(
            "/api/eligibility/refresh",
            post(handlers::eligibility::refresh_all_handler),
        )
        .route(
            "/api/eligibility/refresh/{employee_id}",
            post(handlers::eligibility::refresh_employee_handler),
        )
        .route(
            "/api/eligibility/{eligibility_id}",
            get(handlers::eligibility::get_eligibility_handler)
                .delete(handlers::eligibility::delete_eligibility_handler),
        )
        .route(
            "/api/eligibility/{eligibility_id}/toggle",
            put(handlers::eligibility::toggle_eligibility_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(eligibility_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
