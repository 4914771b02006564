use certwatch_application::EligibilityService;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub eligibility_service: EligibilityService,
    /// Pool pinged by the health check; absent when running on in-memory adapters.
    pub postgres_pool: Option<PgPool>,
}
