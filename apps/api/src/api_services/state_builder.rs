use std::sync::Arc;

use certwatch_application::EligibilityService;
use certwatch_infrastructure::{
    PostgresEligibilityRepository, PostgresSourceRepository, SystemClock,
};
use sqlx::PgPool;

use crate::state::AppState;

pub fn build_app_state(pool: PgPool) -> AppState {
    let eligibility_repository = Arc::new(PostgresEligibilityRepository::new(pool.clone()));
    let eligibility_service = EligibilityService::new(
        Arc::new(PostgresSourceRepository::new(pool.clone())),
        eligibility_repository.clone(),
        Arc::new(SystemClock),
    )
    .with_listing(eligibility_repository);

    AppState {
        eligibility_service,
        postgres_pool: Some(pool),
    }
}
