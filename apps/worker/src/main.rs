//! Certwatch periodic eligibility refresh worker.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use certwatch_application::{EligibilityService, RefreshReport};
use certwatch_core::{AppError, AppResult};
use certwatch_infrastructure::{
    PostgresEligibilityRepository, PostgresSourceRepository, SystemClock,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    database_max_connections: u32,
    refresh_interval_seconds: u64,
    run_once: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(&config).await?;
    let eligibility_service = build_eligibility_service(pool);

    info!(
        refresh_interval_seconds = config.refresh_interval_seconds,
        run_once = config.run_once,
        "certwatch-worker started"
    );

    if config.run_once {
        let report = eligibility_service.refresh_all().await?;
        log_report(&report);
        return Ok(());
    }

    loop {
        match eligibility_service.refresh_all().await {
            Ok(report) => log_report(&report),
            Err(error) => {
                warn!(error = %error, "eligibility refresh pass failed");
            }
        }

        tokio::time::sleep(Duration::from_secs(config.refresh_interval_seconds)).await;
    }
}

async fn connect_pool(config: &WorkerConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_eligibility_service(pool: PgPool) -> EligibilityService {
    EligibilityService::new(
        Arc::new(PostgresSourceRepository::new(pool.clone())),
        Arc::new(PostgresEligibilityRepository::new(pool)),
        Arc::new(SystemClock),
    )
}

fn log_report(report: &RefreshReport) {
    if report.failures.is_empty() {
        info!(
            employees = report.employees_processed,
            rows_touched = report.rows_touched,
            skipped_requirements = report.skipped_requirements,
            "eligibility refresh pass finished"
        );
        return;
    }

    for failure in &report.failures {
        warn!(
            employee_id = %failure.employee_id,
            reason = %failure.reason,
            "employee skipped during refresh pass"
        );
    }
    warn!(
        employees = report.employees_processed,
        rows_touched = report.rows_touched,
        failed_employees = report.failures.len(),
        "eligibility refresh pass finished with failures"
    );
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let run_once = env::args().nth(1).as_deref() == Some("once");
        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        let refresh_interval_seconds = parse_env_u64("REFRESH_INTERVAL_SECONDS", 3600)?;

        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        if refresh_interval_seconds == 0 {
            return Err(AppError::Validation(
                "REFRESH_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            refresh_interval_seconds,
            run_once,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
