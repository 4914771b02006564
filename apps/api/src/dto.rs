mod eligibility;
mod health;

pub use eligibility::{
    EligibilityListParams, EligibilityPageResponse, EligibilityResponse, RefreshFailureResponse,
    RefreshReportResponse,
};
pub use health::{HealthDependencyStatus, HealthResponse};
