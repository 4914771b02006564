mod conversions;
mod types;

pub use types::{
    EligibilityListParams, EligibilityPageResponse, EligibilityResponse, RefreshFailureResponse,
    RefreshReportResponse,
};
