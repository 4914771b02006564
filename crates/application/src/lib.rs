//! Application services and ports.

#![forbid(unsafe_code)]

mod certification_matcher;
mod eligibility_ports;
mod eligibility_service;
mod reconciler;
mod refresh_snapshot;
mod requirement_resolver;

pub use certification_matcher::CertificationIndex;
pub use eligibility_ports::{
    Clock, EligibilityChange, EligibilityChangeKind, EligibilityListQuery,
    EligibilityListingRepository, EligibilityPage, EligibilityRepository, EligibilityRowQuery,
    EligibilityStatusUpdate, EligibilityView, ListedEligibility, ListedEligibilityPage,
    RefreshScope, SourceSnapshotRepository,
};
pub use eligibility_service::{EligibilityService, EmployeeRefreshFailure, RefreshReport};
pub use reconciler::{ReconcilePlan, reconcile_employee};
pub use requirement_resolver::{ResolvedRequirements, resolve_requirements};
