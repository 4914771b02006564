//! Domain entities and invariants for certification eligibility tracking.

#![forbid(unsafe_code)]

mod certification;
mod eligibility;
mod employee;
mod requirement;
mod rule;
mod status;

pub use certification::EmployeeCertification;
pub use eligibility::{
    EligibilityId, EligibilityLifecycle, EligibilityStatus, EmployeeEligibility,
    EmployeeEligibilityParts,
};
pub use employee::{Employee, EmployeeId, JobPosition, JobPositionId};
pub use requirement::{
    EligibilitySource, JobMapping, ManualException, RequirementAssignment, RequirementKey,
};
pub use rule::{CertificationRule, RuleId, RuleTerms};
pub use status::{RemainingTime, StatusDerivation, add_months, derive_status, remaining_until};
