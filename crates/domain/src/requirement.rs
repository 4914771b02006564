use std::str::FromStr;

use certwatch_core::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EmployeeId, JobPositionId, RuleId};

/// Provenance of an eligibility requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilitySource {
    /// Inherited from the employee's job position mapping.
    ByJob,
    /// Manually assigned to the named employee.
    ByName,
}

impl EligibilitySource {
    /// Returns a stable storage value for this source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByJob => "BY_JOB",
            Self::ByName => "BY_NAME",
        }
    }
}

impl FromStr for EligibilitySource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BY_JOB" => Ok(Self::ByJob),
            "BY_NAME" => Ok(Self::ByName),
            _ => Err(AppError::Validation(format!(
                "unknown eligibility source '{value}'"
            ))),
        }
    }
}

/// Reconciliation key of an eligibility row within one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequirementKey {
    /// Required rule.
    pub rule_id: RuleId,
    /// Channel the requirement comes through.
    pub source: EligibilitySource,
}

/// Job position to rule mapping owned by the mapping administration surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMapping {
    /// Mapped job position.
    pub job_position_id: JobPositionId,
    /// Rule required for holders of the job position.
    pub rule_id: RuleId,
    /// Administrative on/off switch.
    pub is_active: bool,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Per-employee manual requirement owned by the exception administration surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualException {
    /// Employee the rule is assigned to.
    pub employee_id: EmployeeId,
    /// Rule required for the employee.
    pub rule_id: RuleId,
    /// Administrative on/off switch.
    pub is_active: bool,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A requirement assignment from either independently edited source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementAssignment {
    /// Requirement inherited through a job position.
    Job(JobMapping),
    /// Requirement assigned to a named employee.
    Manual(ManualException),
}

impl RequirementAssignment {
    /// Returns the required rule.
    #[must_use]
    pub fn rule_id(&self) -> RuleId {
        match self {
            Self::Job(mapping) => mapping.rule_id,
            Self::Manual(exception) => exception.rule_id,
        }
    }

    /// Returns the eligibility source this assignment produces.
    #[must_use]
    pub fn source(&self) -> EligibilitySource {
        match self {
            Self::Job(_) => EligibilitySource::ByJob,
            Self::Manual(_) => EligibilitySource::ByName,
        }
    }

    /// Returns whether the assignment currently produces a requirement.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        match self {
            Self::Job(mapping) => mapping.is_active && mapping.deleted_at.is_none(),
            Self::Manual(exception) => exception.is_active && exception.deleted_at.is_none(),
        }
    }
}
