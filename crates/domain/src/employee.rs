use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of an employee in the external employee directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(i64);

impl EmployeeId {
    /// Creates an employee identifier from its directory value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying directory value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifier of a job position in the external organization directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobPositionId(i64);

impl JobPositionId {
    /// Creates a job position identifier from its directory value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying directory value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for JobPositionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Job position reference carried by an employee projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosition {
    /// Job position identifier.
    pub id: JobPositionId,
    /// Job title used for display and ordering.
    pub name: String,
}

/// Read-only employee projection loaded once per refresh pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee identifier.
    pub id: EmployeeId,
    /// Staff number.
    pub nip: String,
    /// Full name.
    pub name: String,
    /// Current job position, if any.
    pub job_position: Option<JobPosition>,
    /// Date the employee joined the organization.
    pub join_date: Option<NaiveDate>,
}

impl Employee {
    /// Returns the current job position identifier, if any.
    #[must_use]
    pub fn job_position_id(&self) -> Option<JobPositionId> {
        self.job_position.as_ref().map(|position| position.id)
    }

    /// Returns the current job title, if any.
    #[must_use]
    pub fn job_title(&self) -> Option<&str> {
        self.job_position
            .as_ref()
            .map(|position| position.name.as_str())
    }
}
