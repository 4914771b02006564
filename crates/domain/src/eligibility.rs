use std::str::FromStr;

use certwatch_core::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EligibilitySource, EmployeeId, RequirementKey, RuleId, RuleTerms, StatusDerivation,
};

/// Unique identifier for an eligibility row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EligibilityId(Uuid);

impl EligibilityId {
    /// Creates a new random eligibility identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an eligibility identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EligibilityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EligibilityId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Compliance status of one eligibility row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    /// No usable certificate exists for the requirement.
    NotYetCertified,
    /// A valid certificate exists outside its reminder window.
    Active,
    /// A valid certificate exists inside its reminder window.
    Due,
    /// The latest certificate has expired.
    Expired,
}

impl EligibilityStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotYetCertified => "NOT_YET_CERTIFIED",
            Self::Active => "ACTIVE",
            Self::Due => "DUE",
            Self::Expired => "EXPIRED",
        }
    }
}

impl FromStr for EligibilityStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NOT_YET_CERTIFIED" => Ok(Self::NotYetCertified),
            "ACTIVE" => Ok(Self::Active),
            "DUE" => Ok(Self::Due),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(AppError::Validation(format!(
                "unknown eligibility status '{value}'"
            ))),
        }
    }
}

/// Soft-delete state of an eligibility row.
///
/// Persisted as the `is_active` and `deleted_at` column pair, which this type
/// keeps in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EligibilityLifecycle {
    /// The requirement is currently in force.
    Active,
    /// The requirement was withdrawn; the row is kept for history.
    Tombstoned {
        /// When the row was tombstoned.
        at: DateTime<Utc>,
    },
}

impl EligibilityLifecycle {
    /// Rebuilds the lifecycle from its persisted column pair.
    pub fn from_columns(
        is_active: bool,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AppError> {
        match (is_active, deleted_at) {
            (true, None) => Ok(Self::Active),
            (false, Some(at)) => Ok(Self::Tombstoned { at }),
            (true, Some(_)) => Err(AppError::DataIntegrity(
                "eligibility row is active but carries a deletion timestamp".to_owned(),
            )),
            (false, None) => Err(AppError::DataIntegrity(
                "eligibility row is inactive without a deletion timestamp".to_owned(),
            )),
        }
    }

    /// Returns the persisted `is_active` column value.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the persisted `deleted_at` column value.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Tombstoned { at } => Some(*at),
        }
    }
}

/// Field set used to rebuild a persisted eligibility row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeEligibilityParts {
    /// Row identifier.
    pub id: EligibilityId,
    /// Employee the requirement applies to.
    pub employee_id: EmployeeId,
    /// Required rule.
    pub rule_id: RuleId,
    /// Requirement provenance.
    pub source: EligibilitySource,
    /// Last derived status.
    pub status: EligibilityStatus,
    /// Last derived due date.
    pub due_date: Option<NaiveDate>,
    /// Rule terms snapshotted at the last sync.
    pub terms: RuleTerms,
    /// Soft-delete state.
    pub lifecycle: EligibilityLifecycle,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Derived record stating an employee must hold a certification, tagged with
/// its provenance.
///
/// Every mutator reports whether it changed anything and moves `updated_at`
/// only when it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeEligibility {
    id: EligibilityId,
    employee_id: EmployeeId,
    rule_id: RuleId,
    source: EligibilitySource,
    status: EligibilityStatus,
    due_date: Option<NaiveDate>,
    terms: RuleTerms,
    lifecycle: EligibilityLifecycle,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeEligibility {
    /// Creates a fresh active row for a newly required rule.
    #[must_use]
    pub fn new(
        employee_id: EmployeeId,
        key: RequirementKey,
        terms: RuleTerms,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EligibilityId::new(),
            employee_id,
            rule_id: key.rule_id,
            source: key.source,
            status: EligibilityStatus::NotYetCertified,
            due_date: None,
            terms,
            lifecycle: EligibilityLifecycle::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a persisted row.
    #[must_use]
    pub fn from_parts(parts: EmployeeEligibilityParts) -> Self {
        Self {
            id: parts.id,
            employee_id: parts.employee_id,
            rule_id: parts.rule_id,
            source: parts.source,
            status: parts.status,
            due_date: parts.due_date,
            terms: parts.terms,
            lifecycle: parts.lifecycle,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        }
    }

    /// Returns the persisted field set of this row.
    #[must_use]
    pub fn to_parts(&self) -> EmployeeEligibilityParts {
        EmployeeEligibilityParts {
            id: self.id,
            employee_id: self.employee_id,
            rule_id: self.rule_id,
            source: self.source,
            status: self.status,
            due_date: self.due_date,
            terms: self.terms,
            lifecycle: self.lifecycle,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub fn id(&self) -> EligibilityId {
        self.id
    }

    /// Returns the employee identifier.
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the required rule.
    #[must_use]
    pub fn rule_id(&self) -> RuleId {
        self.rule_id
    }

    /// Returns the requirement provenance.
    #[must_use]
    pub fn source(&self) -> EligibilitySource {
        self.source
    }

    /// Returns the reconciliation key of this row.
    #[must_use]
    pub fn key(&self) -> RequirementKey {
        RequirementKey {
            rule_id: self.rule_id,
            source: self.source,
        }
    }

    /// Returns the last derived status.
    #[must_use]
    pub fn status(&self) -> EligibilityStatus {
        self.status
    }

    /// Returns the last derived due date.
    #[must_use]
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the snapshotted rule terms.
    #[must_use]
    pub fn terms(&self) -> RuleTerms {
        self.terms
    }

    /// Returns the soft-delete state.
    #[must_use]
    pub fn lifecycle(&self) -> EligibilityLifecycle {
        self.lifecycle
    }

    /// Returns whether the row is live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Returns the tombstone timestamp, if any.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.deleted_at()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the row as withdrawn. A row that is already tombstoned keeps its
    /// original timestamp.
    pub fn tombstone(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }

        self.lifecycle = EligibilityLifecycle::Tombstoned { at: now };
        self.updated_at = now;
        true
    }

    /// Brings a tombstoned row back into force, keeping its identity.
    pub fn reactivate(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_active() {
            return false;
        }

        self.lifecycle = EligibilityLifecycle::Active;
        self.updated_at = now;
        true
    }

    /// Overwrites the snapshotted rule terms.
    pub fn refresh_terms(&mut self, terms: RuleTerms, now: DateTime<Utc>) -> bool {
        if self.terms == terms {
            return false;
        }

        self.terms = terms;
        self.updated_at = now;
        true
    }

    /// Records the output of the status deriver.
    pub fn apply_status(&mut self, derivation: StatusDerivation, now: DateTime<Utc>) -> bool {
        if self.status == derivation.status() && self.due_date == derivation.due_date() {
            return false;
        }

        self.status = derivation.status();
        self.due_date = derivation.due_date();
        self.updated_at = now;
        true
    }

    /// Returns the mandatory certification deadline for an employee who
    /// joined on `join_date`.
    #[must_use]
    pub fn mandatory_by(&self, join_date: Option<NaiveDate>) -> Option<NaiveDate> {
        let months = self.terms.required_after_join_months?;
        crate::add_months(join_date?, months)
    }
}
