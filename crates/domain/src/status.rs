//! Date-driven eligibility status derivation.
//!
//! Everything here is a pure function of its inputs. "Today" is always passed
//! in explicitly; nothing reads the wall clock.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EligibilityStatus, EmployeeCertification};

/// Status and due date produced for one eligibility row.
///
/// Only [`derive_status`] builds values of this type, which keeps status and
/// due date write-only outputs of the deriver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDerivation {
    status: EligibilityStatus,
    due_date: Option<NaiveDate>,
}

impl StatusDerivation {
    /// Returns the derived status.
    #[must_use]
    pub fn status(&self) -> EligibilityStatus {
        self.status
    }

    /// Returns the derived due date.
    #[must_use]
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

/// Derives the eligibility status from the latest matching certification.
///
/// A record that is deleted or has no certification date counts as absent.
#[must_use]
pub fn derive_status(
    certification: Option<&EmployeeCertification>,
    today: NaiveDate,
) -> StatusDerivation {
    let Some(certification) = certification.filter(|record| record.is_usable()) else {
        return StatusDerivation {
            status: EligibilityStatus::NotYetCertified,
            due_date: None,
        };
    };

    let Some(valid_until) = certification.valid_until else {
        return StatusDerivation {
            status: EligibilityStatus::Active,
            due_date: None,
        };
    };

    let status = if today > valid_until {
        EligibilityStatus::Expired
    } else if certification
        .reminder_date
        .is_some_and(|reminder_date| today >= reminder_date)
    {
        EligibilityStatus::Due
    } else {
        EligibilityStatus::Active
    };

    StatusDerivation {
        status,
        due_date: Some(valid_until),
    }
}

/// Adds calendar months, clamping to the last day of shorter months.
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Time left until a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemainingTime {
    /// Whole months and leftover days until the due date.
    Remaining {
        /// Whole calendar months.
        months: u32,
        /// Days after the last whole month.
        days: u32,
    },
    /// The due date has passed.
    Overdue,
}

/// Computes the remaining time between `today` and `due_date`.
#[must_use]
pub fn remaining_until(today: NaiveDate, due_date: NaiveDate) -> RemainingTime {
    if due_date < today {
        return RemainingTime::Overdue;
    }

    let estimate = (due_date.year() - today.year()) * 12 + due_date.month() as i32
        - today.month() as i32;
    let mut months = u32::try_from(estimate.max(0)).unwrap_or(0);
    let mut anchor = add_months(today, months).unwrap_or(today);
    if anchor > due_date && months > 0 {
        months -= 1;
        anchor = add_months(today, months).unwrap_or(today);
    }

    let days = u32::try_from((due_date - anchor).num_days().max(0)).unwrap_or(0);
    RemainingTime::Remaining { months, days }
}
