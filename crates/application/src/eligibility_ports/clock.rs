use chrono::{DateTime, NaiveDate, Utc};

/// Time source for refresh passes and manual overrides.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the calendar date statuses are derived against.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
