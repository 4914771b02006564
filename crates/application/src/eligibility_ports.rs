mod clock;
mod listing;
mod query;
mod repository;
mod sources;

pub use clock::Clock;
pub use listing::{EligibilityListingRepository, ListedEligibility, ListedEligibilityPage};
pub use query::{EligibilityListQuery, EligibilityPage, EligibilityView};
pub use repository::{
    EligibilityChange, EligibilityChangeKind, EligibilityRepository, EligibilityRowQuery,
    EligibilityStatusUpdate,
};
pub use sources::{RefreshScope, SourceSnapshotRepository};
