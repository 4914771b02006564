//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_eligibility_repository;
mod in_memory_source_repository;
mod postgres_eligibility_repository;
mod postgres_source_repository;
mod system_clock;

pub use in_memory_eligibility_repository::InMemoryEligibilityRepository;
pub use in_memory_source_repository::InMemorySourceRepository;
pub use postgres_eligibility_repository::PostgresEligibilityRepository;
pub use postgres_source_repository::PostgresSourceRepository;
pub use system_clock::SystemClock;
