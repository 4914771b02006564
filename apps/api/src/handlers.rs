pub mod eligibility;
pub mod health;
