//! Exchange Matcher - pairs domestic students with incoming exchange students
//!
//! This library scores every (domestic, incoming) pair against a configurable
//! list of criteria and solves the resulting assignment problem for a
//! minimum-cost one-to-one matching, with optional second partners.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use crate::core::{AssignmentSolver, Criteria, HungarianSolver, MatchOutcome, Matcher, MatchingRules};
pub use crate::error::{AppError, ConfigError, DataError, MatchError, SolverError};
pub use crate::models::{MatchRecord, Respondent, RespondentGroup, Role, RunSummary};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let group: RespondentGroup = vec![Respondent::from_pairs([("Q1", "Alice")])].into();
        assert_eq!(group.len(), 1);
        assert_eq!(Role::Domestic.label(), "fr");
    }
}
