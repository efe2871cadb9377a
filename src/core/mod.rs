// Core algorithm exports
pub mod conditions;
pub mod criteria;
pub mod distance;
pub mod expansion;
pub mod language;
pub mod matcher;
pub mod matrix;
pub mod rules;
pub mod scoring;
pub mod solver;

pub use conditions::{Condition, ConditionKind};
pub use criteria::{Criteria, Criterion, CriterionKind, Rule};
pub use distance::{disjoint_penalty, jaccard_distance, kendall_tau_distance};
pub use expansion::{expand_capacity, mark_originals};
pub use language::{select_language, LanguageEntry, LanguageTable};
pub use matcher::{MatchOutcome, Matcher};
pub use matrix::{build_cost_matrix, CostMatrix};
pub use rules::{CapacityRule, IdentityColumns, IdentityFields, MatchingRules};
pub use scoring::{cost_breakdown, layering_report, total_cost, TierReport, HARD_TIER_SCALE};
pub use solver::{resolve_assignment, Assignment, AssignmentSolver, HungarianSolver};
