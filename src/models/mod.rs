// Model exports
pub mod domain;
pub mod records;

pub use domain::{LanguageSide, Respondent, RespondentGroup, Role, CLONE_QUESTION};
pub use records::{MatchRecord, RunSummary, UnmatchedRecord};
