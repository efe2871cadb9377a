use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One matched pair with its selected communication language.
///
/// Field names double as mail template placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub fr_row: usize,
    pub ex_row: usize,
    pub fr_first_name: String,
    pub fr_last_name: String,
    pub fr_email: String,
    pub ex_first_name: String,
    pub ex_last_name: String,
    pub ex_email: String,
    pub language: String,
    pub cost: f64,
    pub via_clone: bool,
}

impl MatchRecord {
    /// Template placeholder lookup.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "fr_row" => self.fr_row.to_string(),
            "ex_row" => self.ex_row.to_string(),
            "fr_first_name" => self.fr_first_name.clone(),
            "fr_last_name" => self.fr_last_name.clone(),
            "fr_email" => self.fr_email.clone(),
            "ex_first_name" => self.ex_first_name.clone(),
            "ex_last_name" => self.ex_last_name.clone(),
            "ex_email" => self.ex_email.clone(),
            "language" => self.language.clone(),
            "cost" => format!("{:.3}", self.cost),
            "via_clone" => self.via_clone.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Identity columns of a respondent left without a partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRecord {
    pub row: usize,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Counters and timing of one matching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub domestic_respondents: usize,
    pub incoming_respondents: usize,
    pub clones: usize,
    pub matched: usize,
    pub unmatched_domestic: usize,
    pub unmatched_incoming: usize,
    pub total_cost: f64,
}
