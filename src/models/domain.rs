use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Reserved question exposing the clone marker of an expanded group.
pub const CLONE_QUESTION: &str = "is_clone";

/// Side of a pair a parameter refers to.
///
/// Criteria are always evaluated with the domestic respondent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "fr", alias = "domestic")]
    Domestic,
    #[serde(rename = "ex", alias = "incoming")]
    Incoming,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Domestic => "fr",
            Role::Incoming => "ex",
        }
    }

    /// Pick the respondent playing this role in a (domestic, incoming) pair.
    #[inline]
    pub fn select<'a>(self, domestic: &'a Respondent, incoming: &'a Respondent) -> &'a Respondent {
        match self {
            Role::Domestic => domestic,
            Role::Incoming => incoming,
        }
    }
}

/// Which language set a respondent prefers to practise in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSide {
    Fluent,
    Learning,
}

/// One survey response: question label to raw answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Respondent {
    answers: HashMap<String, String>,
    #[serde(default)]
    clone_of: Option<usize>,
}

impl Respondent {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self {
            answers,
            clone_of: None,
        }
    }

    /// Build a respondent from `(question, answer)` pairs.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(q, a)| (q.into(), a.into()))
                .collect(),
        )
    }

    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.answers.get(question).map(String::as_str)
    }

    /// Row of the original respondent when this entry is a virtual clone.
    pub fn clone_of(&self) -> Option<usize> {
        self.clone_of
    }

    pub fn is_clone(&self) -> bool {
        self.clone_of.is_some()
    }

    /// Raw answer, exactly as recorded.
    pub fn scalar(&self, question: &str) -> Result<&str, DataError> {
        self.get(question)
            .ok_or_else(|| DataError::MissingQuestion(question.to_string()))
    }

    /// Multi-select answer as a set of trimmed, non-empty items.
    pub fn set(&self, question: &str) -> Result<BTreeSet<&str>, DataError> {
        Ok(split_items(self.scalar(question)?))
    }

    /// Ranked family `question_1 ..= question_n`.
    pub fn ranks(&self, question: &str, n: usize) -> Result<Vec<f64>, DataError> {
        (1..=n)
            .map(|i| {
                let field = format!("{question}_{i}");
                let raw = self
                    .get(&field)
                    .ok_or_else(|| DataError::MissingRank {
                        field: field.clone(),
                        n,
                    })?;
                raw.trim().parse::<f64>().map_err(|_| DataError::InvalidNumber {
                    question: field,
                    value: raw.to_string(),
                })
            })
            .collect()
    }

    pub fn flag(&self, question: &str) -> Result<bool, DataError> {
        let raw = self.scalar(question)?;
        parse_flag(raw).ok_or_else(|| DataError::NotBoolean {
            question: question.to_string(),
            value: raw.to_string(),
        })
    }

    pub(crate) fn set_answer(&mut self, question: &str, value: &str) {
        self.answers.insert(question.to_string(), value.to_string());
    }

    pub(crate) fn mark_clone_of(&mut self, row: usize) {
        self.clone_of = Some(row);
    }
}

/// Ordered respondents of one side; identity is the row index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondentGroup {
    respondents: Vec<Respondent>,
}

impl RespondentGroup {
    pub fn new(respondents: Vec<Respondent>) -> Self {
        Self { respondents }
    }

    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Respondent> {
        self.respondents.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Respondent> {
        self.respondents.iter()
    }

    pub fn as_slice(&self) -> &[Respondent] {
        &self.respondents
    }

    pub fn clone_count(&self) -> usize {
        self.respondents.iter().filter(|r| r.is_clone()).count()
    }

    /// Row index of the person behind `row`, following clones back to their original.
    pub fn origin_of(&self, row: usize) -> usize {
        self.respondents
            .get(row)
            .and_then(Respondent::clone_of)
            .unwrap_or(row)
    }

    pub fn into_inner(self) -> Vec<Respondent> {
        self.respondents
    }
}

impl From<Vec<Respondent>> for RespondentGroup {
    fn from(respondents: Vec<Respondent>) -> Self {
        Self::new(respondents)
    }
}

impl<'a> IntoIterator for &'a RespondentGroup {
    type Item = &'a Respondent;
    type IntoIter = std::slice::Iter<'a, Respondent>;

    fn into_iter(self) -> Self::IntoIter {
        self.respondents.iter()
    }
}

pub(crate) fn split_items(raw: &str) -> BTreeSet<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "1.0" => Some(true),
        "no" | "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}
