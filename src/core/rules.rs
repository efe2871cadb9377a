use crate::core::criteria::{parse_criterion, Criteria, CriterionDefaults, OrderedEntries};
use crate::core::language::{LanguageEntry, LanguageTable};
use crate::core::scoring::layering_report;
use crate::error::{ConfigError, DataError};
use crate::models::{LanguageSide, Respondent, Role, UnmatchedRecord};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use validator::Validate;

/// Survey questions carrying language answers.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct LanguageQuestionLabels {
    #[validate(length(min = 1))]
    pub fluent: String,
    #[validate(length(min = 1))]
    pub learning: String,
    #[serde(default)]
    pub favorite: Option<String>,
}

/// Which side may absorb a second partner, and the question that says so.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CapacityRule {
    #[validate(length(min = 1))]
    pub question: String,
    #[serde(default = "default_capacity_side")]
    pub side: Role,
}

fn default_capacity_side() -> Role {
    Role::Domestic
}

/// Question labels identifying a respondent in outputs and mails.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct IdentityFields {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub email: String,
}

impl IdentityFields {
    pub fn read<'r>(&self, respondent: &'r Respondent) -> Result<(&'r str, &'r str, &'r str), DataError> {
        Ok((
            respondent.scalar(&self.first_name)?,
            respondent.scalar(&self.last_name)?,
            respondent.scalar(&self.email)?,
        ))
    }

    pub fn unmatched_record(&self, row: usize, respondent: &Respondent) -> Result<UnmatchedRecord, DataError> {
        let (first_name, last_name, email) = self.read(respondent)?;
        Ok(UnmatchedRecord {
            row,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct IdentityColumns {
    #[validate(nested)]
    pub fr: IdentityFields,
    #[validate(nested)]
    pub ex: IdentityFields,
}

impl IdentityColumns {
    pub fn for_role(&self, role: Role) -> &IdentityFields {
        match role {
            Role::Domestic => &self.fr,
            Role::Incoming => &self.ex,
        }
    }
}

#[derive(Deserialize, Validate)]
struct RawLanguages {
    #[validate(length(min = 1))]
    supported: Vec<LanguageEntry>,
    default: String,
}

#[derive(Deserialize, Validate)]
struct RawRules {
    criteria: OrderedEntries<Value>,
    #[validate(nested)]
    questions: LanguageQuestionLabels,
    #[serde(default, alias = "favTable")]
    favorite_table: Option<HashMap<String, LanguageSide>>,
    #[serde(default)]
    #[validate(nested)]
    capacity: Option<CapacityRule>,
    #[validate(nested)]
    identity: IdentityColumns,
    #[validate(nested)]
    languages: RawLanguages,
}

/// Validated matching rules, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingRules {
    pub criteria: Criteria,
    pub questions: LanguageQuestionLabels,
    pub capacity: Option<CapacityRule>,
    pub identity: IdentityColumns,
    pub languages: LanguageTable,
}

impl MatchingRules {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawRules = serde_json::from_str(raw)?;
        raw.validate()?;

        let defaults = CriterionDefaults {
            fluent: Some(raw.questions.fluent.as_str()),
            learning: Some(raw.questions.learning.as_str()),
            favorite: raw.questions.favorite.as_deref(),
            favorite_table: raw.favorite_table.as_ref(),
        };

        let entries = raw
            .criteria
            .0
            .iter()
            .map(|(name, value)| parse_criterion(name, value, &defaults))
            .collect::<Result<Vec<_>, _>>()?;
        let criteria = Criteria::new(entries)?;

        let languages = LanguageTable::new(raw.languages.supported, &raw.languages.default)?;

        for tier in layering_report(&criteria).iter().filter(|t| t.is_overlapping()) {
            tracing::warn!(
                criterion = %tier.criterion,
                max = tier.max_contribution,
                lower_tiers = tier.lower_tier_total,
                "criterion does not dominate the tiers beneath it, priority order may break"
            );
        }

        tracing::debug!(
            criteria = criteria.len(),
            languages = languages.supported().len(),
            "matching rules loaded"
        );

        Ok(Self {
            criteria,
            questions: raw.questions,
            capacity: raw.capacity,
            identity: raw.identity,
            languages,
        })
    }
}
