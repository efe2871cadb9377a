use crate::error::{ConfigError, DataError};
use crate::models::Respondent;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A supported language and the mail template used for pairs speaking it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub template: String,
}

impl LanguageEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: String::new(),
            template: String::new(),
        }
    }
}

/// Ordered supported languages with a default that is itself supported.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTable {
    supported: Vec<LanguageEntry>,
    default_index: usize,
}

impl LanguageTable {
    pub fn new(supported: Vec<LanguageEntry>, default: &str) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        if let Some(dup) = supported.iter().find(|l| !seen.insert(l.name.as_str())) {
            return Err(ConfigError::DuplicateLanguage(dup.name.clone()));
        }
        let default_index = supported
            .iter()
            .position(|l| l.name == default)
            .ok_or_else(|| ConfigError::UnknownDefaultLanguage(default.to_string()))?;
        Ok(Self {
            supported,
            default_index,
        })
    }

    pub fn supported(&self) -> &[LanguageEntry] {
        &self.supported
    }

    pub fn default_language(&self) -> &LanguageEntry {
        &self.supported[self.default_index]
    }

    pub fn get(&self, name: &str) -> Option<&LanguageEntry> {
        self.supported.iter().find(|l| l.name == name)
    }

    /// First supported language present in `shared`, else the default.
    pub fn pick(&self, shared: &BTreeSet<&str>) -> &LanguageEntry {
        self.supported
            .iter()
            .find(|l| shared.contains(l.name.as_str()))
            .unwrap_or_else(|| self.default_language())
    }
}

/// Language for a matched pair, chosen from the languages both are fluent in.
pub fn select_language<'t>(
    table: &'t LanguageTable,
    fluent_question: &str,
    fr: &Respondent,
    ex: &Respondent,
) -> Result<&'t LanguageEntry, DataError> {
    let a = fr.set(fluent_question)?;
    let b = ex.set(fluent_question)?;
    let shared: BTreeSet<&str> = a.intersection(&b).copied().collect();
    Ok(table.pick(&shared))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(names: &[&str], default: &str) -> LanguageTable {
        LanguageTable::new(names.iter().map(|n| LanguageEntry::named(*n)).collect(), default).unwrap()
    }

    #[test]
    fn test_first_listed_language_wins() {
        let t = table(&["EN", "FR"], "EN");
        let fr = Respondent::from_pairs([("Q10", "FR,EN")]);
        let ex = Respondent::from_pairs([("Q10", "EN,FR,ES")]);
        assert_eq!(select_language(&t, "Q10", &fr, &ex).unwrap().name, "EN");
    }

    #[test]
    fn test_priority_follows_list_not_answer_order() {
        let t = table(&["FR", "EN"], "EN");
        let fr = Respondent::from_pairs([("Q10", "EN,FR")]);
        let ex = Respondent::from_pairs([("Q10", "EN,FR")]);
        assert_eq!(select_language(&t, "Q10", &fr, &ex).unwrap().name, "FR");
    }

    #[test]
    fn test_falls_back_to_default_only_without_shared_language() {
        let t = table(&["EN", "FR", "ES"], "FR");
        let fr = Respondent::from_pairs([("Q10", "DE")]);
        let ex = Respondent::from_pairs([("Q10", "IT")]);
        assert_eq!(select_language(&t, "Q10", &fr, &ex).unwrap().name, "FR");

        let fr = Respondent::from_pairs([("Q10", "ES,DE")]);
        let ex = Respondent::from_pairs([("Q10", "ES")]);
        assert_eq!(select_language(&t, "Q10", &fr, &ex).unwrap().name, "ES");
    }

    #[test]
    fn test_default_must_be_supported() {
        let err = LanguageTable::new(vec![LanguageEntry::named("EN")], "FR").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefaultLanguage(ref l) if l == "FR"));

        let err = LanguageTable::new(
            vec![LanguageEntry::named("EN"), LanguageEntry::named("EN")],
            "EN",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateLanguage(_)));
    }
}
