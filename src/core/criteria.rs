use crate::core::conditions::{kind_field, Condition};
use crate::core::distance::{disjoint_penalty, jaccard_distance, kendall_tau_distance};
use crate::error::{ConfigError, DataError};
use crate::models::domain::split_items;
use crate::models::{LanguageSide, Respondent, Role};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;

/// Registered scoring kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    TransformDiff,
    Rank,
    ShareFavLang,
    SemiFavLang,
    SharedLang,
    HasIntersection,
    InterOverUnion,
    Bool,
}

const CRITERION_KINDS: &[(&str, CriterionKind)] = &[
    ("transform_diff", CriterionKind::TransformDiff),
    ("rank", CriterionKind::Rank),
    ("share_fav_lang", CriterionKind::ShareFavLang),
    ("semi_fav_lang", CriterionKind::SemiFavLang),
    ("shared_lang", CriterionKind::SharedLang),
    ("has_intersection", CriterionKind::HasIntersection),
    ("inter_over_union", CriterionKind::InterOverUnion),
    ("bool", CriterionKind::Bool),
];

impl CriterionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        CRITERION_KINDS
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, kind)| *kind)
    }

    pub fn name(self) -> &'static str {
        CRITERION_KINDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    pub fn all() -> impl Iterator<Item = CriterionKind> {
        CRITERION_KINDS.iter().map(|(_, kind)| *kind)
    }
}

/// Question labels shared by the language criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageQuestions {
    pub fluent: String,
    pub learning: String,
}

/// Favorite-language lookup: the favorite question and its answer table.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteLookup {
    pub question: String,
    pub table: HashMap<String, LanguageSide>,
}

/// Scoring function of one criterion, unscaled. Every variant yields a value in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    TransformDiff {
        question: String,
        table: HashMap<String, f64>,
        max: f64,
    },
    Rank {
        question: String,
        n: usize,
    },
    ShareFavLang {
        languages: LanguageQuestions,
        favorite: FavoriteLookup,
    },
    SemiFavLang {
        languages: LanguageQuestions,
        favorite: FavoriteLookup,
    },
    SharedLang {
        languages: LanguageQuestions,
    },
    HasIntersection {
        fr_question: String,
        ex_question: String,
        single_fr: bool,
        single_ex: bool,
    },
    InterOverUnion {
        question: String,
    },
    Bool {
        role: Role,
        question: String,
    },
}

struct LanguageSets<'a> {
    fluent: BTreeSet<&'a str>,
    learning: BTreeSet<&'a str>,
}

impl<'a> LanguageSets<'a> {
    fn read(respondent: &'a Respondent, questions: &LanguageQuestions) -> Result<Self, DataError> {
        Ok(Self {
            fluent: respondent.set(&questions.fluent)?,
            learning: respondent.set(&questions.learning)?,
        })
    }

    fn side(&self, side: LanguageSide) -> &BTreeSet<&'a str> {
        match side {
            LanguageSide::Fluent => &self.fluent,
            LanguageSide::Learning => &self.learning,
        }
    }

    fn all(&self) -> BTreeSet<&'a str> {
        self.fluent.union(&self.learning).copied().collect()
    }
}

impl FavoriteLookup {
    fn side_of(&self, respondent: &Respondent) -> Result<LanguageSide, DataError> {
        let answer = respondent.scalar(&self.question)?;
        self.table
            .get(answer)
            .copied()
            .ok_or_else(|| DataError::UnmappedAnswer {
                question: self.question.clone(),
                value: answer.to_string(),
            })
    }
}

impl Rule {
    pub fn kind(&self) -> CriterionKind {
        match self {
            Rule::TransformDiff { .. } => CriterionKind::TransformDiff,
            Rule::Rank { .. } => CriterionKind::Rank,
            Rule::ShareFavLang { .. } => CriterionKind::ShareFavLang,
            Rule::SemiFavLang { .. } => CriterionKind::SemiFavLang,
            Rule::SharedLang { .. } => CriterionKind::SharedLang,
            Rule::HasIntersection { .. } => CriterionKind::HasIntersection,
            Rule::InterOverUnion { .. } => CriterionKind::InterOverUnion,
            Rule::Bool { .. } => CriterionKind::Bool,
        }
    }

    /// Raw dissimilarity of a (domestic, incoming) pair.
    pub fn score(&self, fr: &Respondent, ex: &Respondent) -> Result<f64, DataError> {
        match self {
            Rule::TransformDiff {
                question,
                table,
                max,
            } => {
                let lookup = |respondent: &Respondent| -> Result<f64, DataError> {
                    let answer = respondent.scalar(question)?;
                    table
                        .get(answer)
                        .copied()
                        .ok_or_else(|| DataError::UnmappedAnswer {
                            question: question.clone(),
                            value: answer.to_string(),
                        })
                };
                Ok((lookup(fr)? - lookup(ex)?).abs() / max)
            }
            Rule::Rank { question, n } => {
                let a = fr.ranks(question, *n)?;
                let b = ex.ranks(question, *n)?;
                Ok(kendall_tau_distance(&a, &b))
            }
            Rule::ShareFavLang {
                languages,
                favorite,
            } => {
                let a = LanguageSets::read(fr, languages)?;
                let b = LanguageSets::read(ex, languages)?;
                let fav_a = a.side(favorite.side_of(fr)?);
                let fav_b = b.side(favorite.side_of(ex)?);
                Ok(disjoint_penalty(fav_a, fav_b))
            }
            Rule::SemiFavLang {
                languages,
                favorite,
            } => {
                let a = LanguageSets::read(fr, languages)?;
                let b = LanguageSets::read(ex, languages)?;
                let fav_a = a.side(favorite.side_of(fr)?);
                let fav_b = b.side(favorite.side_of(ex)?);
                let favored_by_fr = !fav_a.is_disjoint(&b.all());
                let favored_by_ex = !fav_b.is_disjoint(&a.all());
                Ok(if favored_by_fr || favored_by_ex { 0.0 } else { 1.0 })
            }
            Rule::SharedLang { languages } => {
                let a = LanguageSets::read(fr, languages)?;
                let b = LanguageSets::read(ex, languages)?;
                Ok(disjoint_penalty(&a.all(), &b.all()))
            }
            Rule::HasIntersection {
                fr_question,
                ex_question,
                single_fr,
                single_ex,
            } => {
                let a = answer_set(fr, fr_question, *single_fr)?;
                let b = answer_set(ex, ex_question, *single_ex)?;
                Ok(disjoint_penalty(&a, &b))
            }
            Rule::InterOverUnion { question } => {
                let a = fr.set(question)?;
                let b = ex.set(question)?;
                jaccard_distance(&a, &b).ok_or_else(|| DataError::EmptyAnswerSets(question.clone()))
            }
            Rule::Bool { role, question } => {
                let flag = role.select(fr, ex).flag(question)?;
                Ok(if flag { 1.0 } else { 0.0 })
            }
        }
    }
}

fn answer_set<'a>(
    respondent: &'a Respondent,
    question: &str,
    single: bool,
) -> Result<BTreeSet<&'a str>, DataError> {
    let raw = respondent.scalar(question)?;
    if single {
        Ok(BTreeSet::from([raw]))
    } else {
        Ok(split_items(raw))
    }
}

/// One named, optionally gated scoring rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub name: String,
    pub rule: Rule,
    pub condition: Option<Condition>,
    /// Caller-visible magnitude: the criterion contributes `scale × rule` to a pair.
    pub scale: f64,
}

impl Criterion {
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            condition: None,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn kind(&self) -> CriterionKind {
        self.rule.kind()
    }

    /// Largest cost this criterion can add to one pair.
    pub fn max_contribution(&self) -> f64 {
        self.scale
    }
}

/// Insertion-ordered criteria of a rules document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    entries: Vec<Criterion>,
}

impl Criteria {
    pub fn new(entries: Vec<Criterion>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for criterion in &entries {
            if !seen.insert(criterion.name.as_str()) {
                return Err(ConfigError::DuplicateCriterion(criterion.name.clone()));
            }
            validate_scale(&criterion.name, criterion.scale)?;
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Criterion> {
        self.entries.iter().find(|c| c.name == name)
    }
}

impl<'a> IntoIterator for &'a Criteria {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Document-level fallbacks for parameters a language criterion may omit.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CriterionDefaults<'a> {
    pub fluent: Option<&'a str>,
    pub learning: Option<&'a str>,
    pub favorite: Option<&'a str>,
    pub favorite_table: Option<&'a HashMap<String, LanguageSide>>,
}

/// JSON map that keeps its keys in document order.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrderedEntries<T>(pub Vec<(String, T)>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedEntries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = OrderedEntries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of named entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
struct CommonParams {
    #[serde(default = "default_scale", alias = "coef")]
    scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Deserialize)]
struct TransformParams {
    #[serde(rename = "QLabel", alias = "question")]
    question: String,
    transform: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct RankParams {
    #[serde(rename = "QLabel", alias = "question")]
    question: String,
    #[serde(rename = "nAnswers", alias = "n")]
    n: usize,
}

#[derive(Deserialize)]
struct LanguageParams {
    #[serde(default, rename = "fluentQ", alias = "fluent_question")]
    fluent: Option<String>,
    #[serde(default, rename = "learningQ", alias = "learning_question")]
    learning: Option<String>,
    #[serde(default, rename = "favQ", alias = "favorite_question")]
    favorite: Option<String>,
    #[serde(default, rename = "favTable", alias = "favorite_table")]
    favorite_table: Option<HashMap<String, LanguageSide>>,
}

#[derive(Deserialize)]
struct IntersectionParams {
    #[serde(rename = "frQ", alias = "fr_question")]
    fr_question: String,
    #[serde(rename = "exQ", alias = "ex_question")]
    ex_question: String,
    #[serde(default, rename = "singleFr", alias = "single_fr")]
    single_fr: bool,
    #[serde(default, rename = "singleEx", alias = "single_ex")]
    single_ex: bool,
}

#[derive(Deserialize)]
struct QuestionParams {
    #[serde(rename = "QLabel", alias = "question")]
    question: String,
}

#[derive(Deserialize)]
struct BoolParams {
    #[serde(rename = "QLabel", alias = "question")]
    question: String,
    #[serde(default, rename = "who", alias = "role")]
    role: Option<Role>,
}

fn params<T: DeserializeOwned>(name: &str, object: &Map<String, Value>) -> Result<T, ConfigError> {
    serde_json::from_value(Value::Object(object.clone())).map_err(|source| {
        ConfigError::InvalidParameters {
            criterion: name.to_string(),
            source,
        }
    })
}

fn validate_scale(name: &str, scale: f64) -> Result<(), ConfigError> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScale {
            criterion: name.to_string(),
            scale,
        })
    }
}

fn required(
    name: &str,
    value: Option<String>,
    fallback: Option<&str>,
    parameter: &'static str,
) -> Result<String, ConfigError> {
    value
        .or_else(|| fallback.map(str::to_string))
        .ok_or(ConfigError::MissingParameter {
            criterion: name.to_string(),
            parameter,
        })
}

fn language_questions(
    name: &str,
    p: &LanguageParams,
    defaults: &CriterionDefaults<'_>,
) -> Result<LanguageQuestions, ConfigError> {
    Ok(LanguageQuestions {
        fluent: required(name, p.fluent.clone(), defaults.fluent, "fluentQ")?,
        learning: required(name, p.learning.clone(), defaults.learning, "learningQ")?,
    })
}

fn favorite_lookup(
    name: &str,
    p: LanguageParams,
    defaults: &CriterionDefaults<'_>,
) -> Result<FavoriteLookup, ConfigError> {
    let question = required(name, p.favorite, defaults.favorite, "favQ")?;
    let table = p
        .favorite_table
        .or_else(|| defaults.favorite_table.cloned())
        .ok_or(ConfigError::MissingParameter {
            criterion: name.to_string(),
            parameter: "favTable",
        })?;
    Ok(FavoriteLookup { question, table })
}

fn transform_rule(name: &str, p: TransformParams) -> Result<Rule, ConfigError> {
    let degenerate = |reason: &str| ConfigError::DegenerateTransform {
        criterion: name.to_string(),
        reason: reason.to_string(),
    };
    if p.transform.is_empty() {
        return Err(degenerate("table is empty"));
    }
    if let Some((answer, value)) = p
        .transform
        .iter()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        return Err(degenerate(&format!(
            "'{answer}' maps to {value}, expected a finite value >= 0"
        )));
    }
    let max = p.transform.values().copied().fold(0.0_f64, f64::max);
    if max == 0.0 {
        return Err(degenerate("largest value is 0"));
    }
    Ok(Rule::TransformDiff {
        question: p.question,
        table: p.transform,
        max,
    })
}

/// Build one criterion from its rules-document object.
pub(crate) fn parse_criterion(
    name: &str,
    raw: &Value,
    defaults: &CriterionDefaults<'_>,
) -> Result<Criterion, ConfigError> {
    let object = raw.as_object().ok_or_else(|| ConfigError::InvalidParameters {
        criterion: name.to_string(),
        source: serde::de::Error::custom("criterion must be an object"),
    })?;

    let kind_name = kind_field(object).ok_or(ConfigError::MissingParameter {
        criterion: name.to_string(),
        parameter: "type",
    })?;
    let kind =
        CriterionKind::from_name(kind_name).ok_or_else(|| ConfigError::UnknownCriterionKind {
            criterion: name.to_string(),
            kind: kind_name.to_string(),
        })?;

    let common: CommonParams = params(name, object)?;
    validate_scale(name, common.scale)?;

    let rule = match kind {
        CriterionKind::TransformDiff => transform_rule(name, params(name, object)?)?,
        CriterionKind::Rank => {
            let p: RankParams = params(name, object)?;
            if p.n < 2 {
                return Err(ConfigError::RankTooShort {
                    criterion: name.to_string(),
                    n: p.n,
                });
            }
            Rule::Rank {
                question: p.question,
                n: p.n,
            }
        }
        CriterionKind::ShareFavLang | CriterionKind::SemiFavLang => {
            let p: LanguageParams = params(name, object)?;
            let languages = language_questions(name, &p, defaults)?;
            let favorite = favorite_lookup(name, p, defaults)?;
            if kind == CriterionKind::ShareFavLang {
                Rule::ShareFavLang {
                    languages,
                    favorite,
                }
            } else {
                Rule::SemiFavLang {
                    languages,
                    favorite,
                }
            }
        }
        CriterionKind::SharedLang => {
            let p: LanguageParams = params(name, object)?;
            Rule::SharedLang {
                languages: language_questions(name, &p, defaults)?,
            }
        }
        CriterionKind::HasIntersection => {
            let p: IntersectionParams = params(name, object)?;
            Rule::HasIntersection {
                fr_question: p.fr_question,
                ex_question: p.ex_question,
                single_fr: p.single_fr,
                single_ex: p.single_ex,
            }
        }
        CriterionKind::InterOverUnion => {
            let p: QuestionParams = params(name, object)?;
            Rule::InterOverUnion {
                question: p.question,
            }
        }
        CriterionKind::Bool => {
            let p: BoolParams = params(name, object)?;
            let role = p.role.ok_or(ConfigError::MissingParameter {
                criterion: name.to_string(),
                parameter: "who",
            })?;
            Rule::Bool {
                role,
                question: p.question,
            }
        }
    };

    let condition = object
        .get("condition")
        .map(|raw| Condition::parse(name, raw))
        .transpose()?;

    Ok(Criterion {
        name: name.to_string(),
        rule,
        condition,
        scale: common.scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value) -> Result<Criterion, ConfigError> {
        parse_criterion("c", &raw, &CriterionDefaults::default())
    }

    fn freq_rule() -> Rule {
        parse(json!({
            "type": "transform_diff",
            "QLabel": "Q8",
            "transform": {"Once a month": 1, "Twice a month": 2, "Once a week": 4, "Twice a week or more": 9}
        }))
        .unwrap()
        .rule
    }

    #[test]
    fn test_registry_round_trips_names() {
        for kind in CriterionKind::all() {
            assert_eq!(CriterionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CriterionKind::from_name("geo"), None);
    }

    #[test]
    fn test_transform_diff_normalizes_by_max() {
        let rule = freq_rule();
        let fr = Respondent::from_pairs([("Q8", "Once a month")]);
        let ex = Respondent::from_pairs([("Q8", "Twice a week or more")]);
        assert!((rule.score(&fr, &ex).unwrap() - 8.0 / 9.0).abs() < 1e-12);
        assert_eq!(rule.score(&fr, &fr).unwrap(), 0.0);
    }

    #[test]
    fn test_transform_diff_unmapped_answer() {
        let rule = freq_rule();
        let fr = Respondent::from_pairs([("Q8", "Daily")]);
        let ex = Respondent::from_pairs([("Q8", "Once a week")]);
        assert!(matches!(
            rule.score(&fr, &ex),
            Err(DataError::UnmappedAnswer { .. })
        ));
    }

    #[test]
    fn test_degenerate_transform_rejected_at_load() {
        let err = parse(json!({"type": "transform_diff", "QLabel": "Q8", "transform": {"a": 0, "b": 0}}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateTransform { .. }));

        let err = parse(json!({"type": "transform_diff", "QLabel": "Q8", "transform": {"a": -1, "b": 2}}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateTransform { .. }));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = parse(json!({"type": "geo_distance", "QLabel": "Q1"})).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCriterionKind { ref kind, .. } if kind == "geo_distance"));
    }

    #[test]
    fn test_bool_requires_role() {
        let err = parse(json!({"type": "bool", "QLabel": "is_clone"})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingParameter { parameter: "who", .. }));
    }

    #[test]
    fn test_rank_requires_two_answers() {
        let err = parse(json!({"type": "rank", "QLabel": "Q9", "nAnswers": 1})).unwrap_err();
        assert!(matches!(err, ConfigError::RankTooShort { n: 1, .. }));
    }

    #[test]
    fn test_scale_accepts_legacy_coef_and_rejects_negative() {
        let c = parse(json!({"type": "bool", "who": "fr", "QLabel": "is_clone", "coef": 500})).unwrap();
        assert_eq!(c.scale, 500.0);
        let err = parse(json!({"type": "bool", "who": "fr", "QLabel": "is_clone", "scale": -1})).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScale { .. }));
    }

    #[test]
    fn test_language_criterion_uses_document_defaults() {
        let defaults = CriterionDefaults {
            fluent: Some("Q10"),
            learning: Some("Q11"),
            ..CriterionDefaults::default()
        };
        let c = parse_criterion("sharedLang", &json!({"type": "shared_lang"}), &defaults).unwrap();
        assert_eq!(
            c.rule,
            Rule::SharedLang {
                languages: LanguageQuestions {
                    fluent: "Q10".to_string(),
                    learning: "Q11".to_string()
                }
            }
        );

        let err = parse(json!({"type": "share_fav_lang", "fluentQ": "Q10", "learningQ": "Q11", "favQ": "Q12"}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingParameter { parameter: "favTable", .. }));
    }

    #[test]
    fn test_has_intersection_singleton_wrapping() {
        let rule = Rule::HasIntersection {
            fr_question: "Q19".to_string(),
            ex_question: "Q19".to_string(),
            single_fr: false,
            single_ex: true,
        };
        let fr = Respondent::from_pairs([("Q19", "Spain,Italy")]);
        let ex = Respondent::from_pairs([("Q19", "Italy")]);
        assert_eq!(rule.score(&fr, &ex).unwrap(), 0.0);

        let ex = Respondent::from_pairs([("Q19", "Spain,Italy")]);
        let wrapped = Rule::HasIntersection {
            fr_question: "Q19".to_string(),
            ex_question: "Q19".to_string(),
            single_fr: true,
            single_ex: true,
        };
        let fr = Respondent::from_pairs([("Q19", "Spain")]);
        assert_eq!(wrapped.score(&fr, &ex).unwrap(), 1.0);
    }

    #[test]
    fn test_has_intersection_blank_answers() {
        let split = Rule::HasIntersection {
            fr_question: "Q22".to_string(),
            ex_question: "Q22".to_string(),
            single_fr: false,
            single_ex: false,
        };
        let wrapped = Rule::HasIntersection {
            fr_question: "Q22".to_string(),
            ex_question: "Q22".to_string(),
            single_fr: true,
            single_ex: true,
        };
        let blank = Respondent::from_pairs([("Q22", "")]);
        // split answers drop blank items, so two blanks share nothing
        assert_eq!(split.score(&blank, &blank).unwrap(), 1.0);
        assert_eq!(wrapped.score(&blank, &blank).unwrap(), 0.0);
    }

    #[test]
    fn test_inter_over_union_empty_sets_fail() {
        let rule = Rule::InterOverUnion {
            question: "Q21".to_string(),
        };
        let empty = Respondent::from_pairs([("Q21", "")]);
        assert_eq!(
            rule.score(&empty, &empty),
            Err(DataError::EmptyAnswerSets("Q21".to_string()))
        );
    }

    #[test]
    fn test_ordered_entries_keep_document_order() {
        let entries: OrderedEntries<u32> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<_> = entries.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }
}
