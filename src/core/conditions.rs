use crate::error::{ConfigError, DataError};
use crate::models::{Respondent, Role};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Registered condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Equals,
    And,
}

const CONDITION_KINDS: &[(&str, ConditionKind)] = &[
    ("equals", ConditionKind::Equals),
    ("and", ConditionKind::And),
];

impl ConditionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        CONDITION_KINDS
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, kind)| *kind)
    }

    pub fn name(self) -> &'static str {
        CONDITION_KINDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

/// Boolean gate evaluated against the same pair as the criterion it guards.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The selected respondent's answer equals `value` exactly.
    Equals {
        role: Role,
        question: String,
        value: String,
    },
    /// Short-circuit conjunction.
    And(Box<Condition>, Box<Condition>),
}

#[derive(Deserialize)]
struct EqualsParams {
    #[serde(rename = "QLabel", alias = "question")]
    question: String,
    #[serde(default, rename = "who", alias = "role")]
    role: Option<Role>,
    value: Value,
}

impl Condition {
    pub fn equals(role: Role, question: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Equals {
            role,
            question: question.into(),
            value: value.into(),
        }
    }

    pub fn and(first: Condition, second: Condition) -> Self {
        Condition::And(Box::new(first), Box::new(second))
    }

    /// Parse a condition object of the rules document attached to `criterion`.
    pub(crate) fn parse(criterion: &str, raw: &Value) -> Result<Self, ConfigError> {
        let object = raw.as_object().ok_or_else(|| ConfigError::InvalidParameters {
            criterion: criterion.to_string(),
            source: serde::de::Error::custom("condition must be an object"),
        })?;

        let kind_name = kind_field(object).ok_or(ConfigError::MissingParameter {
            criterion: criterion.to_string(),
            parameter: "type",
        })?;
        let kind = ConditionKind::from_name(kind_name).ok_or_else(|| {
            ConfigError::UnknownConditionKind {
                criterion: criterion.to_string(),
                kind: kind_name.to_string(),
            }
        })?;

        match kind {
            ConditionKind::Equals => {
                let params: EqualsParams = serde_json::from_value(raw.clone()).map_err(|source| {
                    ConfigError::InvalidParameters {
                        criterion: criterion.to_string(),
                        source,
                    }
                })?;
                let role = params.role.ok_or(ConfigError::MissingParameter {
                    criterion: criterion.to_string(),
                    parameter: "who",
                })?;
                let value = match params.value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Ok(Condition::Equals {
                    role,
                    question: params.question,
                    value,
                })
            }
            ConditionKind::And => {
                let first = nested(criterion, object, "condition1")?;
                let second = nested(criterion, object, "condition2")?;
                Ok(Condition::and(first, second))
            }
        }
    }

    /// Resolve the condition for a (domestic, incoming) pair.
    pub fn holds(&self, domestic: &Respondent, incoming: &Respondent) -> Result<bool, DataError> {
        match self {
            Condition::Equals {
                role,
                question,
                value,
            } => {
                let answer = role.select(domestic, incoming).scalar(question)?;
                Ok(answer == value)
            }
            Condition::And(first, second) => {
                if !first.holds(domestic, incoming)? {
                    return Ok(false);
                }
                second.holds(domestic, incoming)
            }
        }
    }
}

pub(crate) fn kind_field(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("type")
        .or_else(|| object.get("kind"))
        .and_then(Value::as_str)
}

fn nested(
    criterion: &str,
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Condition, ConfigError> {
    let raw = object.get(key).ok_or(ConfigError::MissingParameter {
        criterion: criterion.to_string(),
        parameter: key,
    })?;
    Condition::parse(criterion, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair() -> (Respondent, Respondent) {
        (
            Respondent::from_pairs([("Q13", "Yes"), ("Q15", "No")]),
            Respondent::from_pairs([("Q13", "No")]),
        )
    }

    #[test]
    fn test_equals_selects_role() {
        let (fr, ex) = pair();
        assert!(Condition::equals(Role::Domestic, "Q13", "Yes").holds(&fr, &ex).unwrap());
        assert!(!Condition::equals(Role::Incoming, "Q13", "Yes").holds(&fr, &ex).unwrap());
    }

    #[test]
    fn test_equals_is_exact() {
        let (fr, ex) = pair();
        assert!(!Condition::equals(Role::Domestic, "Q13", "yes").holds(&fr, &ex).unwrap());
    }

    #[test]
    fn test_and_short_circuits_before_missing_question() {
        let (fr, ex) = pair();
        let cond = Condition::and(
            Condition::equals(Role::Domestic, "Q15", "Yes"),
            Condition::equals(Role::Domestic, "absent", "x"),
        );
        assert!(!cond.holds(&fr, &ex).unwrap());

        let cond = Condition::and(
            Condition::equals(Role::Domestic, "Q13", "Yes"),
            Condition::equals(Role::Domestic, "absent", "x"),
        );
        assert_eq!(
            cond.holds(&fr, &ex),
            Err(DataError::MissingQuestion("absent".to_string()))
        );
    }

    #[test]
    fn test_parse_nested_and() {
        let raw = json!({
            "type": "and",
            "condition1": {"type": "equals", "who": "fr", "QLabel": "Q13", "value": "Yes"},
            "condition2": {"type": "equals", "who": "fr", "QLabel": "Q15", "value": "Yes"}
        });
        let cond = Condition::parse("formerUni", &raw).unwrap();
        assert_eq!(
            cond,
            Condition::and(
                Condition::equals(Role::Domestic, "Q13", "Yes"),
                Condition::equals(Role::Domestic, "Q15", "Yes"),
            )
        );
    }

    #[test]
    fn test_parse_rejects_unknown_kind_and_missing_role() {
        let err = Condition::parse("c", &json!({"type": "or"})).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownConditionKind { ref kind, .. } if kind == "or"));

        let err = Condition::parse("c", &json!({"type": "equals", "QLabel": "Q1", "value": "x"}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingParameter { parameter: "who", .. }));
    }
}
