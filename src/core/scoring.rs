use crate::core::criteria::{Criteria, Criterion};
use crate::error::{DataError, ScoreError};
use crate::models::Respondent;

/// Scale from which a criterion is treated as a hard tier that must dominate
/// everything beneath it.
pub const HARD_TIER_SCALE: f64 = 100.0;

/// Cost of one criterion for a (domestic, incoming) pair.
///
/// A criterion whose condition does not hold contributes 0.
#[inline]
pub fn evaluate_criterion(
    criterion: &Criterion,
    fr: &Respondent,
    ex: &Respondent,
) -> Result<f64, DataError> {
    if let Some(condition) = &criterion.condition {
        if !condition.holds(fr, ex)? {
            return Ok(0.0);
        }
    }
    Ok(criterion.scale * criterion.rule.score(fr, ex)?)
}

/// Sum of every criterion's cost for a (domestic, incoming) pair.
///
/// Not symmetric in its arguments: always pass the domestic respondent first.
pub fn total_cost(criteria: &Criteria, fr: &Respondent, ex: &Respondent) -> Result<f64, ScoreError> {
    criteria.iter().try_fold(0.0, |acc, criterion| {
        evaluate_criterion(criterion, fr, ex)
            .map(|cost| acc + cost)
            .map_err(|source| ScoreError {
                criterion: criterion.name.clone(),
                source,
            })
    })
}

/// Per-criterion costs in document order.
pub fn cost_breakdown<'c>(
    criteria: &'c Criteria,
    fr: &Respondent,
    ex: &Respondent,
) -> Result<Vec<(&'c str, f64)>, ScoreError> {
    criteria
        .iter()
        .map(|criterion| {
            evaluate_criterion(criterion, fr, ex)
                .map(|cost| (criterion.name.as_str(), cost))
                .map_err(|source| ScoreError {
                    criterion: criterion.name.clone(),
                    source,
                })
        })
        .collect()
}

/// How one criterion's magnitude compares with the tiers beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct TierReport {
    pub criterion: String,
    pub max_contribution: f64,
    /// Worst-case sum of every criterion with a strictly smaller maximum.
    pub lower_tier_total: f64,
    pub dominates: bool,
}

impl TierReport {
    /// A hard-tier criterion that lower tiers can outweigh.
    pub fn is_overlapping(&self) -> bool {
        self.max_contribution >= HARD_TIER_SCALE && !self.dominates
    }
}

/// Magnitude layering of the criteria, largest first.
///
/// A criterion dominates when its maximum strictly exceeds the combined
/// maximum of all smaller criteria, so the solver can never trade it away
/// for lower-tier savings.
pub fn layering_report(criteria: &Criteria) -> Vec<TierReport> {
    let mut reports: Vec<TierReport> = criteria
        .iter()
        .filter(|c| c.max_contribution() > 0.0)
        .map(|c| {
            let max = c.max_contribution();
            let lower_tier_total: f64 = criteria
                .iter()
                .map(Criterion::max_contribution)
                .filter(|other| *other < max)
                .sum();
            TierReport {
                criterion: c.name.clone(),
                max_contribution: max,
                lower_tier_total,
                dominates: max > lower_tier_total,
            }
        })
        .collect();

    reports.sort_by(|a, b| {
        b.max_contribution
            .partial_cmp(&a.max_contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conditions::Condition;
    use crate::core::criteria::{LanguageQuestions, Rule};
    use crate::models::Role;

    fn shared_lang() -> Criterion {
        Criterion::new(
            "sharedLang",
            Rule::SharedLang {
                languages: LanguageQuestions {
                    fluent: "fluent".to_string(),
                    learning: "learning".to_string(),
                },
            },
        )
        .with_scale(1000.0)
    }

    fn clone_penalty() -> Criterion {
        Criterion::new(
            "clone",
            Rule::Bool {
                role: Role::Domestic,
                question: "is_clone".to_string(),
            },
        )
        .with_scale(500.0)
    }

    fn respondent(fluent: &str, is_clone: bool) -> Respondent {
        Respondent::from_pairs([
            ("fluent", fluent),
            ("learning", ""),
            ("is_clone", if is_clone { "true" } else { "false" }),
        ])
    }

    #[test]
    fn test_condition_false_contributes_nothing() {
        let gated = clone_penalty().with_condition(Condition::equals(Role::Incoming, "fluent", "DE"));
        let fr = respondent("EN", true);
        let ex = respondent("EN", false);
        assert_eq!(evaluate_criterion(&gated, &fr, &ex).unwrap(), 0.0);
        assert_eq!(evaluate_criterion(&clone_penalty(), &fr, &ex).unwrap(), 500.0);
    }

    #[test]
    fn test_total_cost_sums_scaled_criteria() {
        let criteria = Criteria::new(vec![shared_lang(), clone_penalty()]).unwrap();
        let fr = respondent("EN", true);
        let ex = respondent("FR", false);
        assert_eq!(total_cost(&criteria, &fr, &ex).unwrap(), 1500.0);

        let breakdown = cost_breakdown(&criteria, &fr, &ex).unwrap();
        assert_eq!(breakdown, vec![("sharedLang", 1000.0), ("clone", 500.0)]);
    }

    #[test]
    fn test_total_cost_is_order_sensitive_in_roles() {
        let criteria = Criteria::new(vec![clone_penalty()]).unwrap();
        let clone = respondent("EN", true);
        let original = respondent("EN", false);
        assert_eq!(total_cost(&criteria, &clone, &original).unwrap(), 500.0);
        assert_eq!(total_cost(&criteria, &original, &clone).unwrap(), 0.0);
    }

    #[test]
    fn test_total_cost_names_failing_criterion() {
        let criteria = Criteria::new(vec![clone_penalty()]).unwrap();
        let fr = Respondent::from_pairs([("fluent", "EN")]);
        let err = total_cost(&criteria, &fr, &fr).unwrap_err();
        assert_eq!(err.criterion, "clone");
        assert_eq!(err.source, DataError::MissingQuestion("is_clone".to_string()));
    }

    #[test]
    fn test_layering_report_detects_overlap() {
        let soft = |name: &str, scale: f64| {
            Criterion::new(
                name,
                Rule::InterOverUnion {
                    question: "Q21".to_string(),
                },
            )
            .with_scale(scale)
        };

        let layered = Criteria::new(vec![shared_lang(), clone_penalty(), soft("a", 5.0), soft("b", 3.0)])
            .unwrap();
        let report = layering_report(&layered);
        assert_eq!(report[0].criterion, "sharedLang");
        assert_eq!(report[0].lower_tier_total, 508.0);
        assert!(report.iter().all(|r| r.dominates));

        let overlapping = Criteria::new(vec![clone_penalty(), soft("a", 300.0), soft("b", 250.0)]).unwrap();
        let report = layering_report(&overlapping);
        assert!(report[0].is_overlapping());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Criteria::new(vec![clone_penalty(), clone_penalty()]).unwrap_err();
        assert!(matches!(err, crate::error::ConfigError::DuplicateCriterion(ref n) if n == "clone"));
    }
}
