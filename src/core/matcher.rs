use crate::core::expansion::{expand_capacity, mark_originals};
use crate::core::language::select_language;
use crate::core::matrix::{build_cost_matrix, CostMatrix};
use crate::core::rules::MatchingRules;
use crate::core::scoring::cost_breakdown;
use crate::core::solver::{resolve_assignment, Assignment, AssignmentSolver, HungarianSolver};
use crate::error::{MatchError, SolverError};
use crate::models::{MatchRecord, RespondentGroup, Role};
use tracing::{debug, info};

/// Result of one matching run, before anything is written out.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Domestic group after capacity expansion; rows of the matrix.
    pub domestic: RespondentGroup,
    /// Incoming group after capacity expansion; columns of the matrix.
    pub incoming: RespondentGroup,
    pub matrix: CostMatrix,
    pub assignment: Assignment,
    pub matches: Vec<MatchRecord>,
}

impl MatchOutcome {
    /// Original domestic respondents with no matched row, clones included.
    pub fn unmatched_domestic(&self) -> Vec<usize> {
        unmatched_people(&self.domestic, self.assignment.matched_rows())
    }

    /// Original incoming respondents with no matched column, clones included.
    pub fn unmatched_incoming(&self) -> Vec<usize> {
        unmatched_people(&self.incoming, self.assignment.matched_cols())
    }

    pub fn total_cost(&self) -> f64 {
        self.assignment.total_cost
    }
}

fn unmatched_people(group: &RespondentGroup, matched: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut covered = vec![false; group.len()];
    for row in matched {
        if let Some(slot) = covered.get_mut(group.origin_of(row)) {
            *slot = true;
        }
    }
    group
        .iter()
        .enumerate()
        .filter(|(row, respondent)| !respondent.is_clone() && !covered[*row])
        .map(|(row, _)| row)
        .collect()
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Capacity expansion of the configured side
/// 2. Cost matrix over every (domestic, incoming) pair
/// 3. Minimum-cost assignment
/// 4. Language selection and match records
#[derive(Debug, Clone)]
pub struct Matcher<S = HungarianSolver> {
    solver: S,
    parallel: bool,
}

impl Matcher<HungarianSolver> {
    pub fn new() -> Self {
        Self {
            solver: HungarianSolver,
            parallel: true,
        }
    }
}

impl Default for Matcher<HungarianSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AssignmentSolver> Matcher<S> {
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            parallel: true,
        }
    }

    /// Compute matrix rows on the rayon pool (default) or on the calling thread.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn run(
        &self,
        rules: &MatchingRules,
        domestic: RespondentGroup,
        incoming: RespondentGroup,
    ) -> Result<MatchOutcome, MatchError> {
        // Stage 1: capacity expansion, always on both sides so every row answers the clone marker
        let (domestic, incoming) = match &rules.capacity {
            Some(capacity) => match capacity.side {
                Role::Domestic => (
                    expand_capacity(domestic, &capacity.question)?,
                    mark_originals(incoming),
                ),
                Role::Incoming => (
                    mark_originals(domestic),
                    expand_capacity(incoming, &capacity.question)?,
                ),
            },
            None => (mark_originals(domestic), mark_originals(incoming)),
        };
        info!(
            domestic = domestic.len(),
            incoming = incoming.len(),
            clones = domestic.clone_count() + incoming.clone_count(),
            "groups prepared"
        );

        // Stage 2: cost matrix
        let matrix = build_cost_matrix(&rules.criteria, &domestic, &incoming, self.parallel)?;
        debug!(rows = matrix.rows(), cols = matrix.cols(), "cost matrix built");

        // Stage 3: assignment
        let assignment = resolve_assignment(&self.solver, &matrix)?;
        info!(
            pairs = assignment.pairs.len(),
            unmatched_rows = assignment.unmatched_rows.len(),
            unmatched_cols = assignment.unmatched_cols.len(),
            total_cost = assignment.total_cost,
            "assignment resolved"
        );

        // Stage 4: match records
        let matches = assignment
            .pairs
            .iter()
            .map(|&(row, col)| build_record(rules, &domestic, &incoming, &matrix, row, col))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MatchOutcome {
            domestic,
            incoming,
            matrix,
            assignment,
            matches,
        })
    }
}

fn build_record(
    rules: &MatchingRules,
    domestic: &RespondentGroup,
    incoming: &RespondentGroup,
    matrix: &CostMatrix,
    row: usize,
    col: usize,
) -> Result<MatchRecord, MatchError> {
    let (fr, ex) = match (domestic.get(row), incoming.get(col)) {
        (Some(fr), Some(ex)) => (fr, ex),
        _ => return Err(SolverError::InvalidPair { row, col }.into()),
    };

    let language = select_language(&rules.languages, &rules.questions.fluent, fr, ex)?;
    let (fr_first_name, fr_last_name, fr_email) = rules.identity.fr.read(fr)?;
    let (ex_first_name, ex_last_name, ex_email) = rules.identity.ex.read(ex)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let breakdown = cost_breakdown(&rules.criteria, fr, ex)
            .map_err(|source| MatchError::Pair { row, col, source })?;
        debug!(row, col, language = %language.name, ?breakdown, "pair matched");
    }

    Ok(MatchRecord {
        fr_row: domestic.origin_of(row),
        ex_row: incoming.origin_of(col),
        fr_first_name: fr_first_name.to_string(),
        fr_last_name: fr_last_name.to_string(),
        fr_email: fr_email.to_string(),
        ex_first_name: ex_first_name.to_string(),
        ex_last_name: ex_last_name.to_string(),
        ex_email: ex_email.to_string(),
        language: language.name.clone(),
        cost: matrix.get(row, col).unwrap_or_default(),
        via_clone: fr.is_clone() || ex.is_clone(),
    })
}
