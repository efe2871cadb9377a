// Property tests for the assignment solver and capacity expansion

use exchange_matcher::core::{expand_capacity, resolve_assignment, CostMatrix, HungarianSolver};
use exchange_matcher::models::{Respondent, RespondentGroup};
use proptest::prelude::*;
use std::collections::HashSet;

fn matrix_strategy() -> impl Strategy<Value = CostMatrix> {
    (1usize..=5, 1usize..=5).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(0u32..60, rows * cols).prop_map(move |cells| {
            let cells = cells.into_iter().map(f64::from).collect();
            match CostMatrix::from_cells(rows, cols, cells) {
                Ok(matrix) => matrix,
                Err(err) => panic!("strategy built a malformed matrix: {err}"),
            }
        })
    })
}

/// Cheapest total over every matching of size min(rows, cols).
fn brute_force_optimum(matrix: &CostMatrix) -> f64 {
    fn search(matrix: &CostMatrix, row: usize, used: &mut Vec<bool>, matched: usize, cost: f64, best: &mut f64) {
        let target = matrix.rows().min(matrix.cols());
        if row == matrix.rows() {
            if matched == target && cost < *best {
                *best = cost;
            }
            return;
        }
        // rows left cannot complete the matching
        if matched + (matrix.rows() - row) < target {
            return;
        }
        for col in 0..matrix.cols() {
            if !used[col] {
                used[col] = true;
                let cell = matrix.get(row, col).unwrap_or(f64::INFINITY);
                search(matrix, row + 1, used, matched + 1, cost + cell, best);
                used[col] = false;
            }
        }
        search(matrix, row + 1, used, matched, cost, best);
    }

    let mut best = f64::INFINITY;
    search(matrix, 0, &mut vec![false; matrix.cols()], 0, 0.0, &mut best);
    best
}

fn flagged_group(flags: &[bool]) -> RespondentGroup {
    flags
        .iter()
        .enumerate()
        .map(|(i, flag)| {
            Respondent::from_pairs([
                ("Q1".to_string(), format!("person {i}")),
                ("Q7".to_string(), if *flag { "Yes" } else { "No" }.to_string()),
            ])
        })
        .collect::<Vec<_>>()
        .into()
}

proptest! {
    #[test]
    fn property_assignment_is_a_maximum_matching(matrix in matrix_strategy()) {
        let assignment = resolve_assignment(&HungarianSolver, &matrix).unwrap();
        let expected = matrix.rows().min(matrix.cols());
        prop_assert_eq!(assignment.pairs.len(), expected);

        let rows: HashSet<_> = assignment.matched_rows().collect();
        let cols: HashSet<_> = assignment.matched_cols().collect();
        prop_assert_eq!(rows.len(), expected);
        prop_assert_eq!(cols.len(), expected);
        prop_assert_eq!(assignment.unmatched_rows.len(), matrix.rows() - expected);
        prop_assert_eq!(assignment.unmatched_cols.len(), matrix.cols() - expected);
    }

    #[test]
    fn property_assignment_matches_brute_force_optimum(matrix in matrix_strategy()) {
        let assignment = resolve_assignment(&HungarianSolver, &matrix).unwrap();
        let optimum = brute_force_optimum(&matrix);
        prop_assert!((assignment.total_cost - optimum).abs() < 1e-9,
            "solver found {} but the optimum is {}", assignment.total_cost, optimum);
    }

    #[test]
    fn property_expansion_adds_one_row_per_flag(flags in prop::collection::vec(any::<bool>(), 0..12)) {
        let k = flags.iter().filter(|f| **f).count();
        let expanded = expand_capacity(flagged_group(&flags), "Q7").unwrap();
        prop_assert_eq!(expanded.len(), flags.len() + k);
        prop_assert_eq!(expanded.clone_count(), k);

        for (row, respondent) in expanded.iter().enumerate().skip(flags.len()) {
            let origin = expanded.origin_of(row);
            prop_assert!(flags[origin]);
            prop_assert_eq!(respondent.get("Q1"), expanded.get(origin).and_then(|r| r.get("Q1")));
        }

        let twice = expand_capacity(expanded.clone(), "Q7").unwrap();
        prop_assert_eq!(twice, expanded);
    }
}
