use crate::core::matrix::CostMatrix;
use crate::error::SolverError;

/// Minimum-cost bipartite matching over a rectangular cost matrix.
///
/// Implementations return `min(rows, cols)` `(row, col)` pairs, each row and
/// column used at most once, minimizing the summed cost.
pub trait AssignmentSolver {
    fn solve(&self, matrix: &CostMatrix) -> Result<Vec<(usize, usize)>, SolverError>;
}

/// Hungarian algorithm with dual potentials (shortest augmenting paths).
///
/// Runs in O(n²m) on the orientation with `n <= m`; taller matrices are
/// transposed first.
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, matrix: &CostMatrix) -> Result<Vec<(usize, usize)>, SolverError> {
        if let Some((row, col, value)) = matrix.find_invalid() {
            return Err(SolverError::InvalidCost { row, col, value });
        }
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Ok(Vec::new());
        }

        let mut pairs = if matrix.rows() <= matrix.cols() {
            hungarian(matrix)?
        } else {
            hungarian(&matrix.transpose())?
                .into_iter()
                .map(|(col, row)| (row, col))
                .collect()
        };
        pairs.sort_unstable();
        Ok(pairs)
    }
}

/// Requires `rows <= cols`. Indices are 1-based internally, 0 is the virtual column.
fn hungarian(matrix: &CostMatrix) -> Result<Vec<(usize, usize)>, SolverError> {
    let n = matrix.rows();
    let m = matrix.cols();

    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    // p[j]: row assigned to column j
    let mut p = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let costs = matrix.row(i0 - 1);
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = costs[j - 1] - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            if j1 == 0 {
                return Err(SolverError::Infeasible(i - 1));
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // augment along the alternating path
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    Ok((1..=m)
        .filter(|&j| p[j] != 0)
        .map(|j| (p[j] - 1, j - 1))
        .collect())
}

/// Solver output split into matched and unmatched indices on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub pairs: Vec<(usize, usize)>,
    pub unmatched_rows: Vec<usize>,
    pub unmatched_cols: Vec<usize>,
    pub total_cost: f64,
}

impl Assignment {
    pub fn matched_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|&(row, _)| row)
    }

    pub fn matched_cols(&self) -> impl Iterator<Item = usize> + '_ {
        self.pairs.iter().map(|&(_, col)| col)
    }

    pub fn col_for_row(&self, row: usize) -> Option<usize> {
        self.pairs.iter().find(|&&(r, _)| r == row).map(|&(_, c)| c)
    }
}

/// Run `solver` and partition its result, checking the output contract.
pub fn resolve_assignment<S: AssignmentSolver + ?Sized>(
    solver: &S,
    matrix: &CostMatrix,
) -> Result<Assignment, SolverError> {
    let pairs = solver.solve(matrix)?;

    let expected = matrix.rows().min(matrix.cols());
    if pairs.len() != expected {
        return Err(SolverError::WrongPairCount {
            expected,
            actual: pairs.len(),
        });
    }

    let mut row_used = vec![false; matrix.rows()];
    let mut col_used = vec![false; matrix.cols()];
    for &(row, col) in &pairs {
        let fresh = row < matrix.rows() && col < matrix.cols() && !row_used[row] && !col_used[col];
        if !fresh {
            return Err(SolverError::InvalidPair { row, col });
        }
        row_used[row] = true;
        col_used[col] = true;
    }

    let unused = |used: &[bool]| {
        used.iter()
            .enumerate()
            .filter(|(_, u)| !**u)
            .map(|(i, _)| i)
            .collect::<Vec<_>>()
    };

    Ok(Assignment {
        total_cost: matrix.total(&pairs),
        unmatched_rows: unused(&row_used),
        unmatched_cols: unused(&col_used),
        pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(rows: Vec<Vec<f64>>) -> Assignment {
        let matrix = CostMatrix::from_rows(rows).unwrap();
        resolve_assignment(&HungarianSolver, &matrix).unwrap()
    }

    #[test]
    fn test_square_optimum() {
        let a = solve(vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ]);
        assert_eq!(a.pairs, vec![(0, 1), (1, 0), (2, 2)]);
        assert_eq!(a.total_cost, 5.0);
        assert!(a.unmatched_rows.is_empty() && a.unmatched_cols.is_empty());
    }

    #[test]
    fn test_tall_matrix_leaves_rows_unmatched() {
        let a = solve(vec![vec![1.0, 9.0], vec![9.0, 1.0], vec![0.5, 0.5]]);
        assert_eq!(a.pairs.len(), 2);
        assert_eq!(a.unmatched_rows.len(), 1);
        assert!(a.unmatched_cols.is_empty());
        assert_eq!(a.total_cost, 1.5);
    }

    #[test]
    fn test_wide_matrix_leaves_cols_unmatched() {
        let a = solve(vec![vec![7.0, 2.0, 9.0, 1.0]]);
        assert_eq!(a.pairs, vec![(0, 3)]);
        assert_eq!(a.unmatched_cols, vec![0, 1, 2]);
        assert_eq!(a.col_for_row(0), Some(3));
    }

    #[test]
    fn test_avoids_hard_tier_pair_when_alternative_exists() {
        let a = solve(vec![vec![1000.0, 3.0], vec![2.0, 4.0]]);
        assert_eq!(a.pairs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_rejects_invalid_cells() {
        let matrix = CostMatrix::from_rows(vec![vec![1.0, f64::NAN]]).unwrap();
        let err = HungarianSolver.solve(&matrix).unwrap_err();
        assert!(matches!(err, SolverError::InvalidCost { row: 0, col: 1, .. }));

        let matrix = CostMatrix::from_rows(vec![vec![-1.0]]).unwrap();
        assert!(HungarianSolver.solve(&matrix).is_err());
    }

    struct DuplicatingSolver;

    impl AssignmentSolver for DuplicatingSolver {
        fn solve(&self, _: &CostMatrix) -> Result<Vec<(usize, usize)>, SolverError> {
            Ok(vec![(0, 0), (0, 1)])
        }
    }

    #[test]
    fn test_resolver_rejects_reused_rows() {
        let matrix = CostMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let err = resolve_assignment(&DuplicatingSolver, &matrix).unwrap_err();
        assert_eq!(err, SolverError::InvalidPair { row: 0, col: 1 });
    }
}
