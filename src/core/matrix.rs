use crate::core::criteria::Criteria;
use crate::core::scoring::total_cost;
use crate::error::{MatchError, SolverError};
use crate::models::{Respondent, RespondentGroup};
use rayon::prelude::*;

/// Dense row-major cost matrix; rows are domestic respondents, columns incoming.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<f64>) -> Result<Self, SolverError> {
        if cells.len() != rows * cols {
            return Err(SolverError::Shape {
                rows,
                cols,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SolverError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let actual = rows.iter().map(Vec::len).sum();
        if rows.iter().any(|row| row.len() != n_cols) {
            return Err(SolverError::Shape {
                rows: n_rows,
                cols: n_cols,
                actual,
            });
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn transpose(&self) -> Self {
        let mut cells = Vec::with_capacity(self.cells.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                cells.push(self.cells[row * self.cols + col]);
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Sum of the cells selected by `pairs`; out-of-range pairs are ignored.
    pub fn total(&self, pairs: &[(usize, usize)]) -> f64 {
        pairs
            .iter()
            .filter_map(|&(row, col)| self.get(row, col))
            .sum()
    }

    /// First cell that is not a finite, non-negative cost.
    pub fn find_invalid(&self) -> Option<(usize, usize, f64)> {
        self.cells
            .iter()
            .position(|v| !v.is_finite() || *v < 0.0)
            .map(|i| (i / self.cols, i % self.cols, self.cells[i]))
    }
}

/// Materialize `total_cost` for every (domestic, incoming) pair.
///
/// Cells are independent; with `parallel` the rows are spread over the rayon
/// pool, each task writing its own row slice.
pub fn build_cost_matrix(
    criteria: &Criteria,
    domestic: &RespondentGroup,
    incoming: &RespondentGroup,
    parallel: bool,
) -> Result<CostMatrix, MatchError> {
    let rows = domestic.len();
    let cols = incoming.len();
    let mut cells = vec![0.0; rows * cols];

    if rows > 0 && cols > 0 {
        let fill = |(row, slice): (usize, &mut [f64])| {
            fill_row(criteria, &domestic.as_slice()[row], incoming.as_slice(), row, slice)
        };
        if parallel {
            cells.par_chunks_mut(cols).enumerate().try_for_each(fill)?;
        } else {
            cells.chunks_mut(cols).enumerate().try_for_each(fill)?;
        }
    }

    Ok(CostMatrix { rows, cols, cells })
}

fn fill_row(
    criteria: &Criteria,
    fr: &Respondent,
    incoming: &[Respondent],
    row: usize,
    slice: &mut [f64],
) -> Result<(), MatchError> {
    for (col, (cell, ex)) in slice.iter_mut().zip(incoming).enumerate() {
        let cost = total_cost(criteria, fr, ex).map_err(|source| MatchError::Pair { row, col, source })?;
        if !cost.is_finite() {
            return Err(MatchError::NonFiniteCost {
                row,
                col,
                value: cost,
            });
        }
        *cell = cost;
    }
    Ok(())
}
