//! Hungarian method (Munkres) for the square assignment problem
//!
//! Finds a row → column permutation of minimal total cost. Forbidden pairs
//! are expressed by the caller as a large finite sentinel cost, so the
//! solver always returns a full permutation.

use crate::AlignError;

/// Costs at or below this are treated as zero
const ZERO: f64 = 1e-9;

/// Minimum-cost perfect bipartite matching on a square cost matrix
#[derive(Debug, Clone)]
pub struct HungarianSolver {
    n: usize,
    cost: Vec<Vec<f64>>,
    row_star: Vec<Option<usize>>,
    col_star: Vec<Option<usize>>,
    row_prime: Vec<Option<usize>>,
    row_covered: Vec<bool>,
    col_covered: Vec<bool>,
}

impl HungarianSolver {
    /// Validate the matrix and prepare a solver.
    ///
    /// The matrix must be square with finite, non-negative entries.
    pub fn new(matrix: &[Vec<f64>]) -> Result<Self, AlignError> {
        let n = matrix.len();
        for (row, values) in matrix.iter().enumerate() {
            if values.len() != n {
                return Err(AlignError::NotSquare { rows: n, row, cols: values.len() });
            }
            if let Some(col) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
                return Err(AlignError::InvalidCost { row, col, value: values[col] });
            }
        }
        Ok(HungarianSolver {
            n,
            cost: matrix.to_vec(),
            row_star: vec![None; n],
            col_star: vec![None; n],
            row_prime: vec![None; n],
            row_covered: vec![false; n],
            col_covered: vec![false; n],
        })
    }

    /// Solve and return `assignment[row] = column`
    pub fn solve(mut self) -> Result<Vec<usize>, AlignError> {
        if self.n == 0 {
            return Ok(Vec::new());
        }
        self.reduce();
        self.star_independent_zeros();
        self.cover_starred_columns();

        while self.col_covered.iter().any(|c| !c) {
            match self.find_uncovered_zero() {
                Some((row, col)) => {
                    self.row_prime[row] = Some(col);
                    match self.row_star[row] {
                        Some(star_col) => {
                            self.row_covered[row] = true;
                            self.col_covered[star_col] = false;
                        }
                        None => {
                            self.augment(row, col)?;
                            self.row_prime.iter_mut().for_each(|p| *p = None);
                            self.row_covered.iter_mut().for_each(|c| *c = false);
                            self.cover_starred_columns();
                        }
                    }
                }
                None => self.shift_by_uncovered_minimum(),
            }
        }

        self.row_star
            .iter()
            .enumerate()
            .map(|(row, col)| col.ok_or(AlignError::AssignmentIncomplete(row)))
            .collect()
    }

    /// Subtract row minima, then column minima
    fn reduce(&mut self) {
        for row in self.cost.iter_mut() {
            let min = row.iter().copied().fold(f64::INFINITY, f64::min);
            row.iter_mut().for_each(|v| *v -= min);
        }
        for col in 0..self.n {
            let min = self.cost.iter().map(|r| r[col]).fold(f64::INFINITY, f64::min);
            self.cost.iter_mut().for_each(|r| r[col] -= min);
        }
    }

    /// Greedily star zeros with no other star in their row or column
    fn star_independent_zeros(&mut self) {
        for row in 0..self.n {
            for col in 0..self.n {
                if self.cost[row][col] <= ZERO
                    && self.row_star[row].is_none()
                    && self.col_star[col].is_none()
                {
                    self.row_star[row] = Some(col);
                    self.col_star[col] = Some(row);
                }
            }
        }
    }

    fn cover_starred_columns(&mut self) {
        for col in 0..self.n {
            self.col_covered[col] = self.col_star[col].is_some();
        }
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        (0..self.n)
            .filter(|&row| !self.row_covered[row])
            .find_map(|row| {
                (0..self.n)
                    .find(|&col| !self.col_covered[col] && self.cost[row][col] <= ZERO)
                    .map(|col| (row, col))
            })
    }

    /// Flip stars along the alternating star/prime path starting at a prime
    fn augment(&mut self, row: usize, col: usize) -> Result<(), AlignError> {
        let mut path = vec![(row, col)];
        let mut current_col = col;
        while let Some(star_row) = self.col_star[current_col] {
            path.push((star_row, current_col));
            let prime_col = self.row_prime[star_row].ok_or(AlignError::AssignmentIncomplete(star_row))?;
            path.push((star_row, prime_col));
            current_col = prime_col;
        }

        // Odd positions are stars, even positions primes
        for &(r, c) in path.iter().skip(1).step_by(2) {
            self.row_star[r] = None;
            self.col_star[c] = None;
        }
        for &(r, c) in path.iter().step_by(2) {
            self.row_star[r] = Some(c);
            self.col_star[c] = Some(r);
        }
        Ok(())
    }

    fn shift_by_uncovered_minimum(&mut self) {
        let mut min = f64::INFINITY;
        for row in (0..self.n).filter(|&r| !self.row_covered[r]) {
            for col in (0..self.n).filter(|&c| !self.col_covered[c]) {
                min = min.min(self.cost[row][col]);
            }
        }
        for row in 0..self.n {
            for col in 0..self.n {
                if self.row_covered[row] {
                    self.cost[row][col] += min;
                }
                if !self.col_covered[col] {
                    self.cost[row][col] -= min;
                }
            }
        }
    }
}

/// Solve the assignment problem for `matrix`, returning `assignment[row] = column`
pub fn solve_assignment(matrix: &[Vec<f64>]) -> Result<Vec<usize>, AlignError> {
    HungarianSolver::new(matrix)?.solve()
}

/// Total cost of an assignment
pub fn assignment_cost(matrix: &[Vec<f64>], assignment: &[usize]) -> f64 {
    assignment
        .iter()
        .enumerate()
        .map(|(row, &col)| matrix[row][col])
        .sum()
}
