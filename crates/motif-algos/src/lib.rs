//! Computational algorithms for motif-rs
//!
//! This crate provides the numeric building blocks of descriptor comparison:
//! - Analytical 3×3 SVD decomposition
//! - Kabsch algorithm for optimal rigid-body superposition
//! - Hungarian method for the square assignment problem

pub mod hungarian;
pub mod kabsch;
pub mod linalg;

pub use hungarian::{assignment_cost, solve_assignment, HungarianSolver};
pub use kabsch::{rmsd, superimpose, RigidTransform, Superposition};
pub use linalg::{svd3, Svd3};

/// Errors from superposition and assignment algorithms
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignError {
    #[error("Coordinate arrays have different lengths: {0} vs {1}")]
    LengthMismatch(usize, usize),

    #[error("No points to superimpose")]
    NoPoints,

    #[error("Cost matrix is not square: {rows} rows, row {row} has {cols} columns")]
    NotSquare { rows: usize, row: usize, cols: usize },

    #[error("Invalid cost {value} at ({row}, {col})")]
    InvalidCost { row: usize, col: usize, value: f64 },

    #[error("Assignment left row {0} unmatched")]
    AssignmentIncomplete(usize),
}
