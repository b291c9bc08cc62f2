//! Error types for descriptor comparison
//!
//! A failed similarity check is never an error: it is a negative
//! [`ComparisonResult`](crate::ComparisonResult) or an incomparable `None`.

use motif_algos::AlignError;
use motif_mol::{MoleculeType, MolError};
use thiserror::Error;

/// Errors that can occur while comparing two descriptors
#[derive(Error, Debug)]
pub enum CompareError {
    /// Neighborhood sizes differ, so elements cannot be matched position by position
    #[error("Descriptors {first} (k={first_k}) and {second} (k={second_k}) are uncomparable")]
    UncomparableDescriptors {
        first: String,
        first_k: usize,
        second: String,
        second_k: usize,
    },

    /// Descriptors of different molecule types select different alignment atoms
    #[error("Cannot compare a {0} descriptor with a {1} descriptor")]
    MoleculeTypeMismatch(MoleculeType, MoleculeType),

    /// A duplex pair was used that has no element alignment in the similarity matrix
    #[error("No element alignment for duplex pair ({0}, {1})")]
    UnknownDuplexPair(usize, usize),

    /// Superposition or assignment invariant violated
    #[error("Superposition failed: {0}")]
    Superposition(#[from] AlignError),

    /// Descriptor lookup failed
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] MolError),

    /// Settings could not be parsed
    #[error("Invalid comparison settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// Unknown search strategy name
    #[error("Unknown search strategy '{0}' (expected backtracking, hungarian-first, hungarian-longest or hungarian-partials)")]
    UnknownStrategy(String),

    /// Unknown precision level name
    #[error("Unknown comparison precision '{0}'")]
    UnknownPrecision(String),
}

/// Result type for comparison operations
pub type CompareResult<T> = Result<T, CompareError>;
