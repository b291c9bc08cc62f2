//! Error types for descriptor construction
//!
//! Malformed descriptors are rejected here, before they can reach the
//! comparison core.

use thiserror::Error;

/// Errors that can occur when building residues, elements and descriptors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MolError {
    /// Element has no residues
    #[error("Element has no residues")]
    EmptyElement,

    /// Element center lies outside its residue window
    #[error("Element center {center} is out of bounds (window length: {len})")]
    CenterOutOfBounds { center: usize, len: usize },

    /// Two elements of one descriptor share a residue
    #[error("Elements {0} and {1} share residue {2}")]
    OverlappingElements(usize, usize, String),

    /// An element window is wider than the descriptor's neighborhood allows
    #[error("Element {index} spans {len} residues, neighborhood {neighborhood} allows at most {max}")]
    NeighborhoodMismatch {
        index: usize,
        len: usize,
        neighborhood: usize,
        max: usize,
    },

    /// Residues of different molecule types inside one descriptor
    #[error("Descriptor mixes {0} and {1} residues")]
    MixedMoleculeTypes(String, String),

    /// Satellite element index is out of bounds
    #[error("Satellite element index {0} is out of bounds (max: {1})")]
    ElementIndexOutOfBounds(usize, usize),
}

/// Result type for descriptor operations
pub type MolResult<T> = Result<T, MolError>;
