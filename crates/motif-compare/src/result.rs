//! Comparison verdicts and metrics

use std::fmt;

use motif_algos::RigidTransform;
use serde::{Deserialize, Serialize};

/// Residue-level alignment text: two equal-length rows of one-letter codes.
///
/// `.` marks a residue without a partner on the other side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SequenceAlignment {
    pub first: String,
    pub second: String,
}

impl SequenceAlignment {
    /// Number of columns
    pub fn len(&self) -> usize {
        self.first.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// Columns where both rows carry a residue
    pub fn matched_columns(&self) -> usize {
        self.first
            .chars()
            .zip(self.second.chars())
            .filter(|&(a, b)| a != '.' && b != '.')
            .count()
    }
}

impl fmt::Display for SequenceAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.first)?;
        write!(f, "{}", self.second)
    }
}

/// Outcome of one descriptor comparison, refined in place during the search
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// RMSD of the origin-element superposition
    pub origin_rmsd: f64,
    /// `min(aligned / first total, aligned / second total)` over elements
    pub aligned_elements_ratio: f64,
    /// Same ratio over residues
    pub aligned_residues_ratio: f64,
    /// RMSD of the superposition over the whole alignment
    pub alignment_rmsd: f64,
    /// Transform mapping descriptor A onto descriptor B
    pub transform: RigidTransform,
    /// Similarity verdict
    pub similar: bool,
    /// Aligned elements, origin included
    pub aligned_elements: usize,
    pub aligned_residues: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_alignment: Option<SequenceAlignment>,
}

impl ComparisonResult {
    #[inline]
    pub fn is_structurally_similar(&self) -> bool {
        self.similar
    }
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "similar={} origin_rmsd={:.3} elements={:.3} ({}) residues={:.3} ({}) rmsd={:.3}",
            self.similar,
            self.origin_rmsd,
            self.aligned_elements_ratio,
            self.aligned_elements,
            self.aligned_residues_ratio,
            self.aligned_residues,
            self.alignment_rmsd,
        )
    }
}
