//! Similarity thresholds
//!
//! The verifier only holds thresholds and answers predicates; it never
//! inspects descriptors itself.

use serde::{Deserialize, Serialize};

/// Thresholds deciding whether two descriptors are structurally similar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarDescriptorsVerifier {
    /// Maximal RMSD of the origin-element superposition (Å)
    pub max_origin_rmsd: f64,
    /// Maximal RMSD of a satellite pair under the origin frame (Å)
    pub max_duplex_rmsd: f64,
    /// Minimal fraction of aligned elements, 0..=1
    pub min_aligned_elements: f64,
    /// Minimal fraction of aligned residues, 0..=1
    pub min_aligned_residues: f64,
    /// Maximal RMSD of the whole alignment (Å)
    pub max_alignment_rmsd: f64,
}

impl Default for SimilarDescriptorsVerifier {
    fn default() -> Self {
        Self {
            max_origin_rmsd: 1.20,
            max_duplex_rmsd: 3.50,
            min_aligned_elements: 0.80,
            min_aligned_residues: 0.6666,
            max_alignment_rmsd: 3.50,
        }
    }
}

impl SimilarDescriptorsVerifier {
    #[inline]
    pub fn is_origin_similar(&self, rmsd: f64) -> bool {
        rmsd <= self.max_origin_rmsd
    }

    #[inline]
    pub fn is_duplex_similar(&self, rmsd: f64) -> bool {
        rmsd <= self.max_duplex_rmsd
    }

    #[inline]
    pub fn has_enough_aligned_elements(&self, ratio: f64) -> bool {
        ratio >= self.min_aligned_elements
    }

    #[inline]
    pub fn has_enough_aligned_residues(&self, ratio: f64) -> bool {
        ratio >= self.min_aligned_residues
    }

    #[inline]
    pub fn is_alignment_similar(&self, rmsd: f64) -> bool {
        rmsd <= self.max_alignment_rmsd
    }
}
