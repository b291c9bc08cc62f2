//! Acceptance and ranking of candidate alignments
//!
//! Both search strategies share this policy. A candidate is first measured
//! (coverage ratios), then gated by the configured [`ComparisonPrecision`],
//! cheapest rule first, and finally ranked against the incumbent.

use log::trace;

use crate::alignment::ExtendedAlignment;
use crate::error::CompareResult;
use crate::precision::ComparisonPrecision;
use crate::verifier::SimilarDescriptorsVerifier;

/// Element and residue totals of the two descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorTotals {
    pub first_elements: usize,
    pub second_elements: usize,
    pub first_residues: usize,
    pub second_residues: usize,
}

impl DescriptorTotals {
    /// `min(aligned / first, aligned / second)` over elements
    pub fn elements_ratio(&self, aligned: usize) -> f64 {
        ratio(aligned, self.first_elements, self.second_elements)
    }

    /// `min(aligned / first, aligned / second)` over residues
    pub fn residues_ratio(&self, aligned: usize) -> f64 {
        ratio(aligned, self.first_residues, self.second_residues)
    }
}

fn ratio(aligned: usize, first: usize, second: usize) -> f64 {
    let largest = first.max(second);
    if largest == 0 {
        return 0.0;
    }
    aligned as f64 / largest as f64
}

/// Threshold gate plus the total order used to pick the best alignment
#[derive(Debug, Clone, Copy)]
pub struct AcceptancePolicy {
    verifier: SimilarDescriptorsVerifier,
    precision: ComparisonPrecision,
    totals: DescriptorTotals,
}

impl AcceptancePolicy {
    pub fn new(
        verifier: SimilarDescriptorsVerifier,
        precision: ComparisonPrecision,
        totals: DescriptorTotals,
    ) -> Self {
        AcceptancePolicy {
            verifier,
            precision,
            totals,
        }
    }

    #[inline]
    pub fn verifier(&self) -> &SimilarDescriptorsVerifier {
        &self.verifier
    }

    #[inline]
    pub fn precision(&self) -> ComparisonPrecision {
        self.precision
    }

    #[inline]
    pub fn totals(&self) -> &DescriptorTotals {
        &self.totals
    }

    /// Refresh counts and ratios of `candidate`; clears the verdict and the updated flag
    pub fn measure(&self, candidate: &mut ExtendedAlignment<'_>) {
        candidate.clear_updated();
        let elements = candidate.aligned_elements();
        let residues = candidate.aligned_residues();
        let result = candidate.result_mut();
        result.aligned_elements = elements;
        result.aligned_residues = residues;
        result.aligned_elements_ratio = self.totals.elements_ratio(elements);
        result.aligned_residues_ratio = self.totals.residues_ratio(residues);
        result.similar = false;
    }

    /// Gate `candidate` by the enabled rules.
    ///
    /// On success the candidate is marked updated and its verdict set. The
    /// whole-alignment superposition only runs when the cheaper ratio checks
    /// have passed and the precision asks for it.
    pub fn accept(&self, candidate: &mut ExtendedAlignment<'_>) -> CompareResult<bool> {
        self.measure(candidate);
        let result = candidate.result();

        if !self.verifier.has_enough_aligned_residues(result.aligned_residues_ratio) {
            trace!("rejected: residue ratio {:.3}", result.aligned_residues_ratio);
            return Ok(false);
        }
        if self.precision.checks_elements()
            && !self.verifier.has_enough_aligned_elements(result.aligned_elements_ratio)
        {
            trace!("rejected: element ratio {:.3}", result.aligned_elements_ratio);
            return Ok(false);
        }
        if self.precision.checks_alignment_rmsd() {
            let superposition = candidate.alignment().superimpose()?;
            candidate.set_superposition(&superposition);
            if !self.verifier.is_alignment_similar(superposition.rmsd) {
                trace!("rejected: alignment rmsd {:.3}", superposition.rmsd);
                return Ok(false);
            }
        }

        candidate.result_mut().similar = true;
        candidate.mark_updated();
        Ok(true)
    }

    /// Replace `best` with `candidate` if the candidate was accepted and ranks higher.
    ///
    /// Ranking: larger element ratio, then larger residue ratio, then strictly
    /// lower alignment RMSD. An incumbent that was never accepted always loses.
    pub fn promote<'a>(
        &self,
        candidate: &mut ExtendedAlignment<'a>,
        best: &mut ExtendedAlignment<'a>,
    ) -> CompareResult<bool> {
        if !candidate.is_updated() {
            return Ok(false);
        }
        let better = if !best.result().similar {
            true
        } else {
            let (c, b) = (candidate.result(), best.result());
            if c.aligned_elements_ratio != b.aligned_elements_ratio {
                c.aligned_elements_ratio > b.aligned_elements_ratio
            } else if c.aligned_residues_ratio != b.aligned_residues_ratio {
                c.aligned_residues_ratio > b.aligned_residues_ratio
            } else {
                ensure_rmsd(candidate)?;
                ensure_rmsd(best)?;
                candidate.result().alignment_rmsd < best.result().alignment_rmsd
            }
        };
        if better {
            trace!(
                "new best: {} pairs, elements {:.3}, residues {:.3}",
                candidate.pair_count(),
                candidate.result().aligned_elements_ratio,
                candidate.result().aligned_residues_ratio
            );
            *best = candidate.clone();
        }
        Ok(better)
    }
}

/// Recompute the whole-alignment superposition if pushes made it stale
pub(crate) fn ensure_rmsd(alignment: &mut ExtendedAlignment<'_>) -> CompareResult<()> {
    if !alignment.is_rmsd_current() {
        let superposition = alignment.alignment().superimpose()?;
        alignment.set_superposition(&superposition);
    }
    Ok(())
}
