//! Descriptor comparison entry point
//!
//! [`DescriptorComparator::compare`] superimposes the origin elements, scores
//! every satellite pair under that frame, runs the configured search, and
//! reports the best alignment with its sequence alignment text.

use log::debug;
use motif_mol::{Descriptor, DescriptorsPair};

use crate::acceptance::{ensure_rmsd, AcceptancePolicy, DescriptorTotals};
use crate::alignment::{Alignment, ExtendedAlignment};
use crate::duplex::DuplexSimilarityMatrix;
use crate::error::{CompareError, CompareResult};
use crate::result::ComparisonResult;
use crate::search::{self, SearchContext, SearchOutcome, SearchStats};
use crate::sequence::sequence_alignment;
use crate::settings::ComparisonSettings;

/// Full outcome of one comparison
#[derive(Debug, Clone)]
pub struct Comparison<'a> {
    pub result: ComparisonResult,
    /// Winning alignment, for callers that persist aligned structures
    pub alignment: ExtendedAlignment<'a>,
    /// Duplex-pair similarity matrix; `None` for origin-only comparisons
    pub matrix: Option<DuplexSimilarityMatrix<'a>>,
    pub stats: SearchStats,
}

/// Compares descriptor pairs under one set of [`ComparisonSettings`]
#[derive(Debug, Clone, Default)]
pub struct DescriptorComparator {
    settings: ComparisonSettings,
}

impl DescriptorComparator {
    pub fn new(settings: ComparisonSettings) -> Self {
        DescriptorComparator { settings }
    }

    #[inline]
    pub fn settings(&self) -> &ComparisonSettings {
        &self.settings
    }

    /// Compare `pair`, mapping descriptor A onto descriptor B.
    ///
    /// Returns `Ok(None)` when the origin elements are too different for the
    /// pair to be compared at all. A negative verdict is `Ok(Some(result))`
    /// with `is_structurally_similar() == false`.
    pub fn compare(&self, pair: DescriptorsPair<'_>) -> CompareResult<Option<ComparisonResult>> {
        Ok(self.compare_detailed(pair)?.map(|comparison| comparison.result))
    }

    /// Like [`compare`](Self::compare), also returning the winning alignment,
    /// the similarity matrix and search statistics
    pub fn compare_detailed<'a>(&self, pair: DescriptorsPair<'a>) -> CompareResult<Option<Comparison<'a>>> {
        let (first, second) = (pair.first, pair.second);
        if !pair.is_comparable() {
            return Err(CompareError::UncomparableDescriptors {
                first: first.id().to_string(),
                first_k: first.neighborhood(),
                second: second.id().to_string(),
                second_k: second.neighborhood(),
            });
        }
        if first.molecule_type() != second.molecule_type() {
            return Err(CompareError::MoleculeTypeMismatch(first.molecule_type(), second.molecule_type()));
        }

        let settings = &self.settings;
        let Some(origin) =
            Alignment::from_elements(first.origin(), second.origin(), &settings.atoms, first.molecule_type())
        else {
            debug!("{} vs {}: origin windows differ in length", first.id(), second.id());
            return Ok(None);
        };
        if origin.point_count() == 0 {
            debug!("{} vs {}: no shared alignment atoms in origins", first.id(), second.id());
            return Ok(None);
        }

        let origin_fit = origin.superimpose()?;
        debug!("{} vs {}: origin rmsd {:.3}", first.id(), second.id(), origin_fit.rmsd);

        let policy = AcceptancePolicy::new(settings.verifier, settings.precision, totals(first, second));
        let mut seed = ExtendedAlignment::new(
            origin,
            ComparisonResult {
                origin_rmsd: origin_fit.rmsd,
                alignment_rmsd: origin_fit.rmsd,
                transform: origin_fit.transform,
                ..Default::default()
            },
        );

        if first.is_single_element() || second.is_single_element() {
            policy.accept(&mut seed)?;
            let origin_similar = settings.verifier.is_origin_similar(origin_fit.rmsd);
            let text = sequence_alignment(pair, seed.alignment());
            let result = seed.result_mut();
            result.similar = result.similar && origin_similar;
            result.sequence_alignment = Some(text);
            let result = seed.result().clone();
            debug!("origin-only comparison: {result}");
            return Ok(Some(Comparison {
                result,
                alignment: seed,
                matrix: None,
                stats: SearchStats::default(),
            }));
        }

        if !settings.verifier.is_origin_similar(origin_fit.rmsd) {
            debug!(
                "origin rmsd {:.3} above {:.3}; pair is incomparable",
                origin_fit.rmsd, settings.verifier.max_origin_rmsd
            );
            return Ok(None);
        }

        policy.accept(&mut seed)?;
        let matrix = DuplexSimilarityMatrix::build(pair, &origin_fit.transform, &settings.atoms, &settings.verifier)?;
        debug!("{matrix}");

        let outcome = if coverage_reachable(&matrix, &policy, seed.aligned_residues())? {
            debug!("searching with {}", settings.strategy);
            let context = SearchContext {
                matrix: &matrix,
                policy: &policy,
                first_alignment_only: settings.first_alignment_only,
                budget: settings.budget,
                max_partial_assignments: settings.max_partial_assignments,
            };
            search::run(settings.strategy, &context, seed)?
        } else {
            debug!("coverage thresholds unreachable; search skipped");
            SearchOutcome {
                best: seed,
                maximal_alignments: Vec::new(),
                stats: SearchStats::default(),
            }
        };

        let mut best = outcome.best;
        ensure_rmsd(&mut best)?;
        let text = sequence_alignment(pair, best.alignment());
        best.result_mut().sequence_alignment = Some(text);
        let result = best.result().clone();
        debug!("{} vs {}: {result}, {} nodes", first.id(), second.id(), outcome.stats.nodes);

        Ok(Some(Comparison {
            result,
            alignment: best,
            matrix: Some(matrix),
            stats: outcome.stats,
        }))
    }
}

fn totals(first: &Descriptor, second: &Descriptor) -> DescriptorTotals {
    DescriptorTotals {
        first_elements: first.element_count(),
        second_elements: second.element_count(),
        first_residues: first.residue_count(),
        second_residues: second.residue_count(),
    }
}

/// Upper bound check: could any matching still meet the coverage thresholds?
fn coverage_reachable(
    matrix: &DuplexSimilarityMatrix<'_>,
    policy: &AcceptancePolicy,
    origin_residues: usize,
) -> CompareResult<bool> {
    let max_pairs = matrix.groups().len().min(matrix.matched_second_count());
    let mut widest = Vec::with_capacity(matrix.groups().len());
    for pairs in matrix.groups().values() {
        let mut most = 0;
        for pair in pairs {
            most = most.max(matrix.alignment(pair)?.len());
        }
        widest.push(most);
    }
    widest.sort_unstable_by(|a, b| b.cmp(a));
    let residues = origin_residues + widest.iter().take(max_pairs).sum::<usize>();

    let verifier = policy.verifier();
    let totals = policy.totals();
    if !verifier.has_enough_aligned_residues(totals.residues_ratio(residues)) {
        return Ok(false);
    }
    if policy.precision().checks_elements()
        && !verifier.has_enough_aligned_elements(totals.elements_ratio(1 + max_pairs))
    {
        return Ok(false);
    }
    Ok(true)
}
