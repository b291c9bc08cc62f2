//! Duplex pairs and the duplex-pair similarity matrix
//!
//! A duplex pair `(i, j, rmsd)` matches satellite `i` of descriptor A with
//! satellite `j` of descriptor B. The RMSD is measured after moving A's
//! satellite with the origin superposition, without refitting, so it tells
//! how well the pair agrees with the frame the origins already define.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use ahash::AHashMap;
use motif_algos::{rmsd, RigidTransform};
use motif_mol::{AlignmentAtoms, DescriptorsPair};

use crate::alignment::Alignment;
use crate::error::{CompareError, CompareResult};
use crate::verifier::SimilarDescriptorsVerifier;

/// Candidate correspondence between satellite `first` of A and `second` of B.
///
/// Equality and hashing use the index pair only.
#[derive(Debug, Clone, Copy)]
pub struct AlignedDuplexesPair {
    pub first: usize,
    pub second: usize,
    pub rmsd: f64,
}

impl AlignedDuplexesPair {
    pub fn new(first: usize, second: usize, rmsd: f64) -> Self {
        AlignedDuplexesPair { first, second, rmsd }
    }

    #[inline]
    pub fn indices(&self) -> (usize, usize) {
        (self.first, self.second)
    }

    /// Ascending RMSD, ties broken by the B index
    pub fn cmp_by_rmsd(&self, other: &Self) -> Ordering {
        self.rmsd
            .total_cmp(&other.rmsd)
            .then(self.second.cmp(&other.second))
    }
}

impl PartialEq for AlignedDuplexesPair {
    fn eq(&self, other: &Self) -> bool {
        self.indices() == other.indices()
    }
}

impl Eq for AlignedDuplexesPair {}

impl Hash for AlignedDuplexesPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.indices().hash(state);
    }
}

impl fmt::Display for AlignedDuplexesPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) rmsd={:.3}", self.first, self.second, self.rmsd)
    }
}

/// Candidate duplex pairs grouped by A satellite, plus their element alignments
#[derive(Debug, Clone)]
pub struct DuplexSimilarityMatrix<'a> {
    groups: BTreeMap<usize, Vec<AlignedDuplexesPair>>,
    alignments: AHashMap<(usize, usize), Alignment<'a>>,
    first_satellites: usize,
    second_satellites: usize,
}

impl<'a> DuplexSimilarityMatrix<'a> {
    /// Score every satellite of A against every satellite of B.
    ///
    /// A's satellite points are moved with `origin_transform` and compared
    /// with B's as they are. Pairs above the per-duplex ceiling are dropped.
    pub fn build(
        pair: DescriptorsPair<'a>,
        origin_transform: &RigidTransform,
        atoms: &AlignmentAtoms,
        verifier: &SimilarDescriptorsVerifier,
    ) -> CompareResult<Self> {
        let molecule_type = pair.first.molecule_type();
        let mut matrix = DuplexSimilarityMatrix::empty(pair);

        for (i, first) in pair.first.satellites().iter().enumerate() {
            for (j, second) in pair.second.satellites().iter().enumerate() {
                let Some(alignment) = Alignment::from_elements(first, second, atoms, molecule_type)
                else {
                    continue;
                };
                if alignment.point_count() == 0 {
                    continue;
                }
                let moved = origin_transform.apply_all(&alignment.first_points());
                let value = rmsd(&moved, &alignment.second_points())?;
                if !verifier.is_duplex_similar(value) {
                    continue;
                }
                matrix.insert(AlignedDuplexesPair::new(i, j, value), alignment);
            }
        }

        matrix.sort_groups();
        Ok(matrix)
    }

    /// Build a matrix from precomputed candidate pairs.
    ///
    /// Pairs whose elements cannot be aligned are skipped; RMSD values are
    /// taken as given.
    pub fn from_candidates(
        pair: DescriptorsPair<'a>,
        atoms: &AlignmentAtoms,
        candidates: impl IntoIterator<Item = AlignedDuplexesPair>,
    ) -> CompareResult<Self> {
        let molecule_type = pair.first.molecule_type();
        let mut matrix = DuplexSimilarityMatrix::empty(pair);
        for candidate in candidates {
            let first = pair.first.satellite(candidate.first)?;
            let second = pair.second.satellite(candidate.second)?;
            if let Some(alignment) = Alignment::from_elements(first, second, atoms, molecule_type) {
                matrix.insert(candidate, alignment);
            }
        }
        matrix.sort_groups();
        Ok(matrix)
    }

    fn empty(pair: DescriptorsPair<'a>) -> Self {
        DuplexSimilarityMatrix {
            groups: BTreeMap::new(),
            alignments: AHashMap::new(),
            first_satellites: pair.first.satellite_count(),
            second_satellites: pair.second.satellite_count(),
        }
    }

    fn insert(&mut self, pair: AlignedDuplexesPair, alignment: Alignment<'a>) {
        self.groups.entry(pair.first).or_default().push(pair);
        self.alignments.insert(pair.indices(), alignment);
    }

    fn sort_groups(&mut self) {
        for pairs in self.groups.values_mut() {
            pairs.sort_by(AlignedDuplexesPair::cmp_by_rmsd);
        }
    }

    /// Candidate groups keyed by A satellite index, each sorted by ascending RMSD
    pub fn groups(&self) -> &BTreeMap<usize, Vec<AlignedDuplexesPair>> {
        &self.groups
    }

    /// Candidates for one A satellite
    pub fn candidates(&self, first: usize) -> &[AlignedDuplexesPair] {
        self.groups.get(&first).map(Vec::as_slice).unwrap_or(&[])
    }

    /// RMSD of a candidate pair, if it survived the ceiling
    pub fn rmsd(&self, first: usize, second: usize) -> Option<f64> {
        self.candidates(first)
            .iter()
            .find(|p| p.second == second)
            .map(|p| p.rmsd)
    }

    /// Element alignment backing a candidate pair
    pub fn alignment(&self, pair: &AlignedDuplexesPair) -> CompareResult<&Alignment<'a>> {
        self.alignments
            .get(&pair.indices())
            .ok_or(CompareError::UnknownDuplexPair(pair.first, pair.second))
    }

    pub fn first_satellites(&self) -> usize {
        self.first_satellites
    }

    pub fn second_satellites(&self) -> usize {
        self.second_satellites
    }

    pub fn pair_count(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// Number of distinct B satellites that appear in any candidate
    pub fn matched_second_count(&self) -> usize {
        let mut seen = vec![false; self.second_satellites];
        for pair in self.groups.values().flatten() {
            if let Some(slot) = seen.get_mut(pair.second) {
                *slot = true;
            }
        }
        seen.into_iter().filter(|s| *s).count()
    }
}

impl fmt::Display for DuplexSimilarityMatrix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Duplex similarity matrix ({} x {} satellites, {} candidates)",
            self.first_satellites,
            self.second_satellites,
            self.pair_count()
        )?;
        for (first, pairs) in &self.groups {
            write!(f, "{first:>4}:")?;
            for pair in pairs {
                write!(f, " {}:{:.3}", pair.second, pair.rmsd)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
