//! Alignment state accumulated during the search
//!
//! [`Alignment`] is a 1:1 residue correspondence between two descriptors
//! under one shared rigid transform. [`ExtendedAlignment`] adds the ordered
//! list of accepted duplex pairs and the cached [`ComparisonResult`].
//!
//! Both are plain values: cloning gives an independent snapshot, which is
//! what lets search branches mutate their own copy.

use std::fmt::Write as _;

use lin_alg::f64::Vec3;
use motif_algos::{superimpose, AlignError, Superposition};
use motif_mol::{AlignmentAtoms, Element, MoleculeType, Residue};

use crate::duplex::AlignedDuplexesPair;
use crate::result::ComparisonResult;

/// One residue correspondence with its name-paired alignment points
#[derive(Debug, Clone)]
struct AlignedResidue<'a> {
    first: &'a Residue,
    second: &'a Residue,
    first_points: Vec<Vec3>,
    second_points: Vec<Vec3>,
}

/// Ordered residue correspondence between descriptor A and descriptor B.
///
/// Residues are kept in residue-number order of descriptor A.
#[derive(Debug, Clone, Default)]
pub struct Alignment<'a> {
    residues: Vec<AlignedResidue<'a>>,
}

impl<'a> Alignment<'a> {
    /// Align two elements position by position.
    ///
    /// Returns `None` when the windows have different lengths.
    pub fn from_elements(
        first: &'a Element,
        second: &'a Element,
        atoms: &AlignmentAtoms,
        molecule_type: MoleculeType,
    ) -> Option<Self> {
        if first.len() != second.len() {
            return None;
        }
        let mut alignment = Alignment::default();
        for (a, b) in first.residues().iter().zip(second.residues()) {
            let (first_points, second_points) = atoms.paired_points(molecule_type, a, b);
            alignment.insert(AlignedResidue {
                first: a,
                second: b,
                first_points,
                second_points,
            });
        }
        Some(alignment)
    }

    fn insert(&mut self, residue: AlignedResidue<'a>) {
        let at = self
            .residues
            .partition_point(|r| r.first.key <= residue.first.key);
        self.residues.insert(at, residue);
    }

    /// Insert all residues of `other`, preserving residue-number order
    pub fn extend(&mut self, other: &Alignment<'a>) {
        for residue in &other.residues {
            self.insert(residue.clone());
        }
    }

    /// Remove the residues a matching [`extend`](Self::extend) inserted.
    ///
    /// Returns false if some residue pair of `other` was not present; the
    /// pairs that were present are still removed.
    #[must_use]
    pub fn remove(&mut self, other: &Alignment<'a>) -> bool {
        let mut complete = true;
        for residue in &other.residues {
            let key = &residue.first.key;
            let at = self.residues.partition_point(|r| r.first.key < *key);
            let found = self
                .residues
                .get(at)
                .is_some_and(|r| r.first.key == *key && r.second.key == residue.second.key);
            if found {
                self.residues.remove(at);
            } else {
                complete = false;
            }
        }
        complete
    }

    /// Number of aligned residue pairs
    #[inline]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Aligned (first, second) residues in order
    pub fn residue_pairs(&self) -> impl Iterator<Item = (&'a Residue, &'a Residue)> + '_ {
        self.residues.iter().map(|r| (r.first, r.second))
    }

    /// Alignment points of descriptor A, flattened in residue order
    pub fn first_points(&self) -> Vec<Vec3> {
        self.residues.iter().flat_map(|r| r.first_points.iter().copied()).collect()
    }

    /// Alignment points of descriptor B, matching [`first_points`](Self::first_points)
    pub fn second_points(&self) -> Vec<Vec3> {
        self.residues.iter().flat_map(|r| r.second_points.iter().copied()).collect()
    }

    pub fn point_count(&self) -> usize {
        self.residues.iter().map(|r| r.first_points.len()).sum()
    }

    /// Superimpose all current points of A onto B
    pub fn superimpose(&self) -> Result<Superposition, AlignError> {
        superimpose(&self.first_points(), &self.second_points())
    }
}

#[derive(Debug, Clone)]
struct Extension<'a> {
    pair: AlignedDuplexesPair,
    alignment: Alignment<'a>,
    saved_result: ComparisonResult,
    saved_updated: bool,
    saved_rmsd_current: bool,
}

/// An alignment together with the duplex pairs that built it
#[derive(Debug, Clone)]
pub struct ExtendedAlignment<'a> {
    alignment: Alignment<'a>,
    extensions: Vec<Extension<'a>>,
    result: ComparisonResult,
    updated: bool,
    rmsd_current: bool,
}

impl<'a> ExtendedAlignment<'a> {
    /// Seed with the origin-only alignment and its superposition result
    pub fn new(origin: Alignment<'a>, result: ComparisonResult) -> Self {
        ExtendedAlignment {
            alignment: origin,
            extensions: Vec::new(),
            result,
            updated: false,
            rmsd_current: true,
        }
    }

    #[inline]
    pub fn alignment(&self) -> &Alignment<'a> {
        &self.alignment
    }

    #[inline]
    pub fn result(&self) -> &ComparisonResult {
        &self.result
    }

    #[inline]
    pub fn result_mut(&mut self) -> &mut ComparisonResult {
        &mut self.result
    }

    pub fn into_result(self) -> ComparisonResult {
        self.result
    }

    /// Accepted duplex pairs, in the order they were added
    pub fn pairs(&self) -> impl Iterator<Item = &AlignedDuplexesPair> + '_ {
        self.extensions.iter().map(|e| &e.pair)
    }

    pub fn pair_count(&self) -> usize {
        self.extensions.len()
    }

    /// Aligned elements, counting the origin
    #[inline]
    pub fn aligned_elements(&self) -> usize {
        self.extensions.len() + 1
    }

    #[inline]
    pub fn aligned_residues(&self) -> usize {
        self.alignment.len()
    }

    /// Whether the last push passed the acceptance thresholds
    #[inline]
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub(crate) fn mark_updated(&mut self) {
        self.updated = true;
    }

    pub(crate) fn clear_updated(&mut self) {
        self.updated = false;
    }

    /// Whether `result().alignment_rmsd` reflects the current residues
    #[inline]
    pub(crate) fn is_rmsd_current(&self) -> bool {
        self.rmsd_current
    }

    pub(crate) fn set_superposition(&mut self, superposition: &Superposition) {
        self.result.alignment_rmsd = superposition.rmsd;
        self.result.transform = superposition.transform;
        self.rmsd_current = true;
    }

    /// Push a duplex pair and extend the residue alignment with it
    pub fn add_aligned_duplexes_pair(&mut self, pair: AlignedDuplexesPair, alignment: Alignment<'a>) {
        self.alignment.extend(&alignment);
        self.extensions.push(Extension {
            pair,
            alignment,
            saved_result: self.result.clone(),
            saved_updated: self.updated,
            saved_rmsd_current: self.rmsd_current,
        });
        self.updated = false;
        self.rmsd_current = false;
    }

    /// Undo the last [`add_aligned_duplexes_pair`](Self::add_aligned_duplexes_pair)
    pub fn remove_last_aligned_duplexes_pair(&mut self) -> Option<AlignedDuplexesPair> {
        let last = self.extensions.pop()?;
        let restored = self.alignment.remove(&last.alignment);
        debug_assert!(restored, "extension {} was not part of the alignment", last.pair);
        self.result = last.saved_result;
        self.updated = last.saved_updated;
        self.rmsd_current = last.saved_rmsd_current;
        Some(last.pair)
    }

    pub fn contains_pair(&self, pair: &AlignedDuplexesPair) -> bool {
        self.pairs().any(|p| p == pair)
    }

    /// True iff every pair of `other` is also in `self`
    pub fn covers(&self, other: &ExtendedAlignment<'_>) -> bool {
        other.pairs().all(|p| self.contains_pair(p))
    }

    /// Human-readable list of the chosen duplex pairs
    pub fn describe_duplex_pairs(&self) -> String {
        let mut out = String::new();
        for pair in self.pairs() {
            let _ = writeln!(out, "{pair}");
        }
        out
    }
}
