//! Alignment-atom selection
//!
//! Superposition works on a configured list of atom names per molecule type.
//! Atoms are paired by name between two residues; a name missing on either
//! side shrinks that residue's contribution instead of failing.

use lin_alg::f64::Vec3;
use serde::{Deserialize, Serialize};

use crate::residue::{MoleculeType, Residue};

/// Pseudo atom name resolving to the centroid of all residue atoms
pub const CENTROID_ATOM: &str = "CEN";

/// Configured alignment atom names per molecule type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentAtoms {
    pub protein: Vec<String>,
    pub rna: Vec<String>,
}

impl Default for AlignmentAtoms {
    fn default() -> Self {
        Self {
            protein: ["N", "CA", "C", "O"].iter().map(|s| s.to_string()).collect(),
            rna: ["P", "C4'", "C1'"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AlignmentAtoms {
    pub fn names(&self, molecule_type: MoleculeType) -> &[String] {
        match molecule_type {
            MoleculeType::Protein => &self.protein,
            MoleculeType::Rna => &self.rna,
        }
    }

    /// Upper bound of points a single residue contributes
    #[inline]
    pub fn atoms_per_residue(&self, molecule_type: MoleculeType) -> usize {
        self.names(molecule_type).len()
    }

    fn resolve(residue: &Residue, name: &str) -> Option<Vec3> {
        if name == CENTROID_ATOM {
            residue.centroid()
        } else {
            residue.atom(name)
        }
    }

    /// Alignment points of one residue, in configured name order
    pub fn points(&self, molecule_type: MoleculeType, residue: &Residue) -> Vec<Vec3> {
        self.names(molecule_type)
            .iter()
            .filter_map(|name| Self::resolve(residue, name))
            .collect()
    }

    /// Corresponding alignment points of two residues.
    ///
    /// Only names present in both residues are used, so the two returned
    /// point lists always have equal length.
    pub fn paired_points(
        &self,
        molecule_type: MoleculeType,
        first: &Residue,
        second: &Residue,
    ) -> (Vec<Vec3>, Vec<Vec3>) {
        self.names(molecule_type)
            .iter()
            .filter_map(|name| Some((Self::resolve(first, name)?, Self::resolve(second, name)?)))
            .unzip()
    }
}
