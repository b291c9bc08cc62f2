//! Descriptor elements
//!
//! An element is a contiguous window of up to `2k+1` residues centered on one
//! residue, where `k` is the descriptor's neighborhood size. Windows near a
//! chain terminus are shorter.

use crate::error::{MolError, MolResult};
use crate::residue::Residue;

/// A contiguous residue window centered on one residue
#[derive(Debug, Clone)]
pub struct Element {
    residues: Vec<Residue>,
    center: usize,
}

impl Element {
    /// Create an element; `center` indexes into `residues`
    pub fn new(residues: Vec<Residue>, center: usize) -> MolResult<Self> {
        if residues.is_empty() {
            return Err(MolError::EmptyElement);
        }
        if center >= residues.len() {
            return Err(MolError::CenterOutOfBounds {
                center,
                len: residues.len(),
            });
        }
        Ok(Element { residues, center })
    }

    /// Residues in window order
    #[inline]
    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// The residue this element is centered on
    #[inline]
    pub fn central_residue(&self) -> &Residue {
        &self.residues[self.center]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}
