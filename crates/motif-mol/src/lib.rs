//! Motif-RS Descriptor Data Model
//!
//! This crate provides the read-only structures the comparison core consumes:
//!
//! - [`Residue`] - Residue key plus named atom positions
//! - [`Element`] - A contiguous `2k+1` residue window around one residue
//! - [`Descriptor`] - One origin element plus satellite elements
//! - [`DescriptorsPair`] - Two descriptors under comparison
//! - [`AlignmentAtoms`] - Atom names used for superposition, per molecule type
//!
//! # Example
//!
//! ```rust
//! use motif_mol::{Descriptor, Element, Residue, ResidueKey};
//! use lin_alg::f64::Vec3;
//!
//! let residue = Residue::new(ResidueKey::new("A", "GLY", 7, ' '))
//!     .with_atom("CA", Vec3::new(1.0, 2.0, 3.0));
//! let origin = Element::new(vec![residue], 0).unwrap();
//! let descriptor = Descriptor::new("A7", 0, origin, Vec::new()).unwrap();
//!
//! assert!(descriptor.is_single_element());
//! assert_eq!(descriptor.residue_count(), 1);
//! ```

mod atoms;
mod descriptor;
mod element;
mod error;
mod residue;

pub use atoms::{AlignmentAtoms, CENTROID_ATOM};
pub use descriptor::{Descriptor, DescriptorsPair};
pub use element::Element;
pub use error::{MolError, MolResult};
pub use residue::{
    is_amino_acid, is_nucleotide, is_standard_amino_acid, nucleotide_to_char, residue_to_char,
    three_to_one, MoleculeType, Residue, ResidueKey,
};
