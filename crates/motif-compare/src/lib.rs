//! Structural motif comparison core
//!
//! Compares two descriptors (an origin element plus satellite elements) and
//! searches for the best geometrically consistent matching of their
//! satellites:
//!
//! - [`DuplexSimilarityMatrix`] - satellite pairs scored in the origin frame
//! - [`Alignment`] / [`ExtendedAlignment`] - accumulated residue correspondence
//! - [`AcceptancePolicy`] - threshold gate and ranking shared by all strategies
//! - [`search`] - exhaustive backtracking and Hungarian-driven heuristics
//! - [`DescriptorComparator`] - orchestration and sequence alignment text
//!
//! # Example
//!
//! ```rust
//! use lin_alg::f64::Vec3;
//! use motif_compare::{ComparisonSettings, DescriptorComparator};
//! use motif_mol::{Descriptor, DescriptorsPair, Element, Residue, ResidueKey};
//!
//! fn glycine(chain: &str, shift: f64) -> Element {
//!     let residue = Residue::new(ResidueKey::new(chain, "GLY", 1, ' '))
//!         .with_atom("N", Vec3::new(shift, 0.0, 0.0))
//!         .with_atom("CA", Vec3::new(shift + 1.4, 0.3, 0.0))
//!         .with_atom("C", Vec3::new(shift + 2.0, 1.5, 0.2))
//!         .with_atom("O", Vec3::new(shift + 1.6, 2.6, -0.3));
//!     Element::new(vec![residue], 0).unwrap()
//! }
//!
//! let a = Descriptor::new("A1", 0, glycine("A", 0.0), Vec::new()).unwrap();
//! let b = Descriptor::new("B1", 0, glycine("B", 5.0), Vec::new()).unwrap();
//!
//! let comparator = DescriptorComparator::new(ComparisonSettings::default());
//! let result = comparator.compare(DescriptorsPair::new(&a, &b)).unwrap().unwrap();
//! assert!(result.is_structurally_similar());
//! assert!(result.origin_rmsd < 1e-6);
//! ```

mod acceptance;
mod alignment;
mod comparator;
mod duplex;
mod error;
mod precision;
mod result;
pub mod search;
mod sequence;
mod settings;
mod verifier;

pub use acceptance::{AcceptancePolicy, DescriptorTotals};
pub use alignment::{Alignment, ExtendedAlignment};
pub use comparator::{Comparison, DescriptorComparator};
pub use duplex::{AlignedDuplexesPair, DuplexSimilarityMatrix};
pub use error::{CompareError, CompareResult};
pub use precision::ComparisonPrecision;
pub use result::{ComparisonResult, SequenceAlignment};
pub use search::{
    AssignmentMode, SearchBudget, SearchContext, SearchOutcome, SearchStats, SearchStrategy,
};
pub use sequence::sequence_alignment;
pub use settings::{ComparisonSettings, DEFAULT_MAX_PARTIAL_ASSIGNMENTS};
pub use verifier::SimilarDescriptorsVerifier;
