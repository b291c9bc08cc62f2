//! Descriptors and descriptor pairs
//!
//! A descriptor is one origin element plus zero or more satellite elements.
//! It is built once and stays read-only while it is compared.

use ahash::AHashMap;

use crate::element::Element;
use crate::error::{MolError, MolResult};
use crate::residue::{MoleculeType, Residue, ResidueKey};

/// A local structural motif
#[derive(Debug, Clone)]
pub struct Descriptor {
    id: String,
    neighborhood: usize,
    molecule_type: MoleculeType,
    origin: Element,
    satellites: Vec<Element>,
}

impl Descriptor {
    /// Build a descriptor from its origin and satellite elements.
    ///
    /// Every element must fit the `2k+1` window, elements must not share
    /// residues, and all classified residues must agree on a molecule type.
    /// A descriptor without any classified residue is treated as protein.
    pub fn new(
        id: impl Into<String>,
        neighborhood: usize,
        origin: Element,
        satellites: Vec<Element>,
    ) -> MolResult<Self> {
        let max = 2 * neighborhood + 1;
        let mut owner: AHashMap<&ResidueKey, usize> = AHashMap::new();
        let mut molecule_type: Option<MoleculeType> = None;

        for (index, element) in std::iter::once(&origin).chain(satellites.iter()).enumerate() {
            if element.len() > max {
                return Err(MolError::NeighborhoodMismatch {
                    index,
                    len: element.len(),
                    neighborhood,
                    max,
                });
            }
            for residue in element.residues() {
                if let Some(&other) = owner.get(&residue.key) {
                    return Err(MolError::OverlappingElements(other, index, residue.key.to_string()));
                }
                owner.insert(&residue.key, index);

                match (molecule_type, residue.molecule_type()) {
                    (None, found) => molecule_type = found,
                    (Some(known), Some(found)) if known != found => {
                        return Err(MolError::MixedMoleculeTypes(known.to_string(), found.to_string()));
                    }
                    _ => {}
                }
            }
        }

        Ok(Descriptor {
            id: id.into(),
            neighborhood,
            molecule_type: molecule_type.unwrap_or(MoleculeType::Protein),
            origin,
            satellites,
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Neighborhood size `k`
    #[inline]
    pub fn neighborhood(&self) -> usize {
        self.neighborhood
    }

    #[inline]
    pub fn molecule_type(&self) -> MoleculeType {
        self.molecule_type
    }

    #[inline]
    pub fn origin(&self) -> &Element {
        &self.origin
    }

    #[inline]
    pub fn satellites(&self) -> &[Element] {
        &self.satellites
    }

    /// Satellite element by index
    pub fn satellite(&self, index: usize) -> MolResult<&Element> {
        self.satellites
            .get(index)
            .ok_or(MolError::ElementIndexOutOfBounds(index, self.satellites.len()))
    }

    #[inline]
    pub fn satellite_count(&self) -> usize {
        self.satellites.len()
    }

    /// Number of elements including the origin
    #[inline]
    pub fn element_count(&self) -> usize {
        self.satellites.len() + 1
    }

    /// True when the descriptor has no satellite elements
    #[inline]
    pub fn is_single_element(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn residue_count(&self) -> usize {
        self.origin.len() + self.satellites.iter().map(Element::len).sum::<usize>()
    }

    /// All residues in residue-number order
    pub fn residues(&self) -> Vec<&Residue> {
        let mut residues: Vec<&Residue> = std::iter::once(&self.origin)
            .chain(self.satellites.iter())
            .flat_map(|e| e.residues().iter())
            .collect();
        residues.sort_by(|a, b| a.key.cmp(&b.key));
        residues
    }

    /// Number of maximal chain-connected residue runs
    pub fn segment_count(&self) -> usize {
        let residues = self.residues();
        let breaks = residues
            .windows(2)
            .filter(|w| !w[1].key.follows(&w[0].key))
            .count();
        if residues.is_empty() {
            0
        } else {
            breaks + 1
        }
    }
}

/// Two descriptors under comparison
#[derive(Debug, Clone, Copy)]
pub struct DescriptorsPair<'a> {
    pub first: &'a Descriptor,
    pub second: &'a Descriptor,
}

impl<'a> DescriptorsPair<'a> {
    pub fn new(first: &'a Descriptor, second: &'a Descriptor) -> Self {
        DescriptorsPair { first, second }
    }

    /// Descriptors are comparable only with equal neighborhood sizes
    #[inline]
    pub fn is_comparable(&self) -> bool {
        self.first.neighborhood() == self.second.neighborhood()
    }

    /// The same pair with first and second exchanged
    #[inline]
    pub fn swapped(&self) -> DescriptorsPair<'a> {
        DescriptorsPair {
            first: self.second,
            second: self.first,
        }
    }
}
