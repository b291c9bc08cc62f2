//! Residues and residue-name classification
//!
//! A descriptor is a read-only collection of residues. Each residue carries
//! its identifying key and the named atoms used for superposition.

use std::cmp::Ordering;
use std::fmt;

use lin_alg::f64::Vec3;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Key for uniquely identifying a residue within a model
///
/// Ordering follows chain, then residue number, then insertion code, which
/// is the residue-number order alignments preserve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueKey {
    /// Chain identifier
    pub chain: String,
    /// Residue name (e.g., "ALA", "G")
    pub resn: String,
    /// Residue sequence number
    pub resv: i32,
    /// Insertion code
    pub inscode: char,
}

impl ResidueKey {
    /// Create a new residue key
    pub fn new(
        chain: impl Into<String>,
        resn: impl Into<String>,
        resv: i32,
        inscode: char,
    ) -> Self {
        ResidueKey {
            chain: chain.into(),
            resn: resn.into(),
            resv,
            inscode,
        }
    }

    /// Whether `self` directly follows `prev` on the same chain
    pub fn follows(&self, prev: &ResidueKey) -> bool {
        self.chain == prev.chain && self.resv == prev.resv + 1
    }
}

impl Ord for ResidueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain
            .cmp(&other.chain)
            .then(self.resv.cmp(&other.resv))
            .then(self.inscode.cmp(&other.inscode))
            .then_with(|| self.resn.cmp(&other.resn))
    }
}

impl PartialOrd for ResidueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inscode != ' ' && self.inscode != '\0' {
            write!(f, "{}/{}'{}{}", self.chain, self.resn, self.resv, self.inscode)
        } else {
            write!(f, "{}/{}'{}", self.chain, self.resn, self.resv)
        }
    }
}

/// Macromolecule type of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeType {
    Protein,
    Rna,
}

impl MoleculeType {
    /// Classify a residue name, `None` for ligands, water and unknowns
    pub fn from_resn(resn: &str) -> Option<Self> {
        if is_amino_acid(resn) {
            Some(MoleculeType::Protein)
        } else if is_nucleotide(resn) {
            Some(MoleculeType::Rna)
        } else {
            None
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoleculeType::Protein => write!(f, "protein"),
            MoleculeType::Rna => write!(f, "RNA"),
        }
    }
}

/// A residue with the atoms available for superposition
#[derive(Debug, Clone)]
pub struct Residue {
    pub key: ResidueKey,
    atoms: Vec<(String, Vec3)>,
}

impl Residue {
    pub fn new(key: ResidueKey) -> Self {
        Residue { key, atoms: Vec::new() }
    }

    /// Builder-style atom insertion
    pub fn with_atom(mut self, name: impl Into<String>, coord: Vec3) -> Self {
        self.add_atom(name, coord);
        self
    }

    /// Add or replace a named atom
    pub fn add_atom(&mut self, name: impl Into<String>, coord: Vec3) {
        let name = name.into();
        if let Some(slot) = self.atoms.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = coord;
        } else {
            self.atoms.push((name, coord));
        }
    }

    /// Look up an atom position by name
    pub fn atom(&self, name: &str) -> Option<Vec3> {
        self.atoms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    /// Iterate over (name, position) pairs in insertion order
    pub fn atoms(&self) -> impl Iterator<Item = (&str, Vec3)> {
        self.atoms.iter().map(|(n, c)| (n.as_str(), *c))
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Centroid of all atoms, `None` for an atomless residue
    pub fn centroid(&self) -> Option<Vec3> {
        if self.atoms.is_empty() {
            return None;
        }
        let n = self.atoms.len() as f64;
        let (x, y, z) = self
            .atoms
            .iter()
            .fold((0.0, 0.0, 0.0), |acc, (_, c)| (acc.0 + c.x, acc.1 + c.y, acc.2 + c.z));
        Some(Vec3::new(x / n, y / n, z / n))
    }

    #[inline]
    pub fn molecule_type(&self) -> Option<MoleculeType> {
        MoleculeType::from_resn(&self.key.resn)
    }

    /// One-letter display code
    #[inline]
    pub fn one_letter(&self) -> char {
        residue_to_char(&self.key.resn)
    }
}

/// Convert 3-letter amino acid code to 1-letter code
pub fn three_to_one(resn: &str) -> Option<char> {
    match resn {
        "ALA" => Some('A'), "ARG" => Some('R'), "ASN" => Some('N'),
        "ASP" => Some('D'), "CYS" => Some('C'), "GLN" => Some('Q'),
        "GLU" => Some('E'), "GLY" => Some('G'), "HIS" => Some('H'),
        "ILE" => Some('I'), "LEU" => Some('L'), "LYS" => Some('K'),
        "MET" => Some('M'), "PHE" => Some('F'), "PRO" => Some('P'),
        "SER" => Some('S'), "THR" => Some('T'), "TRP" => Some('W'),
        "TYR" => Some('Y'), "VAL" => Some('V'),
        "HID" | "HIE" | "HIP" | "HSD" | "HSE" | "HSP" => Some('H'),
        "CYX" => Some('C'),
        "MSE" => Some('M'), "SEC" => Some('U'), "PYL" => Some('O'),
        "SEP" => Some('S'), "TPO" => Some('T'), "PTR" => Some('Y'),
        "UNK" => Some('X'),
        _ => None,
    }
}

/// Convert nucleotide residue name to single character
///
/// Modified nucleotides map to the lowercase parent base.
pub fn nucleotide_to_char(resn: &str) -> Option<char> {
    match resn {
        "A" | "ADE" => Some('A'),
        "G" | "GUA" => Some('G'),
        "C" | "CYT" => Some('C'),
        "U" | "URA" => Some('U'),
        "I" => Some('I'),
        "N" => Some('n'),
        "PSU" | "H2U" | "5MU" | "4SU" | "5BU" | "BRU" => Some('u'),
        "5MC" | "OMC" => Some('c'),
        "OMG" | "M2G" | "7MG" | "2MG" | "YYG" => Some('g'),
        "1MA" => Some('a'),
        _ => None,
    }
}

/// Display character for any residue ('?' for unknown)
pub fn residue_to_char(resn: &str) -> char {
    three_to_one(resn)
        .or_else(|| nucleotide_to_char(resn))
        .unwrap_or('?')
}

// Invariants:
//   is_amino_acid(x)  ⟹  three_to_one(x).is_some()
//   is_nucleotide(x)  ⟹  nucleotide_to_char(x).is_some()

/// Amino acids: canonical (true) + variants (false)
static AMINO_ACIDS: phf::Map<&str, bool> = phf_map! {
    "ALA" => true, "ARG" => true, "ASN" => true, "ASP" => true, "CYS" => true,
    "GLN" => true, "GLU" => true, "GLY" => true, "HIS" => true, "ILE" => true,
    "LEU" => true, "LYS" => true, "MET" => true, "PHE" => true, "PRO" => true,
    "SER" => true, "THR" => true, "TRP" => true, "TYR" => true, "VAL" => true,
    "HID" => false, "HIE" => false, "HIP" => false,
    "HSP" => false, "HSD" => false, "HSE" => false,
    "CYX" => false, "MSE" => false, "SEC" => false, "PYL" => false,
    "SEP" => false, "TPO" => false, "PTR" => false, "UNK" => false,
};

/// Ribonucleotides: standard (true) + modified (false)
static NUCLEOTIDES: phf::Map<&str, bool> = phf_map! {
    "A" => true, "C" => true, "G" => true, "U" => true, "I" => true, "N" => true,
    "ADE" => true, "CYT" => true, "GUA" => true, "URA" => true,
    "PSU" => false, "5MC" => false, "OMC" => false, "OMG" => false,
    "M2G" => false, "5MU" => false, "7MG" => false, "2MG" => false,
    "H2U" => false, "YYG" => false, "1MA" => false, "4SU" => false,
    "5BU" => false, "BRU" => false,
};

/// Returns `true` only for the 20 canonical amino acids.
pub fn is_standard_amino_acid(resn: &str) -> bool {
    AMINO_ACIDS.get(resn) == Some(&true)
}

/// Check if a residue name is an amino acid (canonical + variants).
pub fn is_amino_acid(resn: &str) -> bool {
    AMINO_ACIDS.contains_key(resn)
}

/// Check if a residue name is a ribonucleotide (standard + modified).
pub fn is_nucleotide(resn: &str) -> bool {
    NUCLEOTIDES.contains_key(resn)
}
