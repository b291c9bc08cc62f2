//! Comparison precision levels
//!
//! Each level checks everything the previous one does plus one more rule;
//! the cheap ratio checks always run before the full superposition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompareError;

/// Which acceptance rules are enforced during the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonPrecision {
    /// Only the aligned-residue ratio
    AlignedResiduesConsideredOnly,
    /// Aligned residues and aligned elements
    AllRulesExceptAlignmentRmsd,
    /// Everything, including the global alignment RMSD
    #[default]
    AllRulesConsidered,
}

impl ComparisonPrecision {
    #[inline]
    pub fn checks_elements(self) -> bool {
        self >= ComparisonPrecision::AllRulesExceptAlignmentRmsd
    }

    #[inline]
    pub fn checks_alignment_rmsd(self) -> bool {
        self >= ComparisonPrecision::AllRulesConsidered
    }
}

impl fmt::Display for ComparisonPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComparisonPrecision::AlignedResiduesConsideredOnly => "ALIGNED_RESIDUES_CONSIDERED_ONLY",
            ComparisonPrecision::AllRulesExceptAlignmentRmsd => "ALL_RULES_EXCEPT_ALIGNMENT_RMSD",
            ComparisonPrecision::AllRulesConsidered => "ALL_RULES_CONSIDERED",
        };
        f.write_str(name)
    }
}

impl FromStr for ComparisonPrecision {
    type Err = CompareError;

    /// Accepts the serialized names in any case, with `-` or `_` separators
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ALIGNED_RESIDUES_CONSIDERED_ONLY" => Ok(ComparisonPrecision::AlignedResiduesConsideredOnly),
            "ALL_RULES_EXCEPT_ALIGNMENT_RMSD" => Ok(ComparisonPrecision::AllRulesExceptAlignmentRmsd),
            "ALL_RULES_CONSIDERED" => Ok(ComparisonPrecision::AllRulesConsidered),
            _ => Err(CompareError::UnknownPrecision(s.to_string())),
        }
    }
}
