//! Comparison configuration
//!
//! Every field has a default, so a JSON document only needs the values it
//! changes:
//!
//! ```rust
//! use motif_compare::{ComparisonSettings, SearchStrategy};
//!
//! let settings = ComparisonSettings::from_json(
//!     r#"{ "strategy": "hungarian-longest", "verifier": { "max_origin_rmsd": 0.8 } }"#,
//! ).unwrap();
//! assert_eq!(settings.strategy.to_string(), "hungarian-longest");
//! assert_eq!(settings.verifier.max_duplex_rmsd, 3.5);
//! assert_eq!(settings.strategy, "hungarian-longest".parse::<SearchStrategy>().unwrap());
//! ```

use motif_mol::AlignmentAtoms;
use serde::{Deserialize, Serialize};

use crate::error::CompareResult;
use crate::precision::ComparisonPrecision;
use crate::search::{SearchBudget, SearchStrategy};
use crate::verifier::SimilarDescriptorsVerifier;

/// Default cap on enumerated partial assignments
pub const DEFAULT_MAX_PARTIAL_ASSIGNMENTS: usize = 10_000;

/// Everything that parameterizes a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    pub verifier: SimilarDescriptorsVerifier,
    pub precision: ComparisonPrecision,
    pub strategy: SearchStrategy,
    /// Stop at the first accepted maximal alignment
    pub first_alignment_only: bool,
    /// Atom names used for superposition, per molecule type
    pub atoms: AlignmentAtoms,
    pub budget: SearchBudget,
    /// Upper bound on sub-assignments enumerated by `hungarian-partials`
    pub max_partial_assignments: usize,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        ComparisonSettings {
            verifier: SimilarDescriptorsVerifier::default(),
            precision: ComparisonPrecision::default(),
            strategy: SearchStrategy::default(),
            first_alignment_only: false,
            atoms: AlignmentAtoms::default(),
            budget: SearchBudget::unlimited(),
            max_partial_assignments: DEFAULT_MAX_PARTIAL_ASSIGNMENTS,
        }
    }
}

impl ComparisonSettings {
    /// Parse settings from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> CompareResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> CompareResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_precision(mut self, precision: ComparisonPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_verifier(mut self, verifier: SimilarDescriptorsVerifier) -> Self {
        self.verifier = verifier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompareError;
    use crate::search::AssignmentMode;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ComparisonSettings::from_json("{}").unwrap(), ComparisonSettings::default());
    }

    #[test]
    fn test_round_trip() {
        let settings = ComparisonSettings {
            precision: ComparisonPrecision::AlignedResiduesConsideredOnly,
            strategy: SearchStrategy::AssignmentDriven(AssignmentMode::LongestWithPartials),
            budget: SearchBudget::nodes(500),
            ..Default::default()
        };
        let json = settings.to_json().unwrap();
        assert!(json.contains("\"ALIGNED_RESIDUES_CONSIDERED_ONLY\""));
        assert!(json.contains("\"hungarian-partials\""));
        assert_eq!(ComparisonSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_bad_strategy() {
        let err = ComparisonSettings::from_json(r#"{"strategy": "simulated-annealing"}"#).unwrap_err();
        assert!(matches!(err, CompareError::Settings(_)));
    }
}
