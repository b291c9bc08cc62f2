//! Search strategies over the duplex-pair similarity matrix
//!
//! Both strategies start from the origin-only alignment and extend it with
//! duplex pairs, sharing the [`AcceptancePolicy`] for gating and ranking:
//!
//! - [`backtracking`] - exhaustive branch-and-bound
//! - [`assignment`] - Hungarian-method driven heuristic

pub mod assignment;
pub mod backtracking;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::acceptance::AcceptancePolicy;
use crate::alignment::ExtendedAlignment;
use crate::duplex::DuplexSimilarityMatrix;
use crate::error::{CompareError, CompareResult};

/// Which assignments the Hungarian-driven search evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentMode {
    /// Stop at the first (largest) assignment under the RMSD budget
    First,
    /// Every assignment size down to the floor
    Longest,
    /// As `Longest`, plus partial sub-assignments of each
    LongestWithPartials,
}

/// Search strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SearchStrategy {
    #[default]
    Backtracking,
    AssignmentDriven(AssignmentMode),
}

impl SearchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Backtracking => "backtracking",
            SearchStrategy::AssignmentDriven(AssignmentMode::First) => "hungarian-first",
            SearchStrategy::AssignmentDriven(AssignmentMode::Longest) => "hungarian-longest",
            SearchStrategy::AssignmentDriven(AssignmentMode::LongestWithPartials) => "hungarian-partials",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchStrategy {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backtracking" => Ok(SearchStrategy::Backtracking),
            "hungarian-first" => Ok(SearchStrategy::AssignmentDriven(AssignmentMode::First)),
            "hungarian-longest" => Ok(SearchStrategy::AssignmentDriven(AssignmentMode::Longest)),
            "hungarian-partials" => Ok(SearchStrategy::AssignmentDriven(AssignmentMode::LongestWithPartials)),
            _ => Err(CompareError::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for SearchStrategy {
    type Error = CompareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SearchStrategy> for String {
    fn from(value: SearchStrategy) -> Self {
        value.name().to_string()
    }
}

/// Upper bound on search work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBudget {
    /// Candidate extensions (backtracking) or assignments (Hungarian) to evaluate.
    /// `None` means unlimited.
    pub max_nodes: Option<usize>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        SearchBudget { max_nodes: None }
    }

    pub fn nodes(max_nodes: usize) -> Self {
        SearchBudget {
            max_nodes: Some(max_nodes),
        }
    }

    #[inline]
    pub fn allows(&self, visited: usize) -> bool {
        self.max_nodes.map_or(true, |max| visited < max)
    }
}

/// Counters reported by a search run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Candidate extensions or assignments evaluated
    pub nodes: usize,
    /// Candidates that passed acceptance
    pub accepted: usize,
    /// The search stopped because the budget ran out
    pub budget_exhausted: bool,
}

/// Everything a strategy needs for one comparison
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'s, 'a> {
    pub matrix: &'s DuplexSimilarityMatrix<'a>,
    pub policy: &'s AcceptancePolicy,
    pub first_alignment_only: bool,
    pub budget: SearchBudget,
    pub max_partial_assignments: usize,
}

/// Best alignment found plus the maximal accepted alignments seen on the way
#[derive(Debug, Clone)]
pub struct SearchOutcome<'a> {
    pub best: ExtendedAlignment<'a>,
    pub maximal_alignments: Vec<ExtendedAlignment<'a>>,
    pub stats: SearchStats,
}

/// Run `strategy` from the origin-only `seed`.
///
/// The seed must already have gone through [`AcceptancePolicy::accept`].
pub fn run<'a>(
    strategy: SearchStrategy,
    context: &SearchContext<'_, 'a>,
    seed: ExtendedAlignment<'a>,
) -> CompareResult<SearchOutcome<'a>> {
    match strategy {
        SearchStrategy::Backtracking => backtracking::search(context, seed),
        SearchStrategy::AssignmentDriven(mode) => assignment::search(context, seed, mode),
    }
}
