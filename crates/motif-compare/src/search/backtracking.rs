//! Exhaustive branch-and-bound over candidate duplex pairs
//!
//! Each subset of mutually exclusive duplex pairs is visited at most once:
//! a node picks one pair from group `p` and only recurses into the groups
//! after `p`, with every pair that reuses the chosen B satellite removed.
//!
//! Three prunes keep the tree small:
//! - bound: the remaining groups cannot reach the incumbent's element count
//! - rejection memo: under count-only precision, a sibling whose own subtree
//!   produced nothing dominates later siblings with fewer options
//! - domination: a recorded alignment already contains every alignment the
//!   node could still produce

use log::{trace, warn};

use super::{SearchContext, SearchOutcome, SearchStats};
use crate::alignment::ExtendedAlignment;
use crate::duplex::AlignedDuplexesPair;
use crate::error::CompareResult;

/// A-satellite index with its remaining candidates, best RMSD first
type Group = (usize, Vec<AlignedDuplexesPair>);

/// Sibling whose subtree had no accepted alignment
struct Rejection {
    residues: usize,
    available: Vec<AlignedDuplexesPair>,
}

impl Rejection {
    /// A later sibling adds no more residues and no new options
    fn dominates(&self, residues: usize, rest: &[Group]) -> bool {
        residues <= self.residues
            && rest
                .iter()
                .flat_map(|(_, pairs)| pairs)
                .all(|pair| self.available.contains(pair))
    }
}

struct Backtracker<'c, 's, 'a> {
    context: &'c SearchContext<'s, 'a>,
    current: ExtendedAlignment<'a>,
    best: ExtendedAlignment<'a>,
    recorded: Vec<ExtendedAlignment<'a>>,
    stats: SearchStats,
    stop: bool,
}

/// Run the exhaustive search from the origin-only `seed`
pub fn search<'a>(
    context: &SearchContext<'_, 'a>,
    seed: ExtendedAlignment<'a>,
) -> CompareResult<SearchOutcome<'a>> {
    let verifier = context.policy.verifier();
    let groups: Vec<Group> = context
        .matrix
        .groups()
        .iter()
        .map(|(&first, pairs)| {
            let kept = pairs
                .iter()
                .copied()
                .filter(|p| verifier.is_duplex_similar(p.rmsd))
                .collect::<Vec<_>>();
            (first, kept)
        })
        .filter(|(_, pairs)| !pairs.is_empty())
        .collect();

    let mut backtracker = Backtracker {
        context,
        current: seed.clone(),
        best: seed,
        recorded: Vec::new(),
        stats: SearchStats::default(),
        stop: false,
    };

    let below = backtracker.explore(&groups)?;
    if !below && backtracker.current.is_updated() {
        backtracker.record();
    }

    if backtracker.stats.budget_exhausted {
        warn!(
            "Backtracking budget exhausted after {} nodes; returning best alignment so far",
            backtracker.stats.nodes
        );
    }

    Ok(SearchOutcome {
        best: backtracker.best,
        maximal_alignments: backtracker.recorded,
        stats: backtracker.stats,
    })
}

impl<'a> Backtracker<'_, '_, 'a> {
    /// Try every pair of every group; true if anything below was accepted
    fn explore(&mut self, groups: &[Group]) -> CompareResult<bool> {
        let context = self.context;
        let count_only = !context.policy.precision().checks_alignment_rmsd();
        let mut accepted_below = false;
        let mut rejection: Option<Rejection> = None;

        for (p, (_, pairs)) in groups.iter().enumerate() {
            if self.stop {
                break;
            }
            let reachable = self.current.aligned_elements() + (groups.len() - p);
            if reachable < self.best.aligned_elements() {
                trace!("bound: {reachable} elements reachable, incumbent has {}", self.best.aligned_elements());
                break;
            }

            for pair in pairs {
                if self.stop {
                    break;
                }
                if !context.budget.allows(self.stats.nodes) {
                    self.stats.budget_exhausted = true;
                    self.stop = true;
                    break;
                }

                let rest = exclude(&groups[p + 1..], pair);
                let element = context.matrix.alignment(pair)?;
                let residues = element.len();

                if let Some(memo) = &rejection {
                    if memo.dominates(residues, &rest) {
                        trace!("memo: skipping {pair}");
                        continue;
                    }
                }
                if self.is_dominated(pair, &rest) {
                    trace!("dominated: skipping {pair}");
                    continue;
                }

                self.stats.nodes += 1;
                self.current.add_aligned_duplexes_pair(*pair, element.clone());
                let outcome = self.visit(&rest);
                self.current.remove_last_aligned_duplexes_pair();

                if outcome? {
                    accepted_below = true;
                    rejection = None;
                } else if count_only {
                    rejection = Some(Rejection {
                        residues,
                        available: rest.iter().flat_map(|(_, pairs)| pairs.iter().copied()).collect(),
                    });
                }
            }
        }
        Ok(accepted_below)
    }

    /// Evaluate the freshly pushed pair, then its subtree
    fn visit(&mut self, rest: &[Group]) -> CompareResult<bool> {
        let policy = self.context.policy;
        let accepted = policy.accept(&mut self.current)?;
        if accepted {
            self.stats.accepted += 1;
            policy.promote(&mut self.current, &mut self.best)?;
        }
        let below = self.explore(rest)?;
        if accepted && !below {
            self.record();
        }
        Ok(accepted || below)
    }

    /// Keep the current alignment as maximal unless a recorded one covers it
    fn record(&mut self) {
        if self.recorded.iter().any(|r| r.covers(&self.current)) {
            return;
        }
        let current = &self.current;
        self.recorded.retain(|r| !current.covers(r));
        trace!("recorded alignment with {} pairs", current.pair_count());
        self.recorded.push(current.clone());
        if self.context.first_alignment_only {
            self.stop = true;
        }
    }

    /// A recorded alignment contains the current pairs, `pair` and all of `rest`
    fn is_dominated(&self, pair: &AlignedDuplexesPair, rest: &[Group]) -> bool {
        self.recorded.iter().any(|r| {
            r.contains_pair(pair)
                && r.covers(&self.current)
                && rest
                    .iter()
                    .flat_map(|(_, pairs)| pairs)
                    .all(|q| r.contains_pair(q))
        })
    }
}

/// Later groups without the pairs that reuse `chosen`'s B satellite
fn exclude(groups: &[Group], chosen: &AlignedDuplexesPair) -> Vec<Group> {
    groups
        .iter()
        .filter_map(|(first, pairs)| {
            let kept: Vec<_> = pairs
                .iter()
                .copied()
                .filter(|p| p.second != chosen.second)
                .collect();
            (!kept.is_empty()).then_some((*first, kept))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptance::{AcceptancePolicy, DescriptorTotals};
    use crate::alignment::Alignment;
    use crate::duplex::DuplexSimilarityMatrix;
    use crate::precision::ComparisonPrecision;
    use crate::result::ComparisonResult;
    use crate::search::SearchBudget;
    use crate::verifier::SimilarDescriptorsVerifier;
    use lin_alg::f64::Vec3;
    use motif_mol::{AlignmentAtoms, Descriptor, DescriptorsPair, Element, Residue, ResidueKey};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn single(chain: &str, resv: i32) -> Element {
        let x = resv as f64;
        let residue = Residue::new(ResidueKey::new(chain, "GLY", resv, ' '))
            .with_atom("N", Vec3::new(x, 0.0, 0.0))
            .with_atom("CA", Vec3::new(x, 1.0, 0.0))
            .with_atom("C", Vec3::new(x, 1.0, 1.0));
        Element::new(vec![residue], 0).unwrap()
    }

    fn descriptor(chain: &str, satellites: usize) -> Descriptor {
        let sats = (0..satellites).map(|i| single(chain, 10 + i as i32)).collect();
        Descriptor::new(chain, 0, single(chain, 1), sats).unwrap()
    }

    fn policy(a: &Descriptor, b: &Descriptor, verifier: SimilarDescriptorsVerifier) -> AcceptancePolicy {
        AcceptancePolicy::new(
            verifier,
            ComparisonPrecision::AllRulesExceptAlignmentRmsd,
            DescriptorTotals {
                first_elements: a.element_count(),
                second_elements: b.element_count(),
                first_residues: a.residue_count(),
                second_residues: b.residue_count(),
            },
        )
    }

    fn seed<'a>(pair: DescriptorsPair<'a>, policy: &AcceptancePolicy) -> ExtendedAlignment<'a> {
        let atoms = AlignmentAtoms::default();
        let origin = Alignment::from_elements(
            pair.first.origin(),
            pair.second.origin(),
            &atoms,
            pair.first.molecule_type(),
        )
        .unwrap();
        let mut seed = ExtendedAlignment::new(origin, ComparisonResult::default());
        policy.accept(&mut seed).unwrap();
        seed
    }

    fn run_search<'a>(
        pair: DescriptorsPair<'a>,
        matrix: &DuplexSimilarityMatrix<'a>,
        policy: &AcceptancePolicy,
        first_only: bool,
    ) -> SearchOutcome<'a> {
        let context = SearchContext {
            matrix,
            policy,
            first_alignment_only: first_only,
            budget: SearchBudget::unlimited(),
            max_partial_assignments: 100,
        };
        search(&context, seed(pair, policy)).unwrap()
    }

    /// Largest matching in a small bipartite graph
    fn max_matching(pairs: &[(usize, usize)], n: usize) -> usize {
        fn go(pairs: &[(usize, usize)], used_a: &mut Vec<bool>, used_b: &mut Vec<bool>, from: usize) -> usize {
            let mut best = 0;
            for (k, &(i, j)) in pairs.iter().enumerate().skip(from) {
                if !used_a[i] && !used_b[j] {
                    used_a[i] = true;
                    used_b[j] = true;
                    best = best.max(1 + go(pairs, used_a, used_b, k + 1));
                    used_a[i] = false;
                    used_b[j] = false;
                }
            }
            best
        }
        go(pairs, &mut vec![false; n], &mut vec![false; n], 0)
    }

    #[test]
    fn test_two_of_three_elements() {
        let (a, b) = (descriptor("A", 2), descriptor("B", 2));
        let pair = DescriptorsPair::new(&a, &b);
        let matrix = DuplexSimilarityMatrix::from_candidates(
            pair,
            &AlignmentAtoms::default(),
            [AlignedDuplexesPair::new(0, 0, 1.0), AlignedDuplexesPair::new(1, 1, 5.0)],
        )
        .unwrap();
        let verifier = SimilarDescriptorsVerifier {
            min_aligned_elements: 0.5,
            min_aligned_residues: 0.5,
            ..Default::default()
        };
        let policy = policy(&a, &b, verifier);
        let outcome = run_search(pair, &matrix, &policy, false);

        let pairs: Vec<_> = outcome.best.pairs().copied().collect();
        assert_eq!(pairs, vec![AlignedDuplexesPair::new(0, 0, 1.0)]);
        let result = outcome.best.result();
        assert!(result.similar);
        assert!((result.aligned_elements_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(outcome.maximal_alignments.len(), 1);
    }

    #[test]
    fn test_mutual_exclusion_on_second_index() {
        let (a, b) = (descriptor("A", 2), descriptor("B", 2));
        let pair = DescriptorsPair::new(&a, &b);
        // Both A satellites like B0 best; only one may take it
        let matrix = DuplexSimilarityMatrix::from_candidates(
            pair,
            &AlignmentAtoms::default(),
            [
                AlignedDuplexesPair::new(0, 0, 0.1),
                AlignedDuplexesPair::new(1, 0, 0.2),
                AlignedDuplexesPair::new(1, 1, 2.0),
            ],
        )
        .unwrap();
        let verifier = SimilarDescriptorsVerifier {
            min_aligned_elements: 0.0,
            min_aligned_residues: 0.0,
            ..Default::default()
        };
        let policy = policy(&a, &b, verifier);
        let outcome = run_search(pair, &matrix, &policy, false);
        let mut pairs: Vec<_> = outcome.best.pairs().map(|p| p.indices()).collect();
        pairs.sort();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
        assert_eq!(outcome.best.aligned_elements(), 3);
    }

    #[test]
    fn test_first_alignment_only_stops_early() {
        let (a, b) = (descriptor("A", 3), descriptor("B", 3));
        let pair = DescriptorsPair::new(&a, &b);
        let candidates = (0..3).flat_map(|i| (0..3).map(move |j| AlignedDuplexesPair::new(i, j, (i + j) as f64 * 0.1)));
        let matrix = DuplexSimilarityMatrix::from_candidates(pair, &AlignmentAtoms::default(), candidates).unwrap();
        let verifier = SimilarDescriptorsVerifier {
            min_aligned_elements: 0.0,
            min_aligned_residues: 0.0,
            ..Default::default()
        };
        let policy = policy(&a, &b, verifier);
        let all = run_search(pair, &matrix, &policy, false);
        let first = run_search(pair, &matrix, &policy, true);
        assert_eq!(first.maximal_alignments.len(), 1);
        assert!(first.stats.nodes < all.stats.nodes);
        assert_eq!(all.best.aligned_elements(), 4);
    }

    #[test]
    fn test_budget_returns_incumbent() {
        let (a, b) = (descriptor("A", 3), descriptor("B", 3));
        let pair = DescriptorsPair::new(&a, &b);
        let candidates = (0..3).flat_map(|i| (0..3).map(move |j| AlignedDuplexesPair::new(i, j, 0.5)));
        let matrix = DuplexSimilarityMatrix::from_candidates(pair, &AlignmentAtoms::default(), candidates).unwrap();
        let policy = policy(&a, &b, SimilarDescriptorsVerifier::default());
        let context = SearchContext {
            matrix: &matrix,
            policy: &policy,
            first_alignment_only: false,
            budget: SearchBudget::nodes(2),
            max_partial_assignments: 100,
        };
        let outcome = search(&context, seed(pair, &policy)).unwrap();
        assert!(outcome.stats.budget_exhausted);
        assert_eq!(outcome.stats.nodes, 2);
    }

    #[test]
    fn test_matches_brute_force_matching() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..60 {
            let n = rng.gen_range(1..=5);
            let (a, b) = (descriptor("A", n), descriptor("B", n));
            let pair = DescriptorsPair::new(&a, &b);
            let mut edges = Vec::new();
            for i in 0..n {
                for j in 0..n {
                    if rng.gen_bool(0.35) {
                        edges.push((i, j));
                    }
                }
            }
            let candidates = edges
                .iter()
                .map(|&(i, j)| AlignedDuplexesPair::new(i, j, rng.gen_range(0.0..3.0)))
                .collect::<Vec<_>>();
            let matrix = DuplexSimilarityMatrix::from_candidates(pair, &AlignmentAtoms::default(), candidates).unwrap();

            // Demand at least two satellites so the memo gets exercised
            let needed = (3.0 / (n as f64 + 1.0)).min(1.0);
            let verifier = SimilarDescriptorsVerifier {
                min_aligned_elements: needed,
                min_aligned_residues: needed,
                ..Default::default()
            };
            let policy = policy(&a, &b, verifier);
            let outcome = run_search(pair, &matrix, &policy, false);

            let optimum = max_matching(&edges, n);
            if optimum + 1 >= 3.min(n + 1) {
                assert!(outcome.best.result().similar, "n={n} edges={edges:?}");
                assert_eq!(outcome.best.pair_count(), optimum, "n={n} edges={edges:?}");
            } else {
                assert!(!outcome.best.result().similar, "n={n} edges={edges:?}");
            }
        }
    }
}
