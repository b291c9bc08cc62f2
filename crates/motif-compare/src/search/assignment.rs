//! Hungarian-method driven search
//!
//! Treats "best one-to-one matching of satellites" as an assignment problem.
//! For each target size `s`, from `min(satA, satB)` down to the floor, a
//! square cost matrix with slack rows and columns forces exactly `s` real
//! matches; the Hungarian solver then picks the cheapest. This is a
//! heuristic: it can miss matchings the exhaustive search would find.

use ahash::AHashSet;
use log::{debug, info, trace, warn};
use motif_algos::solve_assignment;

use super::{AssignmentMode, SearchContext, SearchOutcome, SearchStats};
use crate::alignment::ExtendedAlignment;
use crate::duplex::{AlignedDuplexesPair, DuplexSimilarityMatrix};
use crate::error::CompareResult;

/// Cost of a forbidden cell
pub const SENTINEL: f64 = 1.0e6;

type Assignment = Vec<AlignedDuplexesPair>;

/// Smallest assignment size worth solving for.
///
/// `max(1, floor(min_ratio · (max_n + 1)) − 1)`, where the `+ 1` and `− 1`
/// account for the origin element.
pub fn assignment_floor(min_elements_ratio: f64, max_n: usize) -> usize {
    let elements = (min_elements_ratio.max(0.0) * (max_n + 1) as f64).floor() as usize;
    elements.saturating_sub(1).max(1)
}

/// Square cost matrix forcing exactly `size` real-to-real matches.
///
/// Rows are A's satellites plus `satB − size` slack rows; columns are B's
/// satellites plus `satA − size` slack columns. Real-to-slack cells are free,
/// slack-to-slack and unknown real pairs cost [`SENTINEL`].
pub fn cost_matrix(matrix: &DuplexSimilarityMatrix<'_>, max_duplex_rmsd: f64, size: usize) -> Vec<Vec<f64>> {
    let (n1, n2) = (matrix.first_satellites(), matrix.second_satellites());
    let n = n1 + n2 - size;
    (0..n)
        .map(|row| {
            (0..n)
                .map(|col| match (row < n1, col < n2) {
                    (true, true) => matrix
                        .rmsd(row, col)
                        .filter(|&rmsd| rmsd <= max_duplex_rmsd)
                        .unwrap_or(SENTINEL),
                    (false, false) => SENTINEL,
                    _ => 0.0,
                })
                .collect()
        })
        .collect()
}

fn pair_key(pairs: &[AlignedDuplexesPair]) -> Vec<(usize, usize)> {
    let mut key: Vec<_> = pairs.iter().map(|p| p.indices()).collect();
    key.sort_unstable();
    key
}

fn total_rmsd(pairs: &[AlignedDuplexesPair]) -> f64 {
    pairs.iter().map(|p| p.rmsd).sum()
}

fn is_strict_subset(small: &[AlignedDuplexesPair], large: &[AlignedDuplexesPair]) -> bool {
    small.len() < large.len() && small.iter().all(|p| large.contains(p))
}

/// Solve the shrinking assignment problems and evaluate what they yield
pub fn search<'a>(
    context: &SearchContext<'_, 'a>,
    seed: ExtendedAlignment<'a>,
    mode: AssignmentMode,
) -> CompareResult<SearchOutcome<'a>> {
    let matrix = context.matrix;
    let verifier = context.policy.verifier();
    let (n1, n2) = (matrix.first_satellites(), matrix.second_satellites());
    let min_n = n1.min(n2);
    let floor = assignment_floor(verifier.min_aligned_elements, n1.max(n2));
    let stop_at_first = mode == AssignmentMode::First || context.first_alignment_only;

    let mut assignments: Vec<Assignment> = Vec::new();
    let mut seen: AHashSet<Vec<(usize, usize)>> = AHashSet::new();

    for size in (floor..=min_n).rev() {
        let costs = cost_matrix(matrix, verifier.max_duplex_rmsd, size);
        let solution = solve_assignment(&costs)?;
        let pairs: Assignment = solution
            .iter()
            .enumerate()
            .filter(|&(row, &col)| row < n1 && col < n2)
            .filter_map(|(row, &col)| {
                matrix
                    .rmsd(row, col)
                    .filter(|&rmsd| verifier.is_duplex_similar(rmsd))
                    .map(|rmsd| AlignedDuplexesPair::new(row, col, rmsd))
            })
            .collect();
        if pairs.is_empty() {
            continue;
        }
        let total = total_rmsd(&pairs);
        if total <= size as f64 * verifier.max_duplex_rmsd && seen.insert(pair_key(&pairs)) {
            trace!("size {size}: {} pairs, total rmsd {total:.3}", pairs.len());
            assignments.push(pairs);
            if stop_at_first {
                break;
            }
        }
    }

    if mode == AssignmentMode::LongestWithPartials && !stop_at_first {
        let added = add_partials(
            &mut assignments,
            &mut seen,
            floor,
            verifier.max_duplex_rmsd,
            context.max_partial_assignments,
        );
        debug!("{added} partial assignments added");
    }
    info!("{} candidate assignments ({:?})", assignments.len(), mode);

    evaluate(context, seed, &assignments)
}

/// Collects k-subsets of an assignment under a cap
struct PartialCollector<'s> {
    seen: &'s mut AHashSet<Vec<(usize, usize)>>,
    found: Vec<Assignment>,
    max_duplex_rmsd: f64,
    cap: usize,
}

impl PartialCollector<'_> {
    fn is_full(&self) -> bool {
        self.found.len() >= self.cap
    }

    /// Extend `chosen` to `k` pairs from `source[start..]`; false once the cap is hit
    fn collect(
        &mut self,
        source: &[AlignedDuplexesPair],
        k: usize,
        start: usize,
        chosen: &mut Assignment,
    ) -> bool {
        if self.is_full() {
            return false;
        }
        if chosen.len() == k {
            if total_rmsd(chosen) <= k as f64 * self.max_duplex_rmsd && self.seen.insert(pair_key(chosen)) {
                self.found.push(chosen.clone());
            }
            return !self.is_full();
        }
        for index in start..source.len() {
            if source.len() - index < k - chosen.len() {
                break;
            }
            chosen.push(source[index]);
            let more = self.collect(source, k, index + 1, chosen);
            chosen.pop();
            if !more {
                return false;
            }
        }
        true
    }
}

/// Add every sub-assignment down to `floor` pairs, keeping the list sorted by
/// descending size. Returns how many were added.
fn add_partials(
    assignments: &mut Vec<Assignment>,
    seen: &mut AHashSet<Vec<(usize, usize)>>,
    floor: usize,
    max_duplex_rmsd: f64,
    cap: usize,
) -> usize {
    let mut collector = PartialCollector {
        seen,
        found: Vec::new(),
        max_duplex_rmsd,
        cap,
    };

    'outer: for assignment in assignments.iter() {
        for k in (floor..assignment.len()).rev() {
            let mut chosen = Vec::with_capacity(k);
            if !collector.collect(assignment, k, 0, &mut chosen) {
                warn!("Partial assignment cap of {cap} reached; remaining subsets skipped");
                break 'outer;
            }
        }
    }

    let added = collector.found.len();
    assignments.extend(collector.found);
    assignments.sort_by(|a, b| b.len().cmp(&a.len()));
    added
}

/// Apply each assignment to a copy of the seed, largest first
fn evaluate<'a>(
    context: &SearchContext<'_, 'a>,
    seed: ExtendedAlignment<'a>,
    assignments: &[Assignment],
) -> CompareResult<SearchOutcome<'a>> {
    let policy = context.policy;
    let mut best = seed.clone();
    let mut accepted: Vec<&Assignment> = Vec::new();
    let mut maximal = Vec::new();
    let mut stats = SearchStats::default();

    for assignment in assignments {
        if accepted.iter().any(|a| is_strict_subset(assignment, a)) {
            trace!("skipping assignment contained in an accepted one");
            continue;
        }
        if !context.budget.allows(stats.nodes) {
            stats.budget_exhausted = true;
            warn!(
                "Assignment budget exhausted after {} evaluations; returning best alignment so far",
                stats.nodes
            );
            break;
        }
        stats.nodes += 1;

        let mut candidate = seed.clone();
        for pair in assignment {
            let alignment = context.matrix.alignment(pair)?.clone();
            candidate.add_aligned_duplexes_pair(*pair, alignment);
        }
        if policy.accept(&mut candidate)? {
            stats.accepted += 1;
            policy.promote(&mut candidate, &mut best)?;
            accepted.push(assignment);
            maximal.push(candidate);
            if context.first_alignment_only {
                break;
            }
        }
    }

    Ok(SearchOutcome {
        best,
        maximal_alignments: maximal,
        stats,
    })
}
