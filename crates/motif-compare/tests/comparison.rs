mod common;

use common::{descriptor, descriptor_with_origin, init_logger, jitter, ring, rotation_z90, shifted};
use motif_algos::RigidTransform;
use motif_compare::search::backtracking;
use motif_compare::{
    AcceptancePolicy, AlignedDuplexesPair, Alignment, AssignmentMode, CompareError, ComparisonPrecision,
    ComparisonResult, ComparisonSettings, DescriptorComparator, DescriptorTotals, DuplexSimilarityMatrix,
    ExtendedAlignment, SearchBudget, SearchContext, SearchStrategy, SimilarDescriptorsVerifier,
};
use motif_mol::{Descriptor, DescriptorsPair};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn comparator(verifier: SimilarDescriptorsVerifier, strategy: SearchStrategy) -> DescriptorComparator {
    DescriptorComparator::new(
        ComparisonSettings::default()
            .with_verifier(verifier)
            .with_strategy(strategy),
    )
}

fn relaxed() -> SimilarDescriptorsVerifier {
    SimilarDescriptorsVerifier {
        min_aligned_elements: 0.5,
        min_aligned_residues: 0.5,
        ..Default::default()
    }
}

fn compare(comparator: &DescriptorComparator, a: &Descriptor, b: &Descriptor) -> ComparisonResult {
    comparator
        .compare(DescriptorsPair::new(a, b))
        .expect("comparison")
        .expect("comparable pair")
}

#[test]
fn single_element_rotation_is_recovered() {
    init_logger();
    let a = descriptor("a", "A", 0, &[], &RigidTransform::identity());
    let b = descriptor("b", "B", 0, &[], &rotation_z90());

    let result = compare(&DescriptorComparator::default(), &a, &b);
    assert!(result.origin_rmsd < 1e-3, "origin rmsd {}", result.origin_rmsd);
    assert!(result.is_structurally_similar());

    let expected = rotation_z90();
    for row in 0..3 {
        for col in 0..3 {
            let got = result.transform.rotation[row][col];
            assert!(
                (got - expected.rotation[row][col]).abs() < 1e-6,
                "R[{row}][{col}] = {got}"
            );
        }
        assert!((result.transform.translation[row] - expected.translation[row]).abs() < 1e-6);
    }
    let seq = result.sequence_alignment.expect("sequence alignment");
    assert_eq!(seq.first, "A");
    assert_eq!(seq.second, "A");
}

#[test]
fn two_of_three_elements_from_candidate_map() {
    let a = descriptor("a", "A", 1, &ring(2), &RigidTransform::identity());
    let b = descriptor("b", "B", 1, &ring(2), &RigidTransform::identity());
    let pair = DescriptorsPair::new(&a, &b);
    let atoms = motif_mol::AlignmentAtoms::default();
    let matrix = DuplexSimilarityMatrix::from_candidates(
        pair,
        &atoms,
        [AlignedDuplexesPair::new(0, 0, 1.0), AlignedDuplexesPair::new(1, 1, 5.0)],
    )
    .unwrap();
    let policy = AcceptancePolicy::new(
        relaxed(),
        ComparisonPrecision::AllRulesConsidered,
        DescriptorTotals {
            first_elements: a.element_count(),
            second_elements: b.element_count(),
            first_residues: a.residue_count(),
            second_residues: b.residue_count(),
        },
    );
    let origin = Alignment::from_elements(a.origin(), b.origin(), &atoms, a.molecule_type()).unwrap();
    let mut seed = ExtendedAlignment::new(origin, ComparisonResult::default());
    assert!(!policy.accept(&mut seed).unwrap());

    let context = SearchContext {
        matrix: &matrix,
        policy: &policy,
        first_alignment_only: false,
        budget: SearchBudget::unlimited(),
        max_partial_assignments: 10,
    };
    let outcome = backtracking::search(&context, seed).unwrap();
    let pairs: Vec<_> = outcome.best.pairs().map(|p| p.indices()).collect();
    assert_eq!(pairs, vec![(0, 0)]);
    let result = outcome.best.result();
    assert!(result.similar);
    assert!((result.aligned_elements_ratio - 2.0 / 3.0).abs() < 1e-3);
}

#[test]
fn displaced_satellite_is_left_out() {
    init_logger();
    let sats = ring(2);
    let a = descriptor("a", "A", 1, &sats, &RigidTransform::identity());
    let moved = [sats[0], shifted(sats[1], [6.0, 0.0, 0.0])];
    let b = descriptor("b", "B", 1, &moved, &rotation_z90());

    let comparator = comparator(relaxed(), SearchStrategy::Backtracking);
    let comparison = comparator
        .compare_detailed(DescriptorsPair::new(&a, &b))
        .unwrap()
        .unwrap();
    let matrix = comparison.matrix.as_ref().expect("similarity matrix");
    assert_eq!(matrix.pair_count(), 1);
    assert!(matrix.rmsd(0, 0).unwrap() < 1e-6);
    assert!(matrix.to_string().starts_with("Duplex similarity matrix (2 x 2 satellites, 1 candidates)"));

    let result = &comparison.result;
    assert!(result.is_structurally_similar());
    assert_eq!(result.aligned_elements, 2);
    assert!((result.aligned_elements_ratio - 2.0 / 3.0).abs() < 1e-9);
    assert!((result.aligned_residues_ratio - 6.0 / 9.0).abs() < 1e-9);
    assert!(result.alignment_rmsd < 1e-6);
    assert_eq!(comparison.alignment.describe_duplex_pairs().lines().count(), 1);

    let seq = result.sequence_alignment.as_ref().unwrap();
    assert_eq!(seq.len(), 12);
    assert_eq!(seq.matched_columns(), 6);
}

#[test]
fn zero_satellites_skip_the_search() {
    let a = descriptor("a", "A", 1, &ring(2), &RigidTransform::identity());
    let b = descriptor("b", "B", 1, &[], &rotation_z90());
    let comparison = DescriptorComparator::default()
        .compare_detailed(DescriptorsPair::new(&a, &b))
        .unwrap()
        .unwrap();
    assert!(comparison.matrix.is_none());
    assert_eq!(comparison.stats.nodes, 0);
    assert_eq!(comparison.alignment.pair_count(), 0);
    assert!(comparison.result.origin_rmsd < 1e-6);
    assert!((comparison.result.aligned_elements_ratio - 1.0 / 3.0).abs() < 1e-9);
    assert!(!comparison.result.is_structurally_similar());
}

#[test]
fn distant_origins_are_incomparable() {
    let a = descriptor("a", "A", 2, &ring(2), &RigidTransform::identity());
    let b = descriptor_with_origin("b", "B", 2, &ring(2), &RigidTransform::identity(), 1.8);
    assert!(DescriptorComparator::default()
        .compare(DescriptorsPair::new(&a, &b))
        .unwrap()
        .is_none());
}

#[test]
fn neighborhood_mismatch_is_an_error() {
    let a = descriptor("a", "A", 1, &[], &RigidTransform::identity());
    let b = descriptor("b", "B", 2, &[], &RigidTransform::identity());
    let err = DescriptorComparator::default()
        .compare(DescriptorsPair::new(&a, &b))
        .unwrap_err();
    assert!(matches!(
        err,
        CompareError::UncomparableDescriptors { first_k: 1, second_k: 2, .. }
    ));
}

#[test]
fn swapping_descriptors_keeps_the_verdict() {
    let sats = ring(3);
    let a = descriptor("a", "A", 1, &sats, &RigidTransform::identity());
    let moved = [sats[0], shifted(sats[1], [0.8, 0.0, 0.0]), shifted(sats[2], [5.0, 0.0, 0.0])];
    let b = descriptor("b", "B", 1, &moved, &rotation_z90());

    let verifier = SimilarDescriptorsVerifier {
        min_aligned_elements: 0.7,
        ..Default::default()
    };
    for strategy in ["backtracking", "hungarian-longest"] {
        let comparator = comparator(verifier, strategy.parse().unwrap());
        let pair = DescriptorsPair::new(&a, &b);
        let forward = compare(&comparator, &a, &b);
        let backward = comparator.compare(pair.swapped()).unwrap().unwrap();

        assert!(forward.is_structurally_similar(), "{strategy}");
        assert_eq!(forward.similar, backward.similar);
        assert_eq!(forward.aligned_elements, 3);
        assert!((forward.aligned_elements_ratio - backward.aligned_elements_ratio).abs() < 1e-12);
        assert!((forward.aligned_residues_ratio - backward.aligned_residues_ratio).abs() < 1e-12);
        assert!((forward.alignment_rmsd - backward.alignment_rmsd).abs() < 1e-3);
        assert!((forward.origin_rmsd - backward.origin_rmsd).abs() < 1e-3);
    }
}

/// Random instance: B's satellites sit near random A satellites, so several
/// may compete for the same partner
fn random_pair(rng: &mut StdRng) -> (Descriptor, Descriptor) {
    let base = ring(6);
    let n_a = rng.gen_range(2..=5);
    let n_b = rng.gen_range(2..=5);
    let a_sats = base[..n_a].to_vec();
    let b_sats: Vec<_> = (0..n_b)
        .map(|_| {
            let target = a_sats[rng.gen_range(0..n_a)];
            let magnitude = rng.gen_range(0.0..4.0);
            jitter(rng, target, magnitude)
        })
        .collect();
    (
        descriptor("a", "A", 1, &a_sats, &RigidTransform::identity()),
        descriptor("b", "B", 1, &b_sats, &rotation_z90()),
    )
}

#[test]
fn backtracking_dominates_assignment_search() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(0xd0d0);
    let exhaustive = comparator(relaxed(), SearchStrategy::Backtracking);
    let heuristics = [AssignmentMode::First, AssignmentMode::Longest, AssignmentMode::LongestWithPartials]
        .map(|mode| comparator(relaxed(), SearchStrategy::AssignmentDriven(mode)));

    for round in 0..25 {
        let (a, b) = random_pair(&mut rng);
        let best = compare(&exhaustive, &a, &b);
        for heuristic in &heuristics {
            let other = compare(heuristic, &a, &b);
            let strategy = heuristic.settings().strategy;
            if other.similar {
                assert!(best.similar, "round {round}: {strategy} found a match backtracking missed");
                assert!(
                    best.aligned_elements_ratio >= other.aligned_elements_ratio,
                    "round {round}: {strategy} {} > {}",
                    other.aligned_elements_ratio,
                    best.aligned_elements_ratio
                );
            }
        }
    }
}

#[test]
fn satellite_order_does_not_change_the_optimum() {
    let mut rng = StdRng::seed_from_u64(7);
    let comparator = comparator(relaxed(), SearchStrategy::Backtracking);

    for round in 0..15 {
        let base = ring(5);
        let n = rng.gen_range(3..=5);
        let a_sats = base[..n].to_vec();
        let b_sats: Vec<_> = (0..n)
            .map(|_| {
                let target = a_sats[rng.gen_range(0..n)];
                let magnitude = rng.gen_range(0.0..3.0);
                jitter(&mut rng, target, magnitude)
            })
            .collect();

        let a = descriptor("a", "A", 1, &a_sats, &RigidTransform::identity());
        let b = descriptor("b", "B", 1, &b_sats, &rotation_z90());
        let reference = compare(&comparator, &a, &b);

        let mut a_rotated = a_sats.clone();
        a_rotated.rotate_left(1);
        let mut b_reversed = b_sats.clone();
        b_reversed.reverse();
        let a2 = descriptor("a", "A", 1, &a_rotated, &RigidTransform::identity());
        let b2 = descriptor("b", "B", 1, &b_reversed, &rotation_z90());
        let permuted = compare(&comparator, &a2, &b2);

        assert_eq!(reference.similar, permuted.similar, "round {round}");
        assert_eq!(reference.aligned_elements, permuted.aligned_elements, "round {round}");
        assert_eq!(reference.aligned_residues, permuted.aligned_residues, "round {round}");
        if reference.similar {
            assert!(
                (reference.alignment_rmsd - permuted.alignment_rmsd).abs() < 1e-6,
                "round {round}: {} vs {}",
                reference.alignment_rmsd,
                permuted.alignment_rmsd
            );
        }
    }
}

#[test]
fn extend_then_remove_restores_the_alignment() {
    let a = descriptor("a", "A", 2, &ring(3), &RigidTransform::identity());
    let b = descriptor("b", "B", 2, &ring(3), &rotation_z90());
    let atoms = motif_mol::AlignmentAtoms::default();
    let mt = a.molecule_type();

    let mut alignment = Alignment::from_elements(a.origin(), b.origin(), &atoms, mt).unwrap();
    let first = Alignment::from_elements(&a.satellites()[2], &b.satellites()[2], &atoms, mt).unwrap();
    alignment.extend(&first);

    let residues: Vec<_> = alignment.residue_pairs().map(|(x, y)| (x.key.clone(), y.key.clone())).collect();
    let first_points = coords(&alignment.first_points());
    let second_points = coords(&alignment.second_points());

    let extra = Alignment::from_elements(&a.satellites()[0], &b.satellites()[1], &atoms, mt).unwrap();
    alignment.extend(&extra);
    assert_eq!(alignment.len(), 15);
    assert!(alignment.remove(&extra));

    let after: Vec<_> = alignment.residue_pairs().map(|(x, y)| (x.key.clone(), y.key.clone())).collect();
    assert_eq!(after, residues);
    assert_eq!(coords(&alignment.first_points()), first_points);
    assert_eq!(coords(&alignment.second_points()), second_points);
}

fn coords(points: &[lin_alg::f64::Vec3]) -> Vec<[f64; 3]> {
    points.iter().map(|p| [p.x, p.y, p.z]).collect()
}

#[test]
fn settings_from_json_drive_the_comparator() {
    let settings = ComparisonSettings::from_json(
        r#"{
            "strategy": "hungarian-partials",
            "precision": "ALL_RULES_EXCEPT_ALIGNMENT_RMSD",
            "verifier": { "min_aligned_elements": 0.5, "min_aligned_residues": 0.5 },
            "budget": { "max_nodes": 1000 }
        }"#,
    )
    .unwrap();
    assert_eq!(settings.max_partial_assignments, motif_compare::DEFAULT_MAX_PARTIAL_ASSIGNMENTS);

    let sats = ring(3);
    let a = descriptor("a", "A", 1, &sats, &RigidTransform::identity());
    let b = descriptor("b", "B", 1, &sats, &rotation_z90());
    let result = compare(&DescriptorComparator::new(settings), &a, &b);
    assert!(result.is_structurally_similar());
    assert_eq!(result.aligned_elements, 4);
    assert!((result.aligned_residues_ratio - 1.0).abs() < 1e-12);
}
