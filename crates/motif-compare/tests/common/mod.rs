//! Shared fixtures: helical backbone fragments placed at anchor points

#![allow(dead_code)]

use lin_alg::f64::Vec3;
use motif_algos::RigidTransform;
use motif_mol::{Descriptor, Element, Residue, ResidueKey};
use rand::Rng;

/// Backbone atom offsets from the CA position; not coplanar
const BACKBONE: [(&str, [f64; 3]); 4] = [
    ("N", [-1.2, 0.4, 0.3]),
    ("CA", [0.0, 0.0, 0.0]),
    ("C", [1.1, 0.6, -0.4]),
    ("O", [1.3, 1.8, 0.5]),
];

const NAMES: [&str; 6] = ["ALA", "GLY", "LEU", "SER", "LYS", "ASP"];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 90° about Z followed by a shift
pub fn rotation_z90() -> RigidTransform {
    RigidTransform {
        rotation: [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        translation: [2.0, -1.0, 4.0],
    }
}

/// Satellite anchors on a rising ring around the origin element
pub fn ring(n: usize) -> Vec<[f64; 3]> {
    (0..n)
        .map(|s| {
            let theta = s as f64 * std::f64::consts::TAU / 6.0;
            [12.0 * theta.cos(), 12.0 * theta.sin(), 4.0 * (s as f64 + 1.0)]
        })
        .collect()
}

pub fn shifted(anchor: [f64; 3], by: [f64; 3]) -> [f64; 3] {
    [anchor[0] + by[0], anchor[1] + by[1], anchor[2] + by[2]]
}

/// Random displacement of length `magnitude`
pub fn jitter<R: Rng>(rng: &mut R, anchor: [f64; 3], magnitude: f64) -> [f64; 3] {
    let v = [rng.gen_range(-1.0..1.0f64), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt().max(1e-9);
    shifted(anchor, v.map(|c| c / len * magnitude))
}

/// A `2k+1` residue helical window at `anchor`, numbered from `slot * 100 + 1`.
///
/// `stretch` scales the helix around its anchor; 1.0 is the regular shape.
pub fn element(chain: &str, k: usize, slot: usize, anchor: [f64; 3], transform: &RigidTransform, stretch: f64) -> Element {
    let residues = (0..2 * k + 1)
        .map(|i| {
            let t = i as f64;
            let ca = [
                anchor[0] + stretch * 2.3 * (t * 1.745).cos(),
                anchor[1] + stretch * 2.3 * (t * 1.745).sin(),
                anchor[2] + stretch * 1.5 * t,
            ];
            let key = ResidueKey::new(chain, NAMES[(slot + i) % NAMES.len()], (slot * 100 + i + 1) as i32, ' ');
            let mut residue = Residue::new(key);
            for (name, offset) in BACKBONE {
                let p = Vec3::new(ca[0] + offset[0], ca[1] + offset[1], ca[2] + offset[2]);
                residue.add_atom(name, transform.apply(p));
            }
            residue
        })
        .collect();
    Element::new(residues, k).expect("fixture element")
}

/// Descriptor with its origin at the coordinate origin and satellites at `satellites`
pub fn descriptor(id: &str, chain: &str, k: usize, satellites: &[[f64; 3]], transform: &RigidTransform) -> Descriptor {
    descriptor_with_origin(id, chain, k, satellites, transform, 1.0)
}

pub fn descriptor_with_origin(
    id: &str,
    chain: &str,
    k: usize,
    satellites: &[[f64; 3]],
    transform: &RigidTransform,
    origin_stretch: f64,
) -> Descriptor {
    let origin = element(chain, k, 0, [0.0; 3], transform, origin_stretch);
    let satellites = satellites
        .iter()
        .enumerate()
        .map(|(s, &anchor)| element(chain, k, s + 1, anchor, transform, 1.0))
        .collect();
    Descriptor::new(id, k, origin, satellites).expect("fixture descriptor")
}
