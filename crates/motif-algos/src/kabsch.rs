//! Kabsch algorithm for optimal rigid-body superposition
//!
//! Given two ordered sets of corresponding 3D points, finds the rotation and
//! translation that minimizes RMSD when mapping source onto target.

use lin_alg::f64::Vec3;
use serde::{Deserialize, Serialize};

use crate::linalg::svd3;
use crate::AlignError;

/// Rigid-body transform: `p' = R·p + t`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Row-major 3×3 rotation
    pub rotation: [[f64; 3]; 3],
    pub translation: [f64; 3],
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn identity() -> Self {
        RigidTransform {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// Transform a single point
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        let r = &self.rotation;
        let t = &self.translation;
        Vec3::new(
            r[0][0] * p.x + r[0][1] * p.y + r[0][2] * p.z + t[0],
            r[1][0] * p.x + r[1][1] * p.y + r[1][2] * p.z + t[1],
            r[2][0] * p.x + r[2][1] * p.y + r[2][2] * p.z + t[2],
        )
    }

    /// Transform a point set into a new vector
    pub fn apply_all(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.iter().map(|&p| self.apply(p)).collect()
    }

    /// Determinant of the rotation part (+1 for a proper rotation)
    pub fn determinant(&self) -> f64 {
        let r = &self.rotation;
        r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
            - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
            + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0])
    }
}

/// Result of a Kabsch superposition
#[derive(Debug, Clone, Copy)]
pub struct Superposition {
    /// Transform mapping source onto target
    pub transform: RigidTransform,
    /// RMSD after superposition
    pub rmsd: f64,
    /// Number of point pairs used
    pub n_points: usize,
}

fn centroid(points: &[Vec3]) -> [f64; 3] {
    let n = points.len() as f64;
    let mut c = [0.0f64; 3];
    for p in points {
        c[0] += p.x;
        c[1] += p.y;
        c[2] += p.z;
    }
    c.map(|x| x / n)
}

/// Compute the optimal superposition of `source` onto `target`.
///
/// Both slices must have the same, non-zero length. Fewer than three points
/// are accepted; the rotation is then underdetermined but still proper.
pub fn superimpose(source: &[Vec3], target: &[Vec3]) -> Result<Superposition, AlignError> {
    let n = source.len();
    if n != target.len() {
        return Err(AlignError::LengthMismatch(n, target.len()));
    }
    if n == 0 {
        return Err(AlignError::NoPoints);
    }

    let cs = centroid(source);
    let ct = centroid(target);

    // Cross-covariance H = Σ (p_i - cs) ⊗ (q_i - ct), row-major
    let mut h = [[0.0f64; 3]; 3];
    for (p, q) in source.iter().zip(target.iter()) {
        let ps = [p.x - cs[0], p.y - cs[1], p.z - cs[2]];
        let qs = [q.x - ct[0], q.y - ct[1], q.z - ct[2]];
        for row in 0..3 {
            for col in 0..3 {
                h[row][col] += ps[row] * qs[col];
            }
        }
    }

    // R = V · Uᵀ; svd3 keeps both right-handed, which folds in the
    // reflection correction.
    let svd = svd3(&h);
    let mut rotation = [[0.0f64; 3]; 3];
    for (row, out) in rotation.iter_mut().enumerate() {
        for (col, value) in out.iter_mut().enumerate() {
            *value = (0..3).map(|k| svd.v[k][row] * svd.u[k][col]).sum();
        }
    }

    // t = ct - R · cs
    let mut translation = [0.0f64; 3];
    for i in 0..3 {
        translation[i] = ct[i]
            - (rotation[i][0] * cs[0] + rotation[i][1] * cs[1] + rotation[i][2] * cs[2]);
    }

    let transform = RigidTransform {
        rotation,
        translation,
    };
    let moved = transform.apply_all(source);
    let rmsd = rmsd(&moved, target)?;

    Ok(Superposition {
        transform,
        rmsd,
        n_points: n,
    })
}

/// RMSD between two equal-length point sets (no superposition)
pub fn rmsd(a: &[Vec3], b: &[Vec3]) -> Result<f64, AlignError> {
    if a.len() != b.len() {
        return Err(AlignError::LengthMismatch(a.len(), b.len()));
    }
    if a.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(p, q)| {
            let dx = p.x - q.x;
            let dy = p.y - q.y;
            let dz = p.z - q.z;
            dx * dx + dy * dy + dz * dz
        })
        .sum();
    Ok((sum / a.len() as f64).sqrt())
}
