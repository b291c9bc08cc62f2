//! Analytical 3×3 SVD decomposition
//!
//! Computes A = U · diag(S) · Vᵀ for a 3×3 matrix using the Jacobi
//! eigenvalue algorithm on AᵀA (symmetric positive semi-definite).
//!
//! Input matrices are row-major: `m[row][col]`. Singular vectors are
//! returned as columns: `u[i]` is the i-th left singular vector.

/// Result of 3×3 SVD decomposition: A = U · diag(S) · Vᵀ
///
/// Both U and V are right-handed (det = +1). When det(A) < 0 this moves the
/// sign into the pairing of `u[2]` with `v[2]`, which is exactly the
/// reflection correction the Kabsch rotation needs.
#[derive(Debug, Clone)]
pub struct Svd3 {
    /// Left singular vectors, one per entry
    pub u: [[f64; 3]; 3],
    /// Singular values (sorted descending, non-negative)
    pub s: [f64; 3],
    /// Right singular vectors, one per entry
    pub v: [[f64; 3]; 3],
}

const DEGENERATE: f64 = 1e-10;

/// Singular values this far below the largest one count as zero
const RANK_TOLERANCE: f64 = 1e-6;

/// Compute SVD of a row-major 3×3 matrix
pub fn svd3(a: &[[f64; 3]; 3]) -> Svd3 {
    let ata = mat_mul_ata(a);
    let (eigenvalues, eigvec_cols) = jacobi_eigen_3x3(&ata);

    // Sort by descending eigenvalue
    let mut order = [0usize, 1, 2];
    if eigenvalues[order[0]] < eigenvalues[order[1]] { order.swap(0, 1); }
    if eigenvalues[order[0]] < eigenvalues[order[2]] { order.swap(0, 2); }
    if eigenvalues[order[1]] < eigenvalues[order[2]] { order.swap(1, 2); }

    let sigma = order.map(|i| eigenvalues[i].max(0.0).sqrt());
    let mut v = order.map(|i| eigvec_cols[i]);

    if triple_product(&v[0], &v[1], &v[2]) < 0.0 {
        v[2] = negate(&v[2]);
    }

    // U is built from u_0 = A·v_0/σ_0 and an orthogonalised u_1; u_2 closes
    // the right-handed frame. Singular values below `RANK_TOLERANCE · σ_0`
    // are rounding noise of a rank-deficient A.
    let mut u = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    if sigma[0] > DEGENERATE {
        let tol = DEGENERATE.max(RANK_TOLERANCE * sigma[0]);
        u[0] = mat_vec_mul(a, &v[0]);
        normalize(&mut u[0]);

        let mut u1 = mat_vec_mul(a, &v[1]);
        let along = dot(&u1, &u[0]);
        for (c, base) in u1.iter_mut().zip(u[0]) {
            *c -= along * base;
        }
        u[1] = if sigma[1] > tol && dot(&u1, &u1).sqrt() > tol {
            normalize(&mut u1);
            u1
        } else {
            arbitrary_perpendicular(&u[0])
        };

        u[2] = cross(&u[0], &u[1]);
        normalize(&mut u[2]);
    }

    Svd3 { u, s: sigma, v }
}

// ============================================================================
// Internal helpers
// ============================================================================

/// AᵀA for a row-major A: (AᵀA)_{ij} = Σ_k A_{ki}·A_{kj}
fn mat_mul_ata(a: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0f64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i][j] = a[0][i] * a[0][j] + a[1][i] * a[1][j] + a[2][i] * a[2][j];
        }
    }
    result
}

fn mat_vec_mul(a: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [dot(&a[0], v), dot(&a[1], v), dot(&a[2], v)]
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn negate(v: &[f64; 3]) -> [f64; 3] {
    [-v[0], -v[1], -v[2]]
}

fn triple_product(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> f64 {
    dot(a, &cross(b, c))
}

fn normalize(v: &mut [f64; 3]) {
    let len = dot(v, v).sqrt();
    if len > 1e-15 {
        v[0] /= len;
        v[1] /= len;
        v[2] /= len;
    }
}

fn arbitrary_perpendicular(v: &[f64; 3]) -> [f64; 3] {
    let candidate = if v[0].abs() < v[1].abs() && v[0].abs() < v[2].abs() {
        [1.0, 0.0, 0.0]
    } else if v[1].abs() < v[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    let mut perp = cross(v, &candidate);
    normalize(&mut perp);
    perp
}

/// Cyclic Jacobi eigendecomposition of a symmetric 3×3 matrix.
///
/// Returns (eigenvalues, eigenvector columns).
fn jacobi_eigen_3x3(m: &[[f64; 3]; 3]) -> ([f64; 3], [[f64; 3]; 3]) {
    let mut a = *m;
    let mut v = [[1.0f64, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    // Convergence is relative to the matrix scale; coordinates in Å put
    // entries of AᵀA anywhere between 1e-6 and 1e8.
    let scale = (a[0][0] * a[0][0] + a[1][1] * a[1][1] + a[2][2] * a[2][2]).max(1e-300);
    for _ in 0..50 {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        if off <= 1e-30 * scale {
            break;
        }
        for &(p, q) in &[(0usize, 1usize), (0, 2), (1, 2)] {
            if a[p][q].abs() < 1e-300 {
                continue;
            }
            jacobi_rotate(&mut a, &mut v, p, q);
        }
    }

    let eigenvalues = [a[0][0], a[1][1], a[2][2]];
    let eigvec_cols = [
        [v[0][0], v[1][0], v[2][0]],
        [v[0][1], v[1][1], v[2][1]],
        [v[0][2], v[1][2], v[2][2]],
    ];
    (eigenvalues, eigvec_cols)
}

/// Apply a single Jacobi rotation to eliminate a[p][q].
fn jacobi_rotate(a: &mut [[f64; 3]; 3], v: &mut [[f64; 3]; 3], p: usize, q: usize) {
    let app = a[p][p];
    let aqq = a[q][q];
    let apq = a[p][q];

    let (c, s) = if (app - aqq).abs() < 1e-15 {
        let inv_sqrt2 = 1.0 / 2.0f64.sqrt();
        (inv_sqrt2, if apq > 0.0 { inv_sqrt2 } else { -inv_sqrt2 })
    } else {
        let tau = (aqq - app) / (2.0 * apq);
        let t = if tau >= 0.0 {
            1.0 / (tau + (1.0 + tau * tau).sqrt())
        } else {
            -1.0 / (-tau + (1.0 + tau * tau).sqrt())
        };
        let c = 1.0 / (1.0 + t * t).sqrt();
        (c, t * c)
    };

    a[p][p] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
    a[q][q] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
    a[p][q] = 0.0;
    a[q][p] = 0.0;

    let r = 3 - p - q;
    let arp = a[r][p];
    let arq = a[r][q];
    a[r][p] = c * arp - s * arq;
    a[p][r] = a[r][p];
    a[r][q] = s * arp + c * arq;
    a[q][r] = a[r][q];

    for row in v.iter_mut() {
        let vip = row[p];
        let viq = row[q];
        row[p] = c * vip - s * viq;
        row[q] = s * vip + c * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(svd: &Svd3) -> [[f64; 3]; 3] {
        let mut m = [[0.0f64; 3]; 3];
        for row in 0..3 {
            for col in 0..3 {
                m[row][col] = (0..3).map(|k| svd.u[k][row] * svd.s[k] * svd.v[k][col]).sum();
            }
        }
        m
    }

    fn assert_orthonormal(cols: &[[f64; 3]; 3], label: &str) {
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                let d = dot(&cols[i], &cols[j]);
                assert!((d - expected).abs() < 1e-8, "{label}: <{i},{j}> = {d}");
            }
        }
        assert!((triple_product(&cols[0], &cols[1], &cols[2]) - 1.0).abs() < 1e-8, "{label} not right-handed");
    }

    fn assert_reconstruction(a: &[[f64; 3]; 3], svd: &Svd3, tol: f64) {
        let r = reconstruct(svd);
        for row in 0..3 {
            for col in 0..3 {
                assert!(
                    (a[row][col] - r[row][col]).abs() < tol,
                    "Reconstruction A[{row}][{col}]: {} vs {}",
                    a[row][col],
                    r[row][col]
                );
            }
        }
    }

    #[test]
    fn test_identity() {
        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let result = svd3(&identity);
        for &s in &result.s {
            assert!((s - 1.0).abs() < 1e-10);
        }
        assert_orthonormal(&result.u, "U");
        assert_orthonormal(&result.v, "V");
        assert_reconstruction(&identity, &result, 1e-10);
    }

    #[test]
    fn test_scaling_matrix() {
        let mat = [[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]];
        let result = svd3(&mat);
        assert!((result.s[0] - 3.0).abs() < 1e-10);
        assert!((result.s[1] - 2.0).abs() < 1e-10);
        assert!((result.s[2] - 1.0).abs() < 1e-10);
        assert_reconstruction(&mat, &result, 1e-9);
    }

    #[test]
    fn test_general_matrix() {
        let mat = [[2.0, -1.0, 0.5], [0.3, 4.0, 1.0], [-1.5, 0.2, 3.0]];
        let result = svd3(&mat);
        assert!(result.s[0] >= result.s[1] && result.s[1] >= result.s[2]);
        assert_orthonormal(&result.u, "U");
        assert_orthonormal(&result.v, "V");
        assert_reconstruction(&mat, &result, 1e-8);
    }

    #[test]
    fn test_rank_deficient_matrix() {
        let mat = [[1.0, 4.0, 7.0], [2.0, 5.0, 8.0], [3.0, 6.0, 9.0]];
        let result = svd3(&mat);
        assert!(result.s[2] < 1e-6, "s[2] should be ~zero: {}", result.s[2]);
        assert_orthonormal(&result.v, "V");
        assert_reconstruction(&mat, &result, 1e-6);
    }

    #[test]
    fn test_rank_one_matrix() {
        // Outer product d ⊗ e, the covariance of collinear point sets
        let d = [1.6, -1.5, 1.2];
        let e = [0.6, 2.0, -0.9];
        let mat = [0, 1, 2].map(|row| e.map(|x| d[row] * x));
        let result = svd3(&mat);
        assert!(result.s[1] < 1e-6 * result.s[0], "s = {:?}", result.s);
        assert_orthonormal(&result.u, "U");
        assert_orthonormal(&result.v, "V");
        assert_reconstruction(&mat, &result, 1e-6);
    }

    #[test]
    fn test_zero_matrix() {
        let result = svd3(&[[0.0; 3]; 3]);
        for &s in &result.s {
            assert!(s.abs() < 1e-12);
        }
    }
}
