//! Linear algebra utilities.
//!
//! Thin SVD by one-sided Jacobi rotations, minimum-norm pseudoinverse and
//! least-squares solves.

use log::warn;
use mascon_types::error::{MasconError, MasconResult};
use ndarray::{Array1, Array2, Axis};

/// Jacobi sweeps before giving up on convergence.
const MAX_SWEEPS: usize = 80;

/// Thin SVD using one-sided (Hestenes) Jacobi rotations on the columns of A.
///
/// Returns (U, sigma, Vt) where A ≈ U * diag(sigma) * Vt, with
/// k = min(m, n) singular values sorted in descending order.
/// Works directly on A, so small singular values keep full relative accuracy
/// (no A^T*A squaring).
///
/// Matches `numpy.linalg.svd(A, full_matrices=False)` up to column signs.
pub fn svd_thin(a: &Array2<f64>) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
    let (m, n) = a.dim();
    let k = m.min(n);

    let mut u = a.clone();
    let mut v: Array2<f64> = Array2::eye(n);

    if jacobi_sweeps(&mut u, &mut v).is_none() {
        warn!("svd_thin: {m}x{n} Jacobi SVD not converged after {MAX_SWEEPS} sweeps");
    }

    // Column norms are the singular values.
    let norms: Vec<f64> = u.axis_iter(Axis(1)).map(|c| c.dot(&c).sqrt()).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        norms[j]
            .partial_cmp(&norms[i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut sigma = Array1::zeros(k);
    let mut u_out = Array2::zeros((m, k));
    let mut vt = Array2::zeros((k, n));
    for (idx, &col) in order.iter().take(k).enumerate() {
        let s = norms[col];
        sigma[idx] = s;
        if s > 0.0 {
            let inv_s = 1.0 / s;
            for r in 0..m {
                u_out[[r, idx]] = u[[r, col]] * inv_s;
            }
        }
        for j in 0..n {
            vt[[idx, j]] = v[[j, col]];
        }
    }

    (u_out, sigma, vt)
}

/// Rotate column pairs of `u` (accumulating into `v`) until they are
/// mutually orthogonal. Returns the sweeps used, or `None` if
/// `MAX_SWEEPS` was not enough.
fn jacobi_sweeps(u: &mut Array2<f64>, v: &mut Array2<f64>) -> Option<usize> {
    let (m, n) = u.dim();
    for sweep in 1..=MAX_SWEEPS {
        let mut rotated = false;
        for i in 0..n {
            for j in (i + 1)..n {
                let (alpha, beta, gamma) = {
                    let ci = u.column(i);
                    let cj = u.column(j);
                    (ci.dot(&ci), cj.dot(&cj), ci.dot(&cj))
                };
                if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let sign = if zeta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = cos * t;

                for r in 0..m {
                    let ui = u[[r, i]];
                    let uj = u[[r, j]];
                    u[[r, i]] = cos * ui - sin * uj;
                    u[[r, j]] = sin * ui + cos * uj;
                }
                for r in 0..n {
                    let vi = v[[r, i]];
                    let vj = v[[r, j]];
                    v[[r, i]] = cos * vi - sin * vj;
                    v[[r, j]] = sin * vi + cos * vj;
                }
            }
        }
        if !rotated {
            return Some(sweep);
        }
    }
    None
}

/// Pseudoinverse with SVD and a relative singular value cutoff.
///
/// Singular values `<= rcond * sigma_max` are treated as zero.
pub fn pinv_svd(a: &Array2<f64>, rcond: f64) -> Array2<f64> {
    pinv_with_rank(a, rcond).0
}

/// Relative cutoff below which a singular value is numerically zero:
/// `EPS * sigma_max`, independent of the matrix shape.
pub const MACHINE_RCOND: f64 = f64::EPSILON;

/// Minimum-norm pseudoinverse keeping every singular value above
/// `MACHINE_RCOND * sigma_max`. Also returns the numerical rank.
pub fn pinv_min_norm(a: &Array2<f64>) -> (Array2<f64>, usize) {
    pinv_with_rank(a, MACHINE_RCOND)
}

fn pinv_with_rank(a: &Array2<f64>, rcond: f64) -> (Array2<f64>, usize) {
    let (m, n) = a.dim();
    if m == 0 || n == 0 {
        return (Array2::zeros((n, m)), 0);
    }
    let (u, sigma, vt) = svd_thin(a);
    let cutoff = rcond * sigma[0];

    let mut rank = 0;
    let inv_sigma = sigma.mapv(|s| {
        if s > cutoff && s > 0.0 {
            rank += 1;
            1.0 / s
        } else {
            0.0
        }
    });

    // V * diag(1/sigma) * U^T
    let v_scaled = &vt.t() * &inv_sigma;
    (v_scaled.dot(&u.t()), rank)
}

/// Result of a minimum-norm least-squares solve.
#[derive(Debug, Clone)]
pub struct LstsqSolution {
    pub x: Array1<f64>,
    pub rank: usize,
    pub singular_values: Array1<f64>,
}

/// Minimum-norm solution of min ||A x - b||_2.
pub fn lstsq_min_norm(a: &Array2<f64>, b: &Array1<f64>) -> MasconResult<LstsqSolution> {
    let (m, n) = a.dim();
    if b.len() != m {
        return Err(MasconError::LinAlg(format!(
            "lstsq: rhs length {} != row count {}",
            b.len(),
            m
        )));
    }
    if m == 0 || n == 0 {
        return Ok(LstsqSolution {
            x: Array1::zeros(n),
            rank: 0,
            singular_values: Array1::zeros(0),
        });
    }
    let (u, sigma, vt) = svd_thin(a);
    let cutoff = MACHINE_RCOND * sigma[0];

    let utb = u.t().dot(b);
    let mut coeffs = Array1::zeros(sigma.len());
    let mut rank = 0;
    for idx in 0..sigma.len() {
        if sigma[idx] > cutoff && sigma[idx] > 0.0 {
            coeffs[idx] = utb[idx] / sigma[idx];
            rank += 1;
        }
    }
    Ok(LstsqSolution {
        x: vt.t().dot(&coeffs),
        rank,
        singular_values: sigma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn reconstruct(u: &Array2<f64>, sigma: &Array1<f64>, vt: &Array2<f64>) -> Array2<f64> {
        (u * sigma).dot(vt)
    }

    #[test]
    fn test_svd_identity() {
        let a = Array2::eye(3);
        let (u, sigma, vt) = svd_thin(&a);
        for i in 0..3 {
            assert!((sigma[i] - 1.0).abs() < 1e-12, "sigma[{i}] = {}", sigma[i]);
        }
        let r = reconstruct(&u, &sigma, &vt);
        for i in 0..3 {
            for j in 0..3 {
                let diff: f64 = r[[i, j]] - a[[i, j]];
                assert!(diff.abs() < 1e-12, "Reconstruction failed at ({i}, {j})");
            }
        }
    }

    #[test]
    fn test_svd_tall_reconstruction() {
        let a = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [0.5, -1.0]];
        let (u, sigma, vt) = svd_thin(&a);
        assert_eq!(u.dim(), (4, 2));
        assert_eq!(vt.dim(), (2, 2));
        assert!(sigma[0] >= sigma[1]);
        let r = reconstruct(&u, &sigma, &vt);
        for (x, y) in r.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_svd_wide_reconstruction() {
        let a = array![[1.0, 0.0, 2.0], [0.0, 3.0, -1.0]];
        let (u, sigma, vt) = svd_thin(&a);
        assert_eq!(sigma.len(), 2);
        let r = reconstruct(&u, &sigma, &vt);
        for (x, y) in r.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_jacobi_sweeps_reported() {
        let mut u = array![[3.0, 0.0], [0.0, 2.0], [0.0, 0.0]];
        let mut v = Array2::eye(2);
        assert_eq!(jacobi_sweeps(&mut u, &mut v), Some(1));

        let mut u = array![[1.0, 2.0, 0.5], [3.0, -4.0, 1.0], [5.0, 6.0, -2.0], [0.5, -1.0, 7.0]];
        let mut v = Array2::eye(3);
        let sweeps = jacobi_sweeps(&mut u, &mut v).unwrap();
        assert!(sweeps > 1 && sweeps < MAX_SWEEPS);
    }

    #[test]
    fn test_pinv_identity() {
        let a = Array2::eye(3);
        let (pinv, rank) = pinv_min_norm(&a);
        assert_eq!(rank, 3);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (pinv[[i, j]] - expected).abs() < 1e-12,
                    "pinv identity failed at ({i}, {j})"
                );
            }
        }
    }

    #[test]
    fn test_pinv_zero_column() {
        // Second column contributes nothing: its row of the pseudoinverse is zero.
        let a = array![[2.0, 0.0], [0.0, 0.0], [0.0, 0.0]];
        let (pinv, rank) = pinv_min_norm(&a);
        assert_eq!(rank, 1);
        assert!((pinv[[0, 0]] - 0.5).abs() < 1e-14);
        for j in 0..3 {
            assert_eq!(pinv[[1, j]], 0.0);
        }
    }

    #[test]
    fn test_pinv_all_zero() {
        let a = Array2::zeros((4, 2));
        let (pinv, rank) = pinv_min_norm(&a);
        assert_eq!(rank, 0);
        assert!(pinv.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pinv_cutoff_drops_small_values() {
        let a = array![[1.0, 0.0], [0.0, 1e-6]];
        let p = pinv_svd(&a, 1e-3);
        assert!((p[[0, 0]] - 1.0).abs() < 1e-12);
        assert_eq!(p[[1, 1]], 0.0);
    }

    #[test]
    fn test_small_singular_value_kept_in_tall_design() {
        // Shape must not scale the cutoff: 1e-13 is well above EPS.
        let mut a = Array2::zeros((3721, 2));
        a[[0, 0]] = 1.0;
        a[[1, 1]] = 1e-13;
        let (pinv, rank) = pinv_min_norm(&a);
        assert_eq!(rank, 2);
        assert!((pinv[[1, 1]] - 1e13).abs() / 1e13 < 1e-12);

        let mut b = Array1::zeros(3721);
        b[1] = 2e-13;
        let sol = lstsq_min_norm(&a, &b).unwrap();
        assert_eq!(sol.rank, 2);
        assert!((sol.x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_lstsq_min_norm_duplicate_columns() {
        // Identical columns: minimum-norm solution splits the weight evenly.
        let a = array![[1.0, 1.0], [0.0, 0.0]];
        let b = array![2.0, 0.0];
        let sol = lstsq_min_norm(&a, &b).unwrap();
        assert_eq!(sol.rank, 1);
        assert!((sol.x[0] - 1.0).abs() < 1e-12);
        assert!((sol.x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lstsq_overdetermined() {
        // Fit y = 1 + 2t through exact points.
        let a = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let b = array![1.0, 3.0, 5.0, 7.0];
        let sol = lstsq_min_norm(&a, &b).unwrap();
        assert_eq!(sol.rank, 2);
        assert!((sol.x[0] - 1.0).abs() < 1e-12);
        assert!((sol.x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_lstsq_rhs_mismatch() {
        let a = Array2::eye(2);
        let b = array![1.0, 2.0, 3.0];
        assert!(matches!(lstsq_min_norm(&a, &b), Err(MasconError::LinAlg(_))));
    }
}
