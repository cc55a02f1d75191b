// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Property-Based Tests (proptest) for mascon-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for mascon-math using proptest.
//!
//! Covers: SVD reconstruction and orthogonality, pseudoinverse Penrose
//! conditions, least-squares agreement with the pseudoinverse, Legendre
//! addition theorem, Gaussian weight bounds.

use mascon_math::gauss::smoothing_weights;
use mascon_math::legendre::plm_fully_normalized;
use mascon_math::linalg::{lstsq_min_norm, pinv_min_norm, svd_thin};
use ndarray::{Array1, Array2};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_matrix(m: usize, n: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((m, n), |_| rng.gen_range(-1.0..1.0))
}

/// Random matrix with a dominant diagonal, so sigma_min >= max(m, n).
fn well_conditioned(m: usize, n: usize, seed: u64) -> Array2<f64> {
    let mut a = random_matrix(m, n, seed);
    let shift = 2.0 * m.max(n) as f64;
    for i in 0..m.min(n) {
        a[[i, i]] += shift;
    }
    a
}

fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

// ── SVD Properties ───────────────────────────────────────────────────

proptest! {
    /// U diag(sigma) Vt reconstructs A.
    #[test]
    fn svd_reconstructs(m in 1usize..12, n in 1usize..8, seed in any::<u64>()) {
        let a = random_matrix(m, n, seed);
        let (u, sigma, vt) = svd_thin(&a);
        let r = (&u * &sigma).dot(&vt);
        prop_assert!(max_abs_diff(&r, &a) < 1e-10,
            "reconstruction error {}", max_abs_diff(&r, &a));
    }

    /// Singular values are non-negative and sorted descending.
    #[test]
    fn svd_sigma_sorted(m in 1usize..12, n in 1usize..8, seed in any::<u64>()) {
        let a = random_matrix(m, n, seed);
        let (_u, sigma, _vt) = svd_thin(&a);
        prop_assert_eq!(sigma.len(), m.min(n));
        for i in 0..sigma.len() {
            prop_assert!(sigma[i] >= 0.0);
            if i > 0 {
                prop_assert!(sigma[i] <= sigma[i - 1] + 1e-14);
            }
        }
    }

    /// Right singular vectors are orthonormal for tall matrices.
    #[test]
    fn svd_v_orthonormal(n in 1usize..8, extra in 0usize..6, seed in any::<u64>()) {
        let a = random_matrix(n + extra, n, seed);
        let (_u, _sigma, vt) = svd_thin(&a);
        let vvt = vt.dot(&vt.t());
        prop_assert!(max_abs_diff(&vvt, &Array2::eye(n)) < 1e-10);
    }
}

// ── Pseudoinverse Properties ─────────────────────────────────────────

proptest! {
    /// Penrose conditions A A+ A = A and A+ A A+ = A+.
    #[test]
    fn pinv_penrose(m in 1usize..12, n in 1usize..8, seed in any::<u64>()) {
        let a = well_conditioned(m, n, seed);
        let (p, _rank) = pinv_min_norm(&a);
        prop_assert_eq!(p.dim(), (n, m));
        let apa = a.dot(&p).dot(&a);
        let pap = p.dot(&a).dot(&p);
        prop_assert!(max_abs_diff(&apa, &a) < 1e-8);
        prop_assert!(max_abs_diff(&pap, &p) < 1e-8);
    }

    /// Duplicating a column lowers the rank but keeps A A+ A = A.
    /// The copies sit side by side so the first rotation cancels one exactly.
    #[test]
    fn pinv_rank_deficient(m in 3usize..12, seed in any::<u64>()) {
        let base = well_conditioned(m, 2, seed);
        let mut a = Array2::zeros((m, 3));
        a.column_mut(0).assign(&base.column(0));
        a.column_mut(1).assign(&base.column(0));
        a.column_mut(2).assign(&base.column(1));
        let (p, rank) = pinv_min_norm(&a);
        prop_assert_eq!(rank, 2);
        prop_assert!(max_abs_diff(&a.dot(&p).dot(&a), &a) < 1e-8);
    }

    /// lstsq solution equals pinv applied to the right-hand side.
    #[test]
    fn lstsq_matches_pinv(m in 1usize..12, n in 1usize..8, seed in any::<u64>()) {
        let a = well_conditioned(m, n, seed);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let b = Array1::from_shape_fn(m, |_| rng.gen_range(-1.0..1.0));
        let sol = lstsq_min_norm(&a, &b).unwrap();
        let (p, rank) = pinv_min_norm(&a);
        let x = p.dot(&b);
        prop_assert_eq!(sol.rank, rank);
        for i in 0..n {
            prop_assert!((sol.x[i] - x[i]).abs() < 1e-8,
                "x[{}]: lstsq {} vs pinv {}", i, sol.x[i], x[i]);
        }
    }
}

// ── Legendre Properties ──────────────────────────────────────────────

proptest! {
    /// Addition theorem: sum over m of P̄lm(x)^2 equals 2l + 1.
    #[test]
    fn legendre_addition_theorem(lmax in 1usize..90, x in -1.0f64..1.0) {
        let xs = Array1::from_vec(vec![x]);
        let plm = plm_fully_normalized(lmax, &xs);
        for l in 0..=lmax {
            let sum: f64 = (0..=l).map(|m| plm[[l, m, 0]].powi(2)).sum();
            let expected = 2.0 * l as f64 + 1.0;
            prop_assert!((sum - expected).abs() / expected < 1e-9,
                "l={} sum={} expected={}", l, sum, expected);
        }
    }
}

// ── Gaussian Weight Properties ───────────────────────────────────────

proptest! {
    /// Smoothing multipliers lie in (0, 1].
    #[test]
    fn smoothing_weights_bounded(radius in 0.0f64..1500.0, lmax in 1usize..120) {
        let w = smoothing_weights(radius, lmax);
        prop_assert_eq!(w.len(), lmax + 1);
        for &v in w.iter() {
            prop_assert!(v > 0.0 && v <= 1.0 + 1e-12, "weight {} out of range", v);
        }
    }
}
