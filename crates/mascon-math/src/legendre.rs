// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Associated Legendre Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fully normalized (4π) associated Legendre functions P̄lm(cos θ).
//!
//! Standard forward column recursion (Holmes & Featherstone 2002) with the
//! sectoral term carried in scaled form, so high orders near the poles do not
//! underflow before the u^m factor is applied.

use ndarray::{Array1, Array3};

/// Scale applied to sectoral seeds during the recursion.
const SCALE: f64 = 1.0e-280;

/// Evaluate P̄lm(x) for 0 <= m <= l <= lmax at every x = cos(colatitude).
///
/// Returns an array of shape [lmax+1, lmax+1, x.len()]; entries with m > l
/// are zero.
pub fn plm_fully_normalized(lmax: usize, x: &Array1<f64>) -> Array3<f64> {
    let nx = x.len();
    let mut plm = Array3::zeros((lmax + 1, lmax + 1, nx));

    for (j, &t) in x.iter().enumerate() {
        let u = (1.0 - t * t).max(0.0).sqrt();

        // m = 0, unscaled
        plm[[0, 0, j]] = 1.0;
        if lmax >= 1 {
            plm[[1, 0, j]] = 3.0_f64.sqrt() * t;
        }
        for l in 2..=lmax {
            let (a, b) = recursion_coefficients(l, 0);
            plm[[l, 0, j]] = a * t * plm[[l - 1, 0, j]] - b * plm[[l - 2, 0, j]];
        }

        // m >= 1: recurse on scaled values, then apply rescale = u^m / SCALE.
        let mut pmm = 2.0_f64.sqrt() * SCALE;
        let mut rescale = 1.0 / SCALE;
        for m in 1..=lmax {
            rescale *= u;
            let mf = m as f64;
            pmm *= (2.0 * mf + 1.0).sqrt() / (2.0 * mf).sqrt();
            plm[[m, m, j]] = pmm;
            if m < lmax {
                plm[[m + 1, m, j]] = t * (2.0 * mf + 3.0).sqrt() * pmm;
            }
            for l in (m + 2)..=lmax {
                let (a, b) = recursion_coefficients(l, m);
                plm[[l, m, j]] = a * t * plm[[l - 1, m, j]] - b * plm[[l - 2, m, j]];
            }
            for l in m..=lmax {
                plm[[l, m, j]] *= rescale;
            }
        }
    }

    plm
}

/// Coefficients (a, b) of P̄lm = a·t·P̄(l-1)m − b·P̄(l-2)m.
fn recursion_coefficients(l: usize, m: usize) -> (f64, f64) {
    let lf = l as f64;
    let mf = m as f64;
    let a = ((2.0 * lf + 1.0) * (2.0 * lf - 1.0) / ((lf - mf) * (lf + mf))).sqrt();
    let b = ((2.0 * lf + 1.0) * (lf - mf - 1.0) * (lf + mf - 1.0)
        / ((2.0 * lf - 3.0) * (lf + mf) * (lf - mf)))
        .sqrt();
    (a, b)
}
