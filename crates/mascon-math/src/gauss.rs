//! Gaussian averaging weights in harmonic space (Jekeli 1981, Wahr et al. 1998).

use mascon_types::constants::RAD_EARTH_KM;
use ndarray::Array1;
use std::f64::consts::PI;

/// Smallest weight kept before the recursion is cut off.
const WEIGHT_FLOOR: f64 = 1e-10;

/// Degree-dependent Gaussian weights W_l for a half-width `radius_km`.
///
/// Normalised so that W_0 = 1/(2π); multiply by 2π for unit weight at
/// degree 0. `radius_km` below 1e-10 gives a flat 1/(2π).
pub fn gauss_weights(radius_km: f64, lmax: usize) -> Array1<f64> {
    let mut wl = Array1::from_elem(lmax + 1, 1.0 / (2.0 * PI));
    if radius_km < 1e-10 || lmax == 0 {
        return wl;
    }

    let b = 2.0_f64.ln() / (1.0 - (radius_km / RAD_EARTH_KM).cos());
    let e = (-2.0 * b).exp();
    wl[1] = wl[0] * ((1.0 + e) / (1.0 - e) - 1.0 / b);

    for l in 2..=lmax {
        let w = (1.0 - 2.0 * l as f64) / b * wl[l - 1] + wl[l - 2];
        // Signed test: the recursion is unstable and goes negative first.
        if w < WEIGHT_FLOOR {
            wl.slice_mut(ndarray::s![l..]).fill(WEIGHT_FLOOR);
            break;
        }
        wl[l] = w;
    }
    wl
}

/// Per-degree smoothing multipliers used by the kernel fit.
///
/// `2π·W_l` for a positive radius, ones otherwise.
pub fn smoothing_weights(radius_km: f64, lmax: usize) -> Array1<f64> {
    if radius_km > 0.0 {
        gauss_weights(radius_km, lmax) * (2.0 * PI)
    } else {
        Array1::ones(lmax + 1)
    }
}
