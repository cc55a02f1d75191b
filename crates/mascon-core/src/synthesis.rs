// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Spatial Synthesis
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Harmonic summation onto a regular lon/lat grid, grid construction and
//! area integrals.
//!
//! f(φ, λ) = Σ_m Σ_l P̄lm(sin φ) [Clm cos mλ + Slm sin mλ]

use mascon_math::legendre::plm_fully_normalized;
use mascon_types::config::GridInterval;
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{HarmonicSet, SpatialGrid};
use ndarray::{s, Array1, Array2, Array3};
use std::f64::consts::PI;

/// Turns coefficient sets into gridded fields.
pub trait SpatialSynthesizer {
    fn synthesize(&self, coeffs: &HarmonicSet) -> MasconResult<SpatialGrid>;
}

/// Output grid nodes for a (dlon, dlat) spacing.
///
/// Corners: lon −180..180 and lat 90..−90, both ends included.
/// Centers: nodes offset by half a cell from those edges.
pub fn output_grid(ddeg: [f64; 2], interval: GridInterval) -> (Array1<f64>, Array1<f64>) {
    let [dlon, dlat] = ddeg;
    match interval {
        GridInterval::Corners => {
            let n_lon = (360.0 / dlon + 1.0 + 1e-9).floor() as usize;
            let n_lat = (180.0 / dlat + 1.0 + 1e-9).floor() as usize;
            let lon = Array1::from_shape_fn(n_lon, |i| -180.0 + dlon * i as f64);
            let lat = Array1::from_shape_fn(n_lat, |j| 90.0 - dlat * j as f64);
            (lon, lat)
        }
        GridInterval::Centers => {
            let n_lon = (360.0 / dlon - 1e-9).ceil() as usize;
            let n_lat = (180.0 / dlat - 1e-9).ceil() as usize;
            let lon = Array1::from_shape_fn(n_lon, |i| -180.0 + dlon / 2.0 + dlon * i as f64);
            let lat = Array1::from_shape_fn(n_lat, |j| 90.0 - dlat / 2.0 - dlat * j as f64);
            (lon, lat)
        }
    }
}

/// Synthesizer with Legendre values evaluated once for a fixed grid.
#[derive(Debug, Clone)]
pub struct HarmonicSummation {
    lon: Array1<f64>,
    lat: Array1<f64>,
    lmax: usize,
    /// [lmax+1, lmax+1, n_lat]
    plm: Array3<f64>,
}

impl HarmonicSummation {
    pub fn new(lon: Array1<f64>, lat: Array1<f64>, lmax: usize) -> Self {
        let x = lat.mapv(|phi| ((90.0 - phi).to_radians()).cos());
        let plm = plm_fully_normalized(lmax, &x);
        HarmonicSummation { lon, lat, lmax, plm }
    }

    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }
}

impl SpatialSynthesizer for HarmonicSummation {
    fn synthesize(&self, coeffs: &HarmonicSet) -> MasconResult<SpatialGrid> {
        if coeffs.lmax > self.lmax {
            return Err(MasconError::DimensionMismatch {
                name: "synthesis Legendre table".to_string(),
                lmax: self.lmax,
                mmax: self.lmax,
                required_lmax: coeffs.lmax,
                required_mmax: coeffs.mmax,
            });
        }
        let lmax = coeffs.lmax;
        let mmax = coeffs.mmax;
        let n_lat = self.lat.len();

        // Per-order latitude profiles.
        let mut d_cos = Array2::zeros((n_lat, mmax + 1));
        let mut d_sin = Array2::zeros((n_lat, mmax + 1));
        for m in 0..=mmax {
            for l in m..=lmax {
                let p = self.plm.slice(s![l, m, ..]);
                let c = coeffs.clm[[l, m]];
                let sn = coeffs.slm[[l, m]];
                if c != 0.0 {
                    d_cos.column_mut(m).scaled_add(c, &p);
                }
                if sn != 0.0 {
                    d_sin.column_mut(m).scaled_add(sn, &p);
                }
            }
        }

        let (cos_ml, sin_ml) = order_terms(&self.lon, mmax);
        let data = d_cos.dot(&cos_ml) + d_sin.dot(&sin_ml);
        Ok(SpatialGrid {
            lon: self.lon.clone(),
            lat: self.lat.clone(),
            data,
            epoch: coeffs.epoch,
        })
    }
}

/// cos(mλ) and sin(mλ) for m in 0..=mmax, each [mmax+1, n_lon].
pub(crate) fn order_terms(lon: &Array1<f64>, mmax: usize) -> (Array2<f64>, Array2<f64>) {
    let n_lon = lon.len();
    let mut cos_ml = Array2::zeros((mmax + 1, n_lon));
    let mut sin_ml = Array2::zeros((mmax + 1, n_lon));
    for (i, &lambda) in lon.iter().enumerate() {
        let phi = lambda * PI / 180.0;
        for m in 0..=mmax {
            let arg = m as f64 * phi;
            cos_ml[[m, i]] = arg.cos();
            sin_ml[[m, i]] = arg.sin();
        }
    }
    (cos_ml, sin_ml)
}

/// Cell edges around ordered node coordinates.
fn edges(nodes: &Array1<f64>) -> Vec<f64> {
    let n = nodes.len();
    let mut e = Vec::with_capacity(n + 1);
    if n == 1 {
        return e;
    }
    e.push(nodes[0] - (nodes[1] - nodes[0]) / 2.0);
    for i in 1..n {
        e.push((nodes[i - 1] + nodes[i]) / 2.0);
    }
    e.push(nodes[n - 1] + (nodes[n - 1] - nodes[n - 2]) / 2.0);
    e
}

/// Solid angle (sr) of each grid cell, [n_lat, n_lon].
///
/// Longitude widths are trimmed at both ends when the nodes repeat the
/// −180/180 meridian; latitude edges are clipped at the poles, so a regular
/// global grid sums to 4π.
pub fn cell_areas(lon: &Array1<f64>, lat: &Array1<f64>) -> Array2<f64> {
    let mut lon_width: Vec<f64> = if lon.len() == 1 {
        vec![360.0]
    } else {
        edges(lon).windows(2).map(|w| (w[1] - w[0]).abs()).collect()
    };
    let total: f64 = lon_width.iter().sum();
    if total > 360.0 && lon_width.len() > 1 {
        let excess = (total - 360.0) / 2.0;
        let last = lon_width.len() - 1;
        lon_width[0] = (lon_width[0] - excess).max(0.0);
        lon_width[last] = (lon_width[last] - excess).max(0.0);
    }

    let lat_band: Vec<f64> = if lat.len() == 1 {
        vec![2.0]
    } else {
        edges(lat)
            .windows(2)
            .map(|w| {
                let a = w[0].clamp(-90.0, 90.0).to_radians().sin();
                let b = w[1].clamp(-90.0, 90.0).to_radians().sin();
                (a - b).abs()
            })
            .collect()
    };

    Array2::from_shape_fn((lat.len(), lon.len()), |(j, i)| {
        lat_band[j] * lon_width[i].to_radians()
    })
}

/// ∫ f dΩ over the grid (unit sphere).
pub fn area_integral(grid: &SpatialGrid) -> f64 {
    let area = cell_areas(&grid.lon, &grid.lat);
    (&grid.data * &area).sum()
}
