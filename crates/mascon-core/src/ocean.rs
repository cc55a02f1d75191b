// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Ocean Function
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spherical-harmonic analysis of surface loads and the ocean function
//! derived from a land-sea mask.
//!
//! Clm = 3(1+k_l) / (4π R ρ (2l+1)) · ∫ σ P̄lm cos mλ dΩ, σ in cm w.e.
//! (Slm with sin mλ).

use crate::synthesis::{cell_areas, order_terms};
use log::debug;
use mascon_math::legendre::plm_fully_normalized;
use mascon_types::constants::{RAD_EARTH_CM, RHO_EARTH};
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{HarmonicSet, LoveNumbers, SpatialGrid};
use ndarray::s;
use std::f64::consts::PI;

/// Geoid harmonics of a uniform 1 cm water layer over the ocean.
pub trait OceanHarmonicsProvider {
    fn ocean_harmonics(&self, lmax: usize, mmax: usize, love: &LoveNumbers) -> MasconResult<HarmonicSet>;
}

/// Geoid coefficients of the load `grid.data` (cm w.e.) up to lmax/mmax.
pub fn spatial_to_harmonics(
    grid: &SpatialGrid,
    lmax: usize,
    mmax: usize,
    love: &LoveNumbers,
) -> MasconResult<HarmonicSet> {
    let mmax = mmax.min(lmax);
    if love.kl.len() <= lmax {
        return Err(MasconError::ExtrapolationRequired {
            degree: lmax,
            table_lmax: love.lmax(),
        });
    }
    if grid.data.dim() != (grid.lat.len(), grid.lon.len()) {
        return Err(MasconError::ConfigError(format!(
            "grid data {:?} does not match {} latitudes x {} longitudes",
            grid.data.dim(),
            grid.lat.len(),
            grid.lon.len()
        )));
    }

    let weighted = &grid.data * &cell_areas(&grid.lon, &grid.lat);
    let (cos_ml, sin_ml) = order_terms(&grid.lon, mmax);
    // [n_lat, mmax+1]
    let a_cos = weighted.dot(&cos_ml.t());
    let a_sin = weighted.dot(&sin_ml.t());

    let x = grid.lat.mapv(|phi| ((90.0 - phi).to_radians()).cos());
    let plm = plm_fully_normalized(lmax, &x);

    let mut set = HarmonicSet::new(lmax, mmax);
    for l in 0..=lmax {
        let dfactor = 3.0 * (1.0 + love.kl[l])
            / (4.0 * PI * RAD_EARTH_CM * RHO_EARTH * (2.0 * l as f64 + 1.0));
        for m in 0..=l.min(mmax) {
            let p = plm.slice(s![l, m, ..]);
            set.clm[[l, m]] = dfactor * p.dot(&a_cos.column(m));
            if m > 0 {
                set.slm[[l, m]] = dfactor * p.dot(&a_sin.column(m));
            }
        }
    }
    Ok(set)
}

/// Land-sea mask on a regular grid; nodes with value 0 are ocean.
#[derive(Debug, Clone)]
pub struct LandSeaMask {
    pub grid: SpatialGrid,
}

impl LandSeaMask {
    pub fn new(grid: SpatialGrid) -> Self {
        LandSeaMask { grid }
    }

    /// 1 over the ocean, 0 over land.
    pub fn ocean_function(&self) -> SpatialGrid {
        SpatialGrid {
            lon: self.grid.lon.clone(),
            lat: self.grid.lat.clone(),
            data: self.grid.data.mapv(|v| if v == 0.0 { 1.0 } else { 0.0 }),
            epoch: None,
        }
    }
}

impl OceanHarmonicsProvider for LandSeaMask {
    fn ocean_harmonics(&self, lmax: usize, mmax: usize, love: &LoveNumbers) -> MasconResult<HarmonicSet> {
        let ocean = self.ocean_function();
        let n_ocean = ocean.data.iter().filter(|&&v| v > 0.0).count();
        debug!("ocean function: {n_ocean} of {} nodes", ocean.data.len());
        if n_ocean == 0 {
            return Err(MasconError::ConfigError(
                "land-sea mask contains no ocean nodes".to_string(),
            ));
        }
        spatial_to_harmonics(&ocean, lmax, mmax, love)
    }
}
