// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Conversion Factors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-harmonic conversion between geoid and mass coefficients (Wahr 1998).
//!
//! mass_factor(l)         = (2l+1) / (1+k_l)
//! inverse_mass_factor(l) = 3/(4π ρ R³) · (1+k_l) / (2l+1)
//!
//! so mass_factor · inverse_mass_factor · UNIT_MASS = 1.

use crate::index::HarmonicIndex;
use mascon_types::constants::INV_UNIT_MASS;
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::FitMode;
use ndarray::Array1;

/// Geoid → mass coefficient factor at degree `l`.
pub fn mass_factor(l: usize, kl: f64) -> f64 {
    (2.0 * l as f64 + 1.0) / (1.0 + kl)
}

/// Mass → geoid coefficient factor at degree `l`, including 3/(4πρR³).
pub fn inverse_mass_factor(l: usize, kl: f64) -> f64 {
    INV_UNIT_MASS * (1.0 + kl) / (2.0 * l as f64 + 1.0)
}

/// Factors laid out along the harmonic index.
#[derive(Debug, Clone)]
pub struct ConversionFactors {
    pub mass: Array1<f64>,
    pub inverse_mass: Array1<f64>,
    pub smoothing: Array1<f64>,
}

impl ConversionFactors {
    /// Build from per-degree Love numbers `kl` and smoothing weights.
    ///
    /// Both tables must reach LMAX; a short Love number table gives
    /// `ExtrapolationRequired` (extend it first with `love::extend_to`).
    pub fn new(
        index: &HarmonicIndex,
        kl: &Array1<f64>,
        smoothing_by_degree: &Array1<f64>,
    ) -> MasconResult<Self> {
        let lmax = index.lmax();
        if kl.len() <= lmax {
            return Err(MasconError::ExtrapolationRequired {
                degree: lmax,
                table_lmax: kl.len().saturating_sub(1),
            });
        }
        if smoothing_by_degree.len() <= lmax {
            return Err(MasconError::ConfigError(format!(
                "smoothing weights reach degree {}, need {}",
                smoothing_by_degree.len() as i64 - 1,
                lmax
            )));
        }

        let n = index.len();
        let mut mass = Array1::zeros(n);
        let mut inverse_mass = Array1::zeros(n);
        let mut smoothing = Array1::zeros(n);
        for (i, term) in index.terms().iter().enumerate() {
            let l = term.l;
            mass[i] = mass_factor(l, kl[l]);
            inverse_mass[i] = inverse_mass_factor(l, kl[l]);
            smoothing[i] = smoothing_by_degree[l];
        }

        Ok(ConversionFactors {
            mass,
            inverse_mass,
            smoothing,
        })
    }

    pub fn len(&self) -> usize {
        self.mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    /// Row scaling of the design matrix and diagonal of the target set.
    pub fn fit_scale(&self, mode: FitMode) -> Array1<f64> {
        match mode {
            FitMode::Mass => &self.smoothing * &self.mass,
            FitMode::Geoid => self.smoothing.clone(),
        }
    }

    /// Scaling applied when unpacking solved coefficients.
    pub fn inverse_scale(&self, mode: FitMode) -> Array1<f64> {
        match mode {
            FitMode::Mass => self.inverse_mass.clone(),
            FitMode::Geoid => Array1::ones(self.len()),
        }
    }
}
