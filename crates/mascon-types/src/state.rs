// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{MasconError, MasconResult};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

/// Cosine (C) or sine (S) half of a spherical-harmonic expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoefficientKind {
    Cosine,
    Sine,
}

/// Unit system the least-squares fit runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fit mass (surface density) coefficients. Parameter value 1.
    Mass,
    /// Fit geoid-height coefficients. Parameter value 2.
    Geoid,
}

impl FitMode {
    /// Parse the legacy FIT_METHOD code (1 = mass, 2 = geoid).
    pub fn from_code(code: i64) -> MasconResult<Self> {
        match code {
            1 => Ok(FitMode::Mass),
            2 => Ok(FitMode::Geoid),
            other => Err(MasconError::ConfigError(format!(
                "FIT_METHOD must be 1 (mass) or 2 (geoid), got {other}"
            ))),
        }
    }
}

/// Triangular spherical-harmonic coefficient set.
///
/// `clm` and `slm` are [lmax+1, mmax+1]. Entries with m > l and the sine
/// column at m = 0 are kept at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicSet {
    pub lmax: usize,
    pub mmax: usize,
    pub clm: Array2<f64>,
    pub slm: Array2<f64>,
    /// Time tag, or an associated scalar for kernel outputs.
    pub epoch: Option<f64>,
}

impl HarmonicSet {
    /// Zero-filled set. `mmax` is clamped to `lmax`.
    pub fn new(lmax: usize, mmax: usize) -> Self {
        let mmax = mmax.min(lmax);
        HarmonicSet {
            lmax,
            mmax,
            clm: Array2::zeros((lmax + 1, mmax + 1)),
            slm: Array2::zeros((lmax + 1, mmax + 1)),
            epoch: None,
        }
    }

    /// Build from full arrays, enforcing the triangular shape invariant.
    pub fn from_arrays(clm: Array2<f64>, slm: Array2<f64>) -> MasconResult<Self> {
        if clm.dim() != slm.dim() {
            return Err(MasconError::ConfigError(format!(
                "clm shape {:?} != slm shape {:?}",
                clm.dim(),
                slm.dim()
            )));
        }
        let (rows, cols) = clm.dim();
        if rows == 0 || cols == 0 || cols > rows {
            return Err(MasconError::ConfigError(format!(
                "harmonic arrays must be [lmax+1, mmax+1] with mmax <= lmax, got {rows}x{cols}"
            )));
        }
        let mut set = HarmonicSet {
            lmax: rows - 1,
            mmax: cols - 1,
            clm,
            slm,
            epoch: None,
        };
        set.enforce_shape();
        Ok(set)
    }

    fn enforce_shape(&mut self) {
        self.slm.column_mut(0).fill(0.0);
        for l in 0..=self.lmax {
            for m in (l + 1)..=self.mmax {
                self.clm[[l, m]] = 0.0;
                self.slm[[l, m]] = 0.0;
            }
        }
    }

    pub fn with_epoch(mut self, epoch: f64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn get(&self, kind: CoefficientKind, l: usize, m: usize) -> f64 {
        match kind {
            CoefficientKind::Cosine => self.clm[[l, m]],
            CoefficientKind::Sine => self.slm[[l, m]],
        }
    }

    pub fn set(&mut self, kind: CoefficientKind, l: usize, m: usize, value: f64) {
        match kind {
            CoefficientKind::Cosine => self.clm[[l, m]] = value,
            CoefficientKind::Sine => self.slm[[l, m]] = value,
        }
    }

    /// Degree-0 cosine coefficient.
    pub fn c00(&self) -> f64 {
        self.clm[[0, 0]]
    }

    /// True when the set holds every coefficient up to `lmax`/`mmax`.
    pub fn covers(&self, lmax: usize, mmax: usize) -> bool {
        self.lmax >= lmax && self.mmax >= mmax.min(lmax)
    }

    /// Copy truncated to degree `lmax` and order `mmax`.
    /// Returns `None` when the set does not cover the requested bounds.
    pub fn truncate(&self, lmax: usize, mmax: usize) -> Option<Self> {
        let mmax = mmax.min(lmax);
        if !self.covers(lmax, mmax) {
            return None;
        }
        Some(HarmonicSet {
            lmax,
            mmax,
            clm: self.clm.slice(s![..=lmax, ..=mmax]).to_owned(),
            slm: self.slm.slice(s![..=lmax, ..=mmax]).to_owned(),
            epoch: self.epoch,
        })
    }

    /// Number of stored (l, m) pairs with m <= min(l, mmax).
    pub fn n_pairs(&self) -> usize {
        (0..=self.lmax).map(|l| l.min(self.mmax) + 1).sum()
    }
}

/// A mascon: unit-mass harmonics plus the mass of its 1 cm w.e. footprint.
#[derive(Debug, Clone)]
pub struct Mascon {
    pub name: String,
    pub harmonics: HarmonicSet,
    /// Mass (g) of a uniform 1 cm w.e. layer over the footprint.
    pub total_area_mass: f64,
}

/// Load Love numbers indexed by degree.
#[derive(Debug, Clone)]
pub struct LoveNumbers {
    /// Vertical displacement.
    pub hl: Array1<f64>,
    /// Gravitational potential.
    pub kl: Array1<f64>,
    /// Horizontal displacement.
    pub ll: Array1<f64>,
}

impl LoveNumbers {
    /// Highest degree present in the table.
    pub fn lmax(&self) -> usize {
        self.kl.len().saturating_sub(1)
    }

    /// Zero Love numbers up to `lmax` (rigid Earth), mostly useful in tests.
    pub fn rigid(lmax: usize) -> Self {
        LoveNumbers {
            hl: Array1::zeros(lmax + 1),
            kl: Array1::zeros(lmax + 1),
            ll: Array1::zeros(lmax + 1),
        }
    }
}

/// Regular lon/lat field. `data` is [n_lat, n_lon].
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    pub lon: Array1<f64>,
    pub lat: Array1<f64>,
    pub data: Array2<f64>,
    pub epoch: Option<f64>,
}

impl SpatialGrid {
    pub fn zeros(lon: Array1<f64>, lat: Array1<f64>) -> Self {
        let data = Array2::zeros((lat.len(), lon.len()));
        SpatialGrid {
            lon,
            lat,
            data,
            epoch: None,
        }
    }
}
