// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Design Matrix
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mascon preparation and the (n_harm × n_mascons) design matrix.

use crate::factors::ConversionFactors;
use crate::index::HarmonicIndex;
use mascon_types::constants::area_mass;
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{FitMode, HarmonicSet, Mascon};
use ndarray::{Array1, Array2};

/// Remove `ratio · ocean` from `set` over every (l, m) up to the ocean set's
/// bounds, with `ratio = set.C00 / ocean.C00`. Returns the ratio.
///
/// The mascon's mass is thereby spread as a uniform layer over the ocean,
/// so the redistributed C00 is zero.
pub fn redistribute_over_ocean(set: &mut HarmonicSet, ocean: &HarmonicSet) -> MasconResult<f64> {
    let ocean_c00 = ocean.c00();
    if ocean_c00 == 0.0 || !ocean_c00.is_finite() {
        return Err(MasconError::ConfigError(format!(
            "ocean function has degenerate degree-0 term {ocean_c00}"
        )));
    }
    if !set.covers(ocean.lmax, ocean.mmax) {
        return Err(MasconError::DimensionMismatch {
            name: "mascon (ocean redistribution)".to_string(),
            lmax: set.lmax,
            mmax: set.mmax,
            required_lmax: ocean.lmax,
            required_mmax: ocean.mmax,
        });
    }

    let ratio = set.c00() / ocean_c00;
    for m in 0..=ocean.mmax {
        for l in m..=ocean.lmax {
            set.clm[[l, m]] -= ratio * ocean.clm[[l, m]];
            set.slm[[l, m]] -= ratio * ocean.slm[[l, m]];
        }
    }
    Ok(ratio)
}

/// Build a [`Mascon`] from the harmonics read for it.
///
/// `total_area_mass` comes from the untouched degree-0 term; ocean
/// redistribution (if any) happens next and truncation to LMAX/MMAX last.
pub fn prepare_mascon(
    name: impl Into<String>,
    mut raw: HarmonicSet,
    lmax: usize,
    mmax: usize,
    ocean: Option<&HarmonicSet>,
) -> MasconResult<Mascon> {
    let name = name.into();
    let mmax = mmax.min(lmax);
    if !raw.covers(lmax, mmax) {
        return Err(MasconError::DimensionMismatch {
            name,
            lmax: raw.lmax,
            mmax: raw.mmax,
            required_lmax: lmax,
            required_mmax: mmax,
        });
    }

    let total_area_mass = area_mass(raw.c00());
    if let Some(ocean) = ocean {
        let ocean = ocean.truncate(lmax, mmax).ok_or_else(|| MasconError::DimensionMismatch {
            name: "ocean function".to_string(),
            lmax: ocean.lmax,
            mmax: ocean.mmax,
            required_lmax: lmax,
            required_mmax: mmax,
        })?;
        redistribute_over_ocean(&mut raw, &ocean)?;
    }

    let harmonics = raw.truncate(lmax, mmax).ok_or_else(|| MasconError::DimensionMismatch {
        name: name.clone(),
        lmax: raw.lmax,
        mmax: raw.mmax,
        required_lmax: lmax,
        required_mmax: mmax,
    })?;

    Ok(Mascon {
        name,
        harmonics,
        total_area_mass,
    })
}

/// Pack a harmonic set into a column following `index`.
/// The set must cover the index bounds.
pub fn pack(set: &HarmonicSet, index: &HarmonicIndex) -> Array1<f64> {
    Array1::from_iter(
        index
            .terms()
            .iter()
            .map(|term| set.get(term.kind, term.l, term.m)),
    )
}

/// Scaled mascon coefficients, one column per mascon.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub matrix: Array2<f64>,
    /// `total_area_mass` of each column.
    pub total_area_mass: Array1<f64>,
    /// Row scaling used to build `matrix`, reused as the target diagonal.
    pub fit_scale: Array1<f64>,
    pub mode: FitMode,
}

impl DesignMatrix {
    pub fn build(
        mascons: &[Mascon],
        mode: FitMode,
        factors: &ConversionFactors,
        index: &HarmonicIndex,
    ) -> MasconResult<Self> {
        if factors.len() != index.len() {
            return Err(MasconError::LinAlg(format!(
                "factor table has {} entries, index has {}",
                factors.len(),
                index.len()
            )));
        }

        let n_harm = index.len();
        let n_mas = mascons.len();
        let fit_scale = factors.fit_scale(mode);
        let mut matrix = Array2::zeros((n_harm, n_mas));
        let mut total_area_mass = Array1::zeros(n_mas);

        for (k, mascon) in mascons.iter().enumerate() {
            let h = &mascon.harmonics;
            if !h.covers(index.lmax(), index.mmax()) {
                return Err(MasconError::DimensionMismatch {
                    name: mascon.name.clone(),
                    lmax: h.lmax,
                    mmax: h.mmax,
                    required_lmax: index.lmax(),
                    required_mmax: index.mmax(),
                });
            }
            let column = pack(h, index) * &fit_scale;
            matrix.column_mut(k).assign(&column);
            total_area_mass[k] = mascon.total_area_mass;
        }

        Ok(DesignMatrix {
            matrix,
            total_area_mass,
            fit_scale,
            mode,
        })
    }

    pub fn n_harm(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_mascons(&self) -> usize {
        self.matrix.ncols()
    }
}
