// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Kernel Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end sensitivity kernel computation for one configuration:
//! mascon harmonics → design matrix → least squares → reassembly → grids.
//!
//! No file access happens here; callers supply harmonics and providers.

use crate::design::{prepare_mascon, DesignMatrix};
use crate::factors::ConversionFactors;
use crate::index::HarmonicIndex;
use crate::love::LoveNumberProvider;
use crate::ocean::OceanHarmonicsProvider;
use crate::reassemble::reassemble_all;
use crate::solver::solve_kernels;
use crate::synthesis::{output_grid, HarmonicSummation, SpatialSynthesizer};
use log::{debug, info};
use mascon_math::gauss::smoothing_weights;
use mascon_types::config::KernelConfig;
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{FitMode, HarmonicSet, LoveNumbers, Mascon, SpatialGrid};
use rayon::prelude::*;

/// Reassembled kernel harmonics and their gridded field for one mascon.
#[derive(Debug, Clone)]
pub struct SensitivityKernel {
    pub name: String,
    /// Epoch tag holds `total_area_mass`.
    pub harmonics: HarmonicSet,
    pub total_area_mass: f64,
    pub grid: SpatialGrid,
}

/// Kernels of one run plus solve diagnostics.
#[derive(Debug, Clone)]
pub struct KernelRun {
    pub kernels: Vec<SensitivityKernel>,
    pub n_harm: usize,
    pub rank: usize,
}

/// Everything fixed by a configuration, built once per job.
#[derive(Debug)]
pub struct KernelPipeline {
    lmax: usize,
    mmax: usize,
    mode: FitMode,
    index: HarmonicIndex,
    factors: ConversionFactors,
    love: LoveNumbers,
    ocean: Option<HarmonicSet>,
    synthesizer: HarmonicSummation,
}

impl KernelPipeline {
    pub fn new(
        config: &KernelConfig,
        love_provider: &dyn LoveNumberProvider,
        ocean_provider: Option<&dyn OceanHarmonicsProvider>,
    ) -> MasconResult<Self> {
        config.validate()?;
        let lmax = config.lmax;
        let mmax = config.mmax();
        let index = HarmonicIndex::new(config.lmin, lmax, mmax)?;

        let love = love_provider.load(lmax)?;
        let weights = smoothing_weights(config.radius_km, lmax);
        let factors = ConversionFactors::new(&index, &love.kl, &weights)?;

        let ocean = match (config.mascon_ocean, ocean_provider) {
            (false, _) => None,
            (true, Some(provider)) => Some(provider.ocean_harmonics(lmax, mmax, &love)?),
            (true, None) => {
                return Err(MasconError::ConfigError(
                    "MASCON_OCEAN is set but no ocean function was supplied".to_string(),
                ))
            }
        };

        let (lon, lat) = output_grid(config.ddeg, config.interval);
        debug!(
            "pipeline: n_harm={} grid {}x{} radius={} km",
            index.len(),
            lat.len(),
            lon.len(),
            config.radius_km
        );
        let synthesizer = HarmonicSummation::new(lon, lat, lmax);

        Ok(KernelPipeline {
            lmax,
            mmax,
            mode: config.fit_method,
            index,
            factors,
            love,
            ocean,
            synthesizer,
        })
    }

    pub fn index(&self) -> &HarmonicIndex {
        &self.index
    }

    pub fn factors(&self) -> &ConversionFactors {
        &self.factors
    }

    pub fn love(&self) -> &LoveNumbers {
        &self.love
    }

    pub fn ocean(&self) -> Option<&HarmonicSet> {
        self.ocean.as_ref()
    }

    /// Area mass, ocean redistribution and truncation for one mascon file.
    pub fn prepare(&self, name: impl Into<String>, raw: HarmonicSet) -> MasconResult<Mascon> {
        prepare_mascon(name, raw, self.lmax, self.mmax, self.ocean.as_ref())
    }

    /// Solve all mascons jointly and synthesize each kernel.
    pub fn run(&self, mascons: &[Mascon]) -> MasconResult<KernelRun> {
        let design = DesignMatrix::build(mascons, self.mode, &self.factors, &self.index)?;
        info!(
            "solving {} harmonics against {} mascons ({:?} fit)",
            design.n_harm(),
            design.n_mascons(),
            self.mode
        );
        let solution = solve_kernels(&design);
        let inverse_scale = self.factors.inverse_scale(self.mode);
        let sets = reassemble_all(
            &solution,
            inverse_scale.view(),
            &self.index,
            design.total_area_mass.view(),
        )?;

        let kernels = mascons
            .par_iter()
            .zip(sets.into_par_iter())
            .map(|(mascon, harmonics)| -> MasconResult<SensitivityKernel> {
                let mut grid = self.synthesizer.synthesize(&harmonics)?;
                grid.epoch = Some(mascon.total_area_mass);
                Ok(SensitivityKernel {
                    name: mascon.name.clone(),
                    harmonics,
                    total_area_mass: mascon.total_area_mass,
                    grid,
                })
            })
            .collect::<MasconResult<Vec<_>>>()?;

        Ok(KernelRun {
            kernels,
            n_harm: design.n_harm(),
            rank: solution.rank,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mascon_types::config::{DataFormat, GridInterval};
    use mascon_types::constants::UNIT_MASS;
    use std::path::PathBuf;

    fn config(lmin: usize, lmax: usize, mode: FitMode) -> KernelConfig {
        KernelConfig {
            lmin,
            lmax,
            mmax: None,
            radius_km: 0.0,
            data_format: DataFormat::Ascii,
            mascon_index: PathBuf::from("index.txt"),
            directory: PathBuf::from("out"),
            fit_method: mode,
            mascon_ocean: false,
            landmask: None,
            ddeg: [10.0, 10.0],
            interval: GridInterval::Centers,
        }
    }

    #[test]
    fn test_c00_mascon_is_fully_recovered() {
        let cfg = config(0, 4, FitMode::Mass);
        let pipeline = KernelPipeline::new(&cfg, &LoveNumbers::rigid(4), None).unwrap();
        let mut raw = HarmonicSet::new(4, 4);
        raw.clm[[0, 0]] = 1.0;
        let mascon = pipeline.prepare("GLOBAL", raw).unwrap();
        assert!((mascon.total_area_mass - UNIT_MASS).abs() / UNIT_MASS < 1e-14);

        let run = pipeline.run(&[mascon]).unwrap();
        assert_eq!(run.rank, 1);
        let k = &run.kernels[0];
        assert_eq!(k.harmonics.epoch, Some(k.total_area_mass));
        assert!((k.harmonics.c00() - 1.0).abs() < 1e-12);
        assert!(k.grid.data.iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_wide_smoothing_keeps_fit_weights_positive() {
        let mut cfg = config(1, 120, FitMode::Mass);
        cfg.radius_km = 2000.0;
        cfg.ddeg = [30.0, 30.0];
        let pipeline = KernelPipeline::new(&cfg, &LoveNumbers::rigid(120), None).unwrap();
        let smoothing = &pipeline.factors().smoothing;
        assert!(smoothing.iter().all(|&w| w > 0.0 && w <= 1.0));

        let fit = pipeline.factors().fit_scale(FitMode::Mass);
        assert!(fit.iter().all(|v| v.is_finite() && *v > 0.0));

        let mut raw = HarmonicSet::new(120, 120);
        raw.clm[[0, 0]] = 0.01;
        raw.clm[[1, 0]] = 0.02;
        raw.clm[[2, 1]] = -0.005;
        let mascon = pipeline.prepare("CAP", raw).unwrap();
        let run = pipeline.run(&[mascon]).unwrap();
        assert_eq!(run.rank, 1);
        assert!(run.kernels[0].grid.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_ocean_requires_provider() {
        let mut cfg = config(1, 4, FitMode::Mass);
        cfg.mascon_ocean = true;
        cfg.landmask = Some(PathBuf::from("mask.txt"));
        let err = KernelPipeline::new(&cfg, &LoveNumbers::rigid(4), None).unwrap_err();
        assert!(matches!(err, MasconError::ConfigError(_)));
    }

    #[test]
    fn test_short_mascon_fails() {
        let cfg = config(1, 6, FitMode::Geoid);
        let pipeline = KernelPipeline::new(&cfg, &LoveNumbers::rigid(6), None).unwrap();
        let err = pipeline.prepare("SMALL", HarmonicSet::new(4, 4)).unwrap_err();
        assert!(matches!(err, MasconError::DimensionMismatch { .. }));
    }
}
