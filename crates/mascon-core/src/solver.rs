// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Least-Squares Kernel Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-harmonic minimum-norm least-squares solve against the design matrix.
//!
//! For harmonic i the target is fit_scale[i]·e_i and the solution x
//! minimises ||D x − t||₂. Since x = D⁺ t = fit_scale[i]·D⁺[:, i], one
//! pseudoinverse serves every target:
//!
//!   A[i, k] = D⁺[k, i] · fit_scale[i] · total_area_mass[k]

use crate::design::DesignMatrix;
use log::{debug, warn};
use mascon_math::linalg::{lstsq_min_norm, pinv_min_norm};
use mascon_types::error::MasconResult;
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

/// Sensitivity contributions, [n_harm, n_mascons].
#[derive(Debug, Clone)]
pub struct KernelSolution {
    pub a: Array2<f64>,
    /// Numerical rank of the design matrix.
    pub rank: usize,
}

/// Solve every harmonic target with a single pseudoinverse.
pub fn solve_kernels(design: &DesignMatrix) -> KernelSolution {
    let (n_harm, n_mas) = design.matrix.dim();
    let (pinv, rank) = pinv_min_norm(&design.matrix);
    debug!("design {n_harm}x{n_mas}, rank {rank}");
    report_rank(rank, n_mas);

    let mut a = Array2::zeros((n_harm, n_mas));
    a.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let scale = design.fit_scale[i];
            for k in 0..n_mas {
                row[k] = pinv[[k, i]] * scale * design.total_area_mass[k];
            }
        });

    KernelSolution { a, rank }
}

/// Reference path: one independent least-squares solve per harmonic.
pub fn solve_kernels_per_target(design: &DesignMatrix) -> MasconResult<KernelSolution> {
    let (n_harm, n_mas) = design.matrix.dim();

    let rows: Vec<(Array1<f64>, usize)> = (0..n_harm)
        .into_par_iter()
        .map(|i| -> MasconResult<(Array1<f64>, usize)> {
            let mut target = Array1::zeros(n_harm);
            target[i] = design.fit_scale[i];
            let sol = lstsq_min_norm(&design.matrix, &target)?;
            Ok((&sol.x * &design.total_area_mass, sol.rank))
        })
        .collect::<MasconResult<Vec<_>>>()?;

    let rank = rows.first().map_or(0, |(_, r)| *r);
    let mut a = Array2::zeros((n_harm, n_mas));
    for (i, (row, _)) in rows.iter().enumerate() {
        a.row_mut(i).assign(row);
    }
    report_rank(rank, n_mas);
    Ok(KernelSolution { a, rank })
}

fn report_rank(rank: usize, n_mas: usize) {
    if rank < n_mas {
        warn!(
            "design matrix is rank deficient ({rank} of {n_mas} mascons independent); \
             using the minimum-norm solution"
        );
    }
}
