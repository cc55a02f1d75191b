// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Kernel Reassembly
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::index::HarmonicIndex;
use crate::solver::KernelSolution;
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::HarmonicSet;
use ndarray::ArrayView1;

/// Unpack one column of solved contributions into a triangular set.
///
/// Coefficient (kind, l, m) at index i is `inverse_scale[i] · column[i]`;
/// degrees below LMIN stay zero. The epoch tag carries `total_area_mass`.
pub fn reassemble_kernel(
    column: ArrayView1<'_, f64>,
    inverse_scale: ArrayView1<'_, f64>,
    index: &HarmonicIndex,
    total_area_mass: f64,
) -> HarmonicSet {
    let mut set = HarmonicSet::new(index.lmax(), index.mmax());
    for (i, term) in index.terms().iter().enumerate() {
        set.set(term.kind, term.l, term.m, inverse_scale[i] * column[i]);
    }
    set.with_epoch(total_area_mass)
}

/// Reassemble every mascon column of `solution`.
pub fn reassemble_all(
    solution: &KernelSolution,
    inverse_scale: ArrayView1<'_, f64>,
    index: &HarmonicIndex,
    total_area_mass: ArrayView1<'_, f64>,
) -> MasconResult<Vec<HarmonicSet>> {
    let (n_harm, n_mas) = solution.a.dim();
    if n_harm != index.len() || inverse_scale.len() != n_harm || total_area_mass.len() != n_mas {
        return Err(MasconError::LinAlg(format!(
            "reassembly shapes disagree: solution {n_harm}x{n_mas}, index {}, \
             inverse scale {}, areas {}",
            index.len(),
            inverse_scale.len(),
            total_area_mass.len()
        )));
    }
    Ok((0..n_mas)
        .map(|k| reassemble_kernel(solution.a.column(k), inverse_scale, index, total_area_mass[k]))
        .collect())
}
