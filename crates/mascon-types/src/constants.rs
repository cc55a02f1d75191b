// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::f64::consts::PI;

/// Average density of the Earth (g/cm^3).
pub const RHO_EARTH: f64 = 5.517;

/// Average radius of the Earth (cm).
pub const RAD_EARTH_CM: f64 = 6.371e8;

/// Average radius of the Earth (km), used by the Gaussian smoothing kernel.
pub const RAD_EARTH_KM: f64 = 6371.0;

/// Mass (g) of a 1 cm water-equivalent layer per unit degree-0 geoid coefficient.
///
/// `total_area_mass = UNIT_MASS * clm[0,0]`, i.e. 4π R³ ρ / 3.
pub const UNIT_MASS: f64 = 4.0 * PI * RAD_EARTH_CM * RAD_EARTH_CM * RAD_EARTH_CM * RHO_EARTH / 3.0;

/// Inverse of [`UNIT_MASS`]: 3 / (4π ρ R³).
pub const INV_UNIT_MASS: f64 = 0.75 / (PI * RHO_EARTH * RAD_EARTH_CM * RAD_EARTH_CM * RAD_EARTH_CM);

/// Mass (g) of a uniform 1 cm w.e. layer over a footprint with degree-0 coefficient `c00`.
pub fn area_mass(c00: f64) -> f64 {
    UNIT_MASS * c00
}
