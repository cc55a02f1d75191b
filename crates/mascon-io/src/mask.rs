// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Land-Sea Mask
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::format::read_grid;
use log::debug;
use mascon_core::ocean::LandSeaMask;
use mascon_types::config::DataFormat;
use mascon_types::error::MasconResult;
use std::path::Path;

/// Load a land-sea mask. `.npz` files are read as archives, anything
/// else as `lon lat value` text.
pub fn read_land_sea_mask(path: &Path) -> MasconResult<LandSeaMask> {
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("npz") => DataFormat::Npz,
        _ => DataFormat::Ascii,
    };
    let grid = read_grid(format, path)?;
    debug!(
        "land-sea mask {}: {}x{} nodes",
        path.display(),
        grid.lat.len(),
        grid.lon.len()
    );
    Ok(LandSeaMask::new(grid))
}
