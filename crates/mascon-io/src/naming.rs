// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Output Naming
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use mascon_types::config::KernelConfig;

/// Shared `{_OCN}_L{LMAX}[M{MMAX}][_r{RAD}km].{ext}` tail.
fn name_tail(config: &KernelConfig) -> String {
    let ocean = if config.mascon_ocean { "_OCN" } else { "" };
    let order = match config.mmax {
        Some(m) if m != config.lmax => format!("M{m}"),
        _ => String::new(),
    };
    let smoothing = if config.radius_km != 0.0 {
        format!("_r{:.0}km", config.radius_km)
    } else {
        String::new()
    };
    format!(
        "{ocean}_L{}{order}{smoothing}.{}",
        config.lmax,
        config.data_format.suffix()
    )
}

/// Kernel harmonics file name.
pub fn harmonics_file_name(mascon: &str, config: &KernelConfig) -> String {
    format!("{mascon}_SKERNEL_CLM{}", name_tail(config))
}

/// Kernel grid file name.
pub fn grid_file_name(mascon: &str, config: &KernelConfig) -> String {
    format!("{mascon}_SKERNEL{}", name_tail(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mascon_types::config::{DataFormat, GridInterval};
    use mascon_types::state::FitMode;
    use std::path::PathBuf;

    fn config() -> KernelConfig {
        KernelConfig {
            lmin: 1,
            lmax: 60,
            mmax: None,
            radius_km: 0.0,
            data_format: DataFormat::Ascii,
            mascon_index: PathBuf::from("index.txt"),
            directory: PathBuf::from("out"),
            fit_method: FitMode::Mass,
            mascon_ocean: false,
            landmask: None,
            ddeg: [1.0, 1.0],
            interval: GridInterval::Centers,
        }
    }

    #[test]
    fn test_plain_names() {
        let cfg = config();
        assert_eq!(harmonics_file_name("GRL", &cfg), "GRL_SKERNEL_CLM_L60.txt");
        assert_eq!(grid_file_name("GRL", &cfg), "GRL_SKERNEL_L60.txt");
    }

    #[test]
    fn test_decorated_names() {
        let mut cfg = config();
        cfg.mmax = Some(30);
        cfg.radius_km = 300.0;
        cfg.mascon_ocean = true;
        cfg.data_format = DataFormat::Npz;
        assert_eq!(
            harmonics_file_name("GRL", &cfg),
            "GRL_SKERNEL_CLM_OCN_L60M30_r300km.npz"
        );
        assert_eq!(grid_file_name("GRL", &cfg), "GRL_SKERNEL_OCN_L60M30_r300km.npz");
    }

    #[test]
    fn test_mmax_equal_to_lmax_is_omitted() {
        let mut cfg = config();
        cfg.mmax = Some(60);
        assert_eq!(grid_file_name("X", &cfg), "X_SKERNEL_L60.txt");
    }
}
