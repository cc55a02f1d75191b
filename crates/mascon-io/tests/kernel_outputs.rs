// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Output Integration Tests for mascon-io
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Kernels computed in memory, written as named output pairs and read back.

use mascon_core::kernel::KernelPipeline;
use mascon_io::files::write_pair_atomic;
use mascon_io::format::{read_grid, HarmonicReader, KernelWriter};
use mascon_io::mascons::{mascon_name, read_mascon_index};
use mascon_io::naming::{grid_file_name, harmonics_file_name};
use mascon_types::config::{DataFormat, GridInterval, KernelConfig};
use mascon_types::state::{FitMode, HarmonicSet, LoveNumbers};
use std::io::Write;
use std::path::{Path, PathBuf};

fn config(format: DataFormat, directory: &Path) -> KernelConfig {
    KernelConfig {
        lmin: 0,
        lmax: 3,
        mmax: None,
        radius_km: 0.0,
        data_format: format,
        mascon_index: directory.join("index.txt"),
        directory: directory.to_path_buf(),
        fit_method: FitMode::Mass,
        mascon_ocean: false,
        landmask: None,
        ddeg: [30.0, 30.0],
        interval: GridInterval::Centers,
    }
}

// ── Index → kernels → files ──────────────────────────────────────────

fn write_and_reload(format: DataFormat) {
    let dir = tempfile::tempdir().unwrap();
    let mascon_path = dir.path().join("global_L3.txt");
    let mut f = std::fs::File::create(&mascon_path).unwrap();
    writeln!(f, "0 0 1.0 0.0").unwrap();
    writeln!(f, "3 3 0.0 0.0").unwrap();
    drop(f);
    std::fs::write(
        dir.path().join("index.txt"),
        format!("{}\n", mascon_path.display()),
    )
    .unwrap();

    let cfg = config(format, dir.path());
    let files = read_mascon_index(&cfg.mascon_index).unwrap();
    assert_eq!(files.len(), 1);

    let pipeline = KernelPipeline::new(&cfg, &LoveNumbers::rigid(3), None).unwrap();
    let raw = DataFormat::Ascii.read_harmonics(&files[0]).unwrap();
    let name = mascon_name(&files[0], cfg.lmax);
    assert_eq!(name, "GLOBAL");
    let mascon = pipeline.prepare(name.clone(), raw).unwrap();
    let run = pipeline.run(&[mascon]).unwrap();
    let kernel = &run.kernels[0];

    let clm_path: PathBuf = dir.path().join(harmonics_file_name(&name, &cfg));
    let grid_path: PathBuf = dir.path().join(grid_file_name(&name, &cfg));
    write_pair_atomic(
        &clm_path,
        &grid_path,
        0o644,
        |file| format.write_harmonics(&kernel.harmonics, file),
        |file| format.write_grid(&kernel.grid, file),
    )
    .unwrap();

    let harmonics: HarmonicSet = format.read_harmonics(&clm_path).unwrap();
    assert!((harmonics.c00() - 1.0).abs() < 1e-10);
    let epoch = harmonics.epoch.unwrap();
    assert!((epoch - kernel.total_area_mass).abs() / kernel.total_area_mass < 1e-10);

    let grid = read_grid(format, &grid_path).unwrap();
    assert_eq!(grid.data.dim(), (6, 12));
    assert!(grid.data.iter().all(|&v| (v - 1.0).abs() < 1e-8));
}

#[test]
fn test_ascii_outputs() {
    write_and_reload(DataFormat::Ascii);
}

#[test]
fn test_npz_outputs() {
    write_and_reload(DataFormat::Npz);
}
