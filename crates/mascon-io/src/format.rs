// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Format Dispatch
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::{ascii, npz};
use mascon_types::config::DataFormat;
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{HarmonicSet, SpatialGrid};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Reads harmonic sets from disk.
pub trait HarmonicReader {
    fn read_harmonics(&self, path: &Path) -> MasconResult<HarmonicSet>;
}

/// Writes kernel outputs into already-open files.
pub trait KernelWriter {
    fn write_harmonics(&self, set: &HarmonicSet, file: File) -> MasconResult<()>;
    fn write_grid(&self, grid: &SpatialGrid, file: File) -> MasconResult<()>;
}

fn unsupported(format: DataFormat) -> MasconError {
    MasconError::ConfigError(format!("data format '{format}' is not supported by this build"))
}

impl HarmonicReader for DataFormat {
    fn read_harmonics(&self, path: &Path) -> MasconResult<HarmonicSet> {
        match self {
            DataFormat::Ascii => ascii::read_harmonics(path),
            DataFormat::Npz => npz::read_harmonics(path),
            other => Err(unsupported(*other)),
        }
    }
}

impl KernelWriter for DataFormat {
    fn write_harmonics(&self, set: &HarmonicSet, file: File) -> MasconResult<()> {
        match self {
            DataFormat::Ascii => {
                let mut out = BufWriter::new(file);
                ascii::write_harmonics(set, &mut out)?;
                out.flush()?;
                Ok(())
            }
            DataFormat::Npz => npz::write_harmonics(set, file),
            other => Err(unsupported(*other)),
        }
    }

    fn write_grid(&self, grid: &SpatialGrid, file: File) -> MasconResult<()> {
        match self {
            DataFormat::Ascii => {
                let mut out = BufWriter::new(file);
                ascii::write_grid(grid, &mut out)?;
                out.flush()?;
                Ok(())
            }
            DataFormat::Npz => npz::write_grid(grid, file),
            other => Err(unsupported(*other)),
        }
    }
}

/// Read a regular lon/lat grid in `format`.
pub fn read_grid(format: DataFormat, path: &Path) -> MasconResult<SpatialGrid> {
    match format {
        DataFormat::Ascii => ascii::read_grid(path),
        DataFormat::Npz => npz::read_grid(path),
        other => Err(unsupported(other)),
    }
}
