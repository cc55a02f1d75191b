// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — NPZ Formats
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Columnar NumPy archives.
//!
//! Harmonics: `l`, `m` (i64) and `clm`, `slm` (f64), one entry per (l, m).
//! Grids: `lon`, `lat` and `data` [n_lat, n_lon].
//! Both carry an optional one-element `epoch`.

use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{HarmonicSet, SpatialGrid};
use ndarray::{Array1, Array2, Ix1, Ix2, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

fn read_f64_1d(npz: &mut NpzReader<File>, key: &str) -> MasconResult<Array1<f64>> {
    npz.by_name::<OwnedRepr<f64>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix1>(key))
        .map_err(MasconError::from)
}

fn read_i64_1d(npz: &mut NpzReader<File>, key: &str) -> MasconResult<Array1<i64>> {
    npz.by_name::<OwnedRepr<i64>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<i64>, Ix1>(key))
        .map_err(MasconError::from)
}

fn read_f64_2d(npz: &mut NpzReader<File>, key: &str) -> MasconResult<Array2<f64>> {
    npz.by_name::<OwnedRepr<f64>, Ix2>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix2>(key))
        .map_err(MasconError::from)
}

fn read_epoch(npz: &mut NpzReader<File>) -> Option<f64> {
    read_f64_1d(npz, "epoch").ok().and_then(|e| e.first().copied())
}

fn invalid(path: &Path, message: String) -> MasconError {
    MasconError::Parse {
        source_name: path.display().to_string(),
        line: 0,
        message,
    }
}

pub fn read_harmonics(path: &Path) -> MasconResult<HarmonicSet> {
    let mut npz = NpzReader::new(File::open(path)?)?;
    let l = read_i64_1d(&mut npz, "l")?;
    let m = read_i64_1d(&mut npz, "m")?;
    let c = read_f64_1d(&mut npz, "clm")?;
    let s = read_f64_1d(&mut npz, "slm")?;
    let n = l.len();
    if n == 0 || m.len() != n || c.len() != n || s.len() != n {
        return Err(invalid(
            path,
            format!(
                "column lengths differ or are empty: l={}, m={}, clm={}, slm={}",
                n,
                m.len(),
                c.len(),
                s.len()
            ),
        ));
    }
    if l.iter().zip(m.iter()).any(|(&l, &m)| l < 0 || m < 0 || m > l) {
        return Err(invalid(path, "degree/order columns out of range".to_string()));
    }

    let lmax = l.iter().copied().max().unwrap_or(0) as usize;
    let mmax = m.iter().copied().max().unwrap_or(0) as usize;
    let mut clm = Array2::zeros((lmax + 1, mmax + 1));
    let mut slm = Array2::zeros((lmax + 1, mmax + 1));
    for i in 0..n {
        let (li, mi) = (l[i] as usize, m[i] as usize);
        clm[[li, mi]] = c[i];
        slm[[li, mi]] = s[i];
    }
    let set = HarmonicSet::from_arrays(clm, slm)?;
    Ok(match read_epoch(&mut npz) {
        Some(epoch) => set.with_epoch(epoch),
        None => set,
    })
}

pub fn write_harmonics<W: Write + Seek>(set: &HarmonicSet, out: W) -> MasconResult<()> {
    let n = set.n_pairs();
    let mut l = Vec::with_capacity(n);
    let mut m = Vec::with_capacity(n);
    let mut c = Vec::with_capacity(n);
    let mut s = Vec::with_capacity(n);
    for deg in 0..=set.lmax {
        for ord in 0..=deg.min(set.mmax) {
            l.push(deg as i64);
            m.push(ord as i64);
            c.push(set.clm[[deg, ord]]);
            s.push(set.slm[[deg, ord]]);
        }
    }

    let mut writer = NpzWriter::new(out);
    writer.add_array("l", &Array1::from_vec(l))?;
    writer.add_array("m", &Array1::from_vec(m))?;
    writer.add_array("clm", &Array1::from_vec(c))?;
    writer.add_array("slm", &Array1::from_vec(s))?;
    if let Some(epoch) = set.epoch {
        writer.add_array("epoch", &Array1::from_elem(1, epoch))?;
    }
    writer.finish()?;
    Ok(())
}

pub fn read_grid(path: &Path) -> MasconResult<SpatialGrid> {
    let mut npz = NpzReader::new(File::open(path)?)?;
    let lon = read_f64_1d(&mut npz, "lon")?;
    let lat = read_f64_1d(&mut npz, "lat")?;
    let data = read_f64_2d(&mut npz, "data")?;
    if data.dim() != (lat.len(), lon.len()) {
        return Err(invalid(
            path,
            format!(
                "data shape {:?} does not match lat {} x lon {}",
                data.dim(),
                lat.len(),
                lon.len()
            ),
        ));
    }
    let epoch = read_epoch(&mut npz);
    Ok(SpatialGrid {
        lon,
        lat,
        data,
        epoch,
    })
}

pub fn write_grid<W: Write + Seek>(grid: &SpatialGrid, out: W) -> MasconResult<()> {
    let mut writer = NpzWriter::new(out);
    writer.add_array("lon", &grid.lon)?;
    writer.add_array("lat", &grid.lat)?;
    writer.add_array("data", &grid.data)?;
    if let Some(epoch) = grid.epoch {
        writer.add_array("epoch", &Array1::from_elem(1, epoch))?;
    }
    writer.finish()?;
    Ok(())
}
