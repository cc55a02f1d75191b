// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — ASCII Formats
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plain-text harmonics (`l m clm slm`) and grids (`lon lat value`).
//!
//! Lines starting with `#` are comments; a `# epoch <value>` comment
//! carries the optional epoch tag.

use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::{HarmonicSet, SpatialGrid};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

const EPOCH_TAG: &str = "# epoch";

/// Coordinates are matched after rounding to this many units per degree.
const COORD_KEY_SCALE: f64 = 1.0e6;

fn parse_err(source_name: &str, line: usize, message: impl Into<String>) -> MasconError {
    MasconError::Parse {
        source_name: source_name.to_string(),
        line,
        message: message.into(),
    }
}

fn parse_epoch(line: &str) -> Option<f64> {
    line.strip_prefix(EPOCH_TAG)?.trim().parse().ok()
}

/// Parse `l m clm slm` rows. Bounds are the largest degree and order seen.
pub fn parse_harmonics(contents: &str, source_name: &str) -> MasconResult<HarmonicSet> {
    let mut rows = Vec::new();
    let mut epoch = None;
    for (lineno, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            if let Some(value) = parse_epoch(trimmed) {
                epoch = Some(value);
            }
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(parse_err(
                source_name,
                lineno + 1,
                format!("expected 'l m clm slm', got '{trimmed}'"),
            ));
        }
        let l: usize = fields[0]
            .parse()
            .map_err(|_| parse_err(source_name, lineno + 1, format!("invalid degree '{}'", fields[0])))?;
        let m: usize = fields[1]
            .parse()
            .map_err(|_| parse_err(source_name, lineno + 1, format!("invalid order '{}'", fields[1])))?;
        if m > l {
            return Err(parse_err(source_name, lineno + 1, format!("order {m} exceeds degree {l}")));
        }
        let clm: f64 = fields[2]
            .parse()
            .map_err(|_| parse_err(source_name, lineno + 1, format!("invalid clm '{}'", fields[2])))?;
        let slm: f64 = fields[3]
            .parse()
            .map_err(|_| parse_err(source_name, lineno + 1, format!("invalid slm '{}'", fields[3])))?;
        rows.push((l, m, clm, slm));
    }

    if rows.is_empty() {
        return Err(parse_err(source_name, 0, "no harmonic coefficients found"));
    }
    let lmax = rows.iter().map(|r| r.0).max().unwrap_or(0);
    let mmax = rows.iter().map(|r| r.1).max().unwrap_or(0);
    let mut clm = Array2::zeros((lmax + 1, mmax + 1));
    let mut slm = Array2::zeros((lmax + 1, mmax + 1));
    for (l, m, c, s) in rows {
        clm[[l, m]] = c;
        slm[[l, m]] = s;
    }
    let set = HarmonicSet::from_arrays(clm, slm)?;
    Ok(match epoch {
        Some(value) => set.with_epoch(value),
        None => set,
    })
}

pub fn read_harmonics(path: &Path) -> MasconResult<HarmonicSet> {
    let contents = std::fs::read_to_string(path)?;
    parse_harmonics(&contents, &path.display().to_string())
}

pub fn write_harmonics<W: Write>(set: &HarmonicSet, out: &mut W) -> MasconResult<()> {
    if let Some(epoch) = set.epoch {
        writeln!(out, "{EPOCH_TAG} {epoch:.12e}")?;
    }
    for l in 0..=set.lmax {
        for m in 0..=l.min(set.mmax) {
            writeln!(
                out,
                "{l:5} {m:5} {:+21.12e} {:+21.12e}",
                set.clm[[l, m]],
                set.slm[[l, m]]
            )?;
        }
    }
    Ok(())
}

/// Parse `lon lat value` rows of a complete regular grid.
///
/// Longitudes come back ascending and latitudes descending.
pub fn parse_grid(contents: &str, source_name: &str) -> MasconResult<SpatialGrid> {
    let key = |v: f64| (v * COORD_KEY_SCALE).round() as i64;
    let mut points = Vec::new();
    let mut lons = BTreeMap::new();
    let mut lats = BTreeMap::new();
    let mut epoch = None;

    for (lineno, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            if let Some(value) = parse_epoch(trimmed) {
                epoch = Some(value);
            }
            continue;
        }
        let values: Vec<f64> = trimmed
            .split_whitespace()
            .take(3)
            .map(|f| f.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| parse_err(source_name, lineno + 1, format!("invalid row '{trimmed}'")))?;
        if values.len() < 3 {
            return Err(parse_err(
                source_name,
                lineno + 1,
                format!("expected 'lon lat value', got '{trimmed}'"),
            ));
        }
        lons.insert(key(values[0]), values[0]);
        lats.insert(key(values[1]), values[1]);
        points.push((key(values[0]), key(values[1]), values[2]));
    }

    if points.is_empty() {
        return Err(parse_err(source_name, 0, "no grid points found"));
    }
    let lon_pos: BTreeMap<i64, usize> = lons.keys().enumerate().map(|(i, &k)| (k, i)).collect();
    let lat_pos: BTreeMap<i64, usize> = lats.keys().rev().enumerate().map(|(j, &k)| (k, j)).collect();
    if points.len() != lons.len() * lats.len() {
        return Err(parse_err(
            source_name,
            0,
            format!(
                "{} points do not form a regular {}x{} grid",
                points.len(),
                lats.len(),
                lons.len()
            ),
        ));
    }

    let mut data = Array2::zeros((lats.len(), lons.len()));
    for (klon, klat, value) in points {
        data[[lat_pos[&klat], lon_pos[&klon]]] = value;
    }
    Ok(SpatialGrid {
        lon: Array1::from_iter(lons.values().copied()),
        lat: Array1::from_iter(lats.values().rev().copied()),
        data,
        epoch,
    })
}

pub fn read_grid(path: &Path) -> MasconResult<SpatialGrid> {
    let contents = std::fs::read_to_string(path)?;
    parse_grid(&contents, &path.display().to_string())
}

pub fn write_grid<W: Write>(grid: &SpatialGrid, out: &mut W) -> MasconResult<()> {
    if let Some(epoch) = grid.epoch {
        writeln!(out, "{EPOCH_TAG} {epoch:.12e}")?;
    }
    for (j, &lat) in grid.lat.iter().enumerate() {
        for (i, &lon) in grid.lon.iter().enumerate() {
            writeln!(out, "{lon:10.4} {lat:10.4} {:+18.10e}", grid.data[[j, i]])?;
        }
    }
    Ok(())
}
