// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Load Love Numbers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Load Love number tables (PREM) with linear extrapolation and the
//! degree-1 reference frame correction (Blewitt 2003).

use log::{debug, warn};
use mascon_types::config::{LoveDataset, ReferenceFrame};
use mascon_types::error::{MasconError, MasconResult};
use mascon_types::state::LoveNumbers;
use ndarray::Array1;
use std::path::{Path, PathBuf};

/// Extrapolation is allowed up to this multiple of the tabulated maximum.
const EXTRAPOLATION_LIMIT: usize = 2;

/// Source of hl/kl/ll indexed by degree.
pub trait LoveNumberProvider {
    /// Love numbers for degrees 0..=max_degree.
    fn load(&self, max_degree: usize) -> MasconResult<LoveNumbers>;
}

/// Column layout of a dataset: header lines, column count and the
/// positions of (hl, kl, ll).
struct Layout {
    header: usize,
    columns: usize,
    hl: usize,
    kl: usize,
    ll: usize,
}

fn layout(dataset: LoveDataset) -> Layout {
    match dataset {
        // l hl kl ll
        LoveDataset::HanWahr => Layout { header: 2, columns: 4, hl: 1, kl: 2, ll: 3 },
        // l hl ll kl
        LoveDataset::Gegout => Layout { header: 3, columns: 4, hl: 1, kl: 3, ll: 2 },
        // l hl ll kl nl nk
        LoveDataset::Wang => Layout { header: 1, columns: 6, hl: 1, kl: 3, ll: 2 },
    }
}

fn parse_number(field: &str) -> Option<f64> {
    // Fortran tables write exponents with D.
    field.replace(['D', 'd'], "E").parse::<f64>().ok()
}

/// Parse a table in the column layout of `dataset`.
///
/// Degrees must be contiguous; a table starting at degree 1 gets zeros at
/// degree 0.
pub fn parse_love_table(contents: &str, dataset: LoveDataset, source_name: &str) -> MasconResult<LoveNumbers> {
    let lay = layout(dataset);
    let parse_err = |line: usize, message: String| MasconError::Parse {
        source_name: source_name.to_string(),
        line,
        message,
    };

    let mut hl = Vec::new();
    let mut kl = Vec::new();
    let mut ll = Vec::new();
    for (lineno, line) in contents.lines().enumerate().skip(lay.header) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() || fields[0].starts_with('#') {
            continue;
        }
        if fields.len() < lay.columns {
            return Err(parse_err(
                lineno + 1,
                format!("expected {} columns, found {}", lay.columns, fields.len()),
            ));
        }
        let values: Vec<f64> = fields[..lay.columns]
            .iter()
            .map(|f| parse_number(f))
            .collect::<Option<_>>()
            .ok_or_else(|| parse_err(lineno + 1, format!("invalid number in '{}'", line.trim())))?;

        let degree = values[0];
        if degree < 0.0 || degree.fract() != 0.0 {
            return Err(parse_err(lineno + 1, format!("invalid degree {degree}")));
        }
        let degree = degree as usize;
        if hl.is_empty() && degree == 1 {
            hl.push(0.0);
            kl.push(0.0);
            ll.push(0.0);
        }
        if degree != hl.len() {
            return Err(parse_err(
                lineno + 1,
                format!("expected degree {}, found {degree}", hl.len()),
            ));
        }
        hl.push(values[lay.hl]);
        kl.push(values[lay.kl]);
        ll.push(values[lay.ll]);
    }

    if hl.is_empty() {
        return Err(parse_err(lay.header, "no Love numbers found".to_string()));
    }
    Ok(LoveNumbers {
        hl: Array1::from_vec(hl),
        kl: Array1::from_vec(kl),
        ll: Array1::from_vec(ll),
    })
}

/// Truncate or linearly extend a table to `max_degree`.
///
/// New degrees follow the line through the last two tabulated degrees.
/// Requests past twice the tabulated maximum fail with `UnsupportedDegree`.
pub fn extend_to(love: &LoveNumbers, max_degree: usize) -> MasconResult<LoveNumbers> {
    let table_lmax = love.lmax();
    if max_degree <= table_lmax {
        let n = max_degree + 1;
        return Ok(LoveNumbers {
            hl: love.hl.slice(ndarray::s![..n]).to_owned(),
            kl: love.kl.slice(ndarray::s![..n]).to_owned(),
            ll: love.ll.slice(ndarray::s![..n]).to_owned(),
        });
    }

    let bound = table_lmax * EXTRAPOLATION_LIMIT;
    if table_lmax < 1 || max_degree > bound {
        return Err(MasconError::UnsupportedDegree {
            requested: max_degree,
            bound,
        });
    }
    warn!("extrapolating Love numbers from degree {table_lmax} to {max_degree}");

    let extend = |values: &Array1<f64>| -> Array1<f64> {
        let last = values[table_lmax];
        let slope = last - values[table_lmax - 1];
        Array1::from_shape_fn(max_degree + 1, |l| {
            if l <= table_lmax {
                values[l]
            } else {
                last + slope * (l - table_lmax) as f64
            }
        })
    };
    Ok(LoveNumbers {
        hl: extend(&love.hl),
        kl: extend(&love.kl),
        ll: extend(&love.ll),
    })
}

/// Shift degree-1 Love numbers into `frame`.
///
/// CF: α = (h₁ + 2l₁)/3, CM: α = 1, CE: α = 0; h₁, k₁, l₁ all reduced by α.
pub fn apply_reference_frame(love: &mut LoveNumbers, frame: ReferenceFrame) {
    if love.kl.len() < 2 {
        return;
    }
    let alpha = match frame {
        ReferenceFrame::CF => (love.hl[1] + 2.0 * love.ll[1]) / 3.0,
        ReferenceFrame::CM => 1.0,
        ReferenceFrame::CE => 0.0,
    };
    love.hl[1] -= alpha;
    love.kl[1] -= alpha;
    love.ll[1] -= alpha;
}

/// Love numbers read from a text table.
#[derive(Debug, Clone)]
pub struct LoveTable {
    pub path: PathBuf,
    pub dataset: LoveDataset,
    pub reference: ReferenceFrame,
}

impl LoveTable {
    pub fn new(path: impl AsRef<Path>, dataset: LoveDataset, reference: ReferenceFrame) -> Self {
        LoveTable {
            path: path.as_ref().to_path_buf(),
            dataset,
            reference,
        }
    }
}

impl LoveNumberProvider for LoveTable {
    fn load(&self, max_degree: usize) -> MasconResult<LoveNumbers> {
        let contents = std::fs::read_to_string(&self.path)?;
        let table = parse_love_table(&contents, self.dataset, &self.path.display().to_string())?;
        debug!(
            "read {:?} Love numbers to degree {} from {}",
            self.dataset,
            table.lmax(),
            self.path.display()
        );
        let mut love = extend_to(&table, max_degree)?;
        apply_reference_frame(&mut love, self.reference);
        Ok(love)
    }
}

/// In-memory tables serve as their own provider (already frame-corrected).
impl LoveNumberProvider for LoveNumbers {
    fn load(&self, max_degree: usize) -> MasconResult<LoveNumbers> {
        extend_to(self, max_degree)
    }
}
