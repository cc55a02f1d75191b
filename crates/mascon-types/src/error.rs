// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MasconError {
    #[error("Invalid harmonic range: lmin={lmin}, lmax={lmax}, mmax={mmax}")]
    InvalidRange { lmin: usize, lmax: usize, mmax: usize },

    #[error(
        "Dimension mismatch for '{name}': have lmax={lmax}, mmax={mmax}, \
         need lmax={required_lmax}, mmax={required_mmax}"
    )]
    DimensionMismatch {
        name: String,
        lmax: usize,
        mmax: usize,
        required_lmax: usize,
        required_mmax: usize,
    },

    #[error("Love numbers unavailable at degree {requested} (safe bound {bound})")]
    UnsupportedDegree { requested: usize, bound: usize },

    #[error("Degree {degree} is beyond the Love number table (max degree {table_lmax})")]
    ExtrapolationRequired { degree: usize, table_lmax: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error in {source_name} line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPZ read error: {0}")]
    NpzRead(#[from] ndarray_npy::ReadNpzError),

    #[error("NPZ write error: {0}")]
    NpzWrite(#[from] ndarray_npy::WriteNpzError),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("Job '{parameter_file}' failed: {source}")]
    JobFailure {
        parameter_file: String,
        #[source]
        source: Box<MasconError>,
    },
}

impl MasconError {
    /// Wrap an error raised while running the job for `parameter_file`.
    pub fn job(parameter_file: impl Into<String>, source: MasconError) -> Self {
        MasconError::JobFailure {
            parameter_file: parameter_file.into(),
            source: Box::new(source),
        }
    }
}

pub type MasconResult<T> = Result<T, MasconError>;
