// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{MasconError, MasconResult};
use crate::state::FitMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// On-disk format for mascon inputs and kernel outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    #[serde(rename = "ascii")]
    Ascii,
    #[serde(rename = "npz")]
    Npz,
    #[serde(rename = "netCDF4")]
    NetCdf4,
    #[serde(rename = "HDF5")]
    Hdf5,
}

impl DataFormat {
    /// File suffix used for outputs in this format.
    pub fn suffix(self) -> &'static str {
        match self {
            DataFormat::Ascii => "txt",
            DataFormat::Npz => "npz",
            DataFormat::NetCdf4 => "nc",
            DataFormat::Hdf5 => "H5",
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, DataFormat::Ascii | DataFormat::Npz)
    }
}

impl FromStr for DataFormat {
    type Err = MasconError;

    fn from_str(s: &str) -> MasconResult<Self> {
        match s {
            "ascii" => Ok(DataFormat::Ascii),
            "npz" => Ok(DataFormat::Npz),
            "netCDF4" => Ok(DataFormat::NetCdf4),
            "HDF5" => Ok(DataFormat::Hdf5),
            other => Err(MasconError::ConfigError(format!(
                "unknown DATAFORM '{other}' (expected ascii, npz, netCDF4 or HDF5)"
            ))),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataFormat::Ascii => "ascii",
            DataFormat::Npz => "npz",
            DataFormat::NetCdf4 => "netCDF4",
            DataFormat::Hdf5 => "HDF5",
        };
        f.write_str(name)
    }
}

/// Placement of output grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GridInterval {
    /// Nodes on whole multiples of the spacing: lon -180..180, lat 90..-90. Code 1.
    Corners,
    /// Nodes at cell centres (spacing/2 offsets). Code 2.
    Centers,
}

impl TryFrom<u8> for GridInterval {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(GridInterval::Corners),
            2 => Ok(GridInterval::Centers),
            other => Err(format!("INTERVAL must be 1 or 2, got {other}")),
        }
    }
}

impl From<GridInterval> for u8 {
    fn from(interval: GridInterval) -> u8 {
        match interval {
            GridInterval::Corners => 1,
            GridInterval::Centers => 2,
        }
    }
}

/// Parameters of a single sensitivity-kernel analysis.
/// Maps 1:1 to the keys of a legacy parameter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(rename = "LMIN")]
    pub lmin: usize,
    #[serde(rename = "LMAX")]
    pub lmax: usize,
    /// Maximum order; `None` means MMAX = LMAX.
    #[serde(rename = "MMAX", default)]
    pub mmax: Option<usize>,
    /// Gaussian smoothing radius (km). 0 disables smoothing.
    #[serde(rename = "RAD", default)]
    pub radius_km: f64,
    #[serde(rename = "DATAFORM")]
    pub data_format: DataFormat,
    /// Text file listing one mascon harmonic file per line.
    #[serde(rename = "MASCON_INDEX")]
    pub mascon_index: PathBuf,
    /// Output directory.
    #[serde(rename = "DIRECTORY")]
    pub directory: PathBuf,
    #[serde(rename = "FIT_METHOD")]
    pub fit_method: FitMode,
    /// Redistribute each mascon's mass uniformly over the ocean.
    #[serde(rename = "MASCON_OCEAN", default)]
    pub mascon_ocean: bool,
    #[serde(rename = "LANDMASK", default)]
    pub landmask: Option<PathBuf>,
    /// Output grid spacing (dlon, dlat) in degrees.
    #[serde(rename = "DDEG")]
    pub ddeg: [f64; 2],
    #[serde(rename = "INTERVAL")]
    pub interval: GridInterval,
}

impl KernelConfig {
    /// Effective maximum order.
    pub fn mmax(&self) -> usize {
        self.mmax.unwrap_or(self.lmax)
    }

    /// Load from a JSON file.
    pub fn from_json(path: &Path) -> MasconResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a whitespace separated `NAME VALUE [comment]` parameter file.
    pub fn from_parameter_file(path: &Path) -> MasconResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let parameters = parse_parameters(&contents, &path.display().to_string())?;
        Self::from_parameters(&parameters)
    }

    /// Load from either format, chosen by the `.json` extension.
    pub fn from_file(path: &Path) -> MasconResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(path),
            _ => Self::from_parameter_file(path),
        }
    }

    /// Build from a parsed parameter map.
    pub fn from_parameters(parameters: &BTreeMap<String, String>) -> MasconResult<Self> {
        let get = |key: &str| -> MasconResult<&str> {
            parameters
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| MasconError::ConfigError(format!("missing parameter {key}")))
        };

        let lmin = parse_value::<usize>("LMIN", get("LMIN")?)?;
        let lmax = parse_value::<usize>("LMAX", get("LMAX")?)?;
        let mmax = match parameters.get("MMAX").map(String::as_str) {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("none") => None,
            Some(v) => Some(parse_value::<usize>("MMAX", v)?),
        };
        let radius_km = match parameters.get("RAD") {
            Some(v) => parse_value::<f64>("RAD", v)?,
            None => 0.0,
        };
        let data_format = get("DATAFORM")?.parse::<DataFormat>()?;
        let fit_method = FitMode::from_code(parse_value::<i64>("FIT_METHOD", get("FIT_METHOD")?)?)?;
        let mascon_ocean = matches!(
            parameters.get("MASCON_OCEAN").map(String::as_str),
            Some("Y" | "y" | "true" | "True")
        );
        let landmask = parameters.get("LANDMASK").map(|p| expand_user(p));

        let spacing: Vec<f64> = get("DDEG")?
            .split(',')
            .map(|v| parse_value::<f64>("DDEG", v.trim()))
            .collect::<MasconResult<_>>()?;
        let ddeg = match spacing.as_slice() {
            [d] => [*d, *d],
            [dlon, dlat] => [*dlon, *dlat],
            _ => {
                return Err(MasconError::ConfigError(
                    "DDEG must hold one or two comma-separated values".to_string(),
                ))
            }
        };
        let interval = GridInterval::try_from(parse_value::<u8>("INTERVAL", get("INTERVAL")?)?)
            .map_err(MasconError::ConfigError)?;

        let config = KernelConfig {
            lmin,
            lmax,
            mmax,
            radius_km,
            data_format,
            mascon_index: expand_user(get("MASCON_INDEX")?),
            directory: expand_user(get("DIRECTORY")?),
            fit_method,
            mascon_ocean,
            landmask,
            ddeg,
            interval,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and cross-field requirements.
    pub fn validate(&self) -> MasconResult<()> {
        let mmax = self.mmax();
        if self.lmin > self.lmax || mmax > self.lmax {
            return Err(MasconError::InvalidRange {
                lmin: self.lmin,
                lmax: self.lmax,
                mmax,
            });
        }
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(MasconError::ConfigError(format!(
                "RAD must be finite and >= 0, got {}",
                self.radius_km
            )));
        }
        for d in self.ddeg {
            if !d.is_finite() || d <= 0.0 || d > 180.0 {
                return Err(MasconError::ConfigError(format!(
                    "DDEG must lie in (0, 180], got {d}"
                )));
            }
        }
        if !self.data_format.is_supported() {
            return Err(MasconError::ConfigError(format!(
                "DATAFORM '{}' is not supported by this build (use ascii or npz)",
                self.data_format
            )));
        }
        if self.mascon_ocean && self.landmask.is_none() {
            return Err(MasconError::ConfigError(
                "MASCON_OCEAN requires LANDMASK".to_string(),
            ));
        }
        Ok(())
    }

    /// Parameters as sorted `NAME -> value` pairs, for run logs.
    pub fn to_parameters(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        out.insert("LMIN".into(), self.lmin.to_string());
        out.insert("LMAX".into(), self.lmax.to_string());
        out.insert(
            "MMAX".into(),
            self.mmax.map_or_else(|| "None".to_string(), |m| m.to_string()),
        );
        out.insert("RAD".into(), self.radius_km.to_string());
        out.insert("DATAFORM".into(), self.data_format.to_string());
        out.insert("MASCON_INDEX".into(), self.mascon_index.display().to_string());
        out.insert("DIRECTORY".into(), self.directory.display().to_string());
        let fit = match self.fit_method {
            FitMode::Mass => "1",
            FitMode::Geoid => "2",
        };
        out.insert("FIT_METHOD".into(), fit.to_string());
        out.insert(
            "MASCON_OCEAN".into(),
            if self.mascon_ocean { "Y" } else { "N" }.to_string(),
        );
        if let Some(mask) = &self.landmask {
            out.insert("LANDMASK".into(), mask.display().to_string());
        }
        out.insert("DDEG".into(), format!("{},{}", self.ddeg[0], self.ddeg[1]));
        out.insert("INTERVAL".into(), u8::from(self.interval).to_string());
        out
    }
}

/// Split `NAME VALUE [comment...]` lines into a map.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_parameters(contents: &str, source_name: &str) -> MasconResult<BTreeMap<String, String>> {
    let mut parameters = BTreeMap::new();
    for (lineno, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            return Err(MasconError::Parse {
                source_name: source_name.to_string(),
                line: lineno + 1,
                message: format!("expected NAME VALUE, got '{trimmed}'"),
            });
        };
        parameters.insert(key.to_string(), value.to_string());
    }
    Ok(parameters)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> MasconResult<T> {
    value
        .parse::<T>()
        .map_err(|_| MasconError::ConfigError(format!("invalid value '{value}' for {key}")))
}

/// Replace a leading `~` with `$HOME`.
pub fn expand_user(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = std::env::var_os("HOME") {
            let rest = rest.trim_start_matches('/');
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Load Love number dataset (`--love`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoveDataset {
    /// Han and Wahr (1995), PREM. Code 0.
    HanWahr,
    /// Gegout (2005), PREM. Code 1.
    Gegout,
    /// Wang et al. (2012), PREM. Code 2.
    Wang,
}

impl LoveDataset {
    pub fn from_code(code: u8) -> MasconResult<Self> {
        match code {
            0 => Ok(LoveDataset::HanWahr),
            1 => Ok(LoveDataset::Gegout),
            2 => Ok(LoveDataset::Wang),
            other => Err(MasconError::ConfigError(format!(
                "Love number dataset must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

/// Reference frame for degree-1 load Love numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// Center of surface figure.
    CF,
    /// Center of mass of the Earth system.
    CM,
    /// Center of mass of the solid Earth.
    CE,
}

impl FromStr for ReferenceFrame {
    type Err = MasconError;

    fn from_str(s: &str) -> MasconResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CF" => Ok(ReferenceFrame::CF),
            "CM" => Ok(ReferenceFrame::CM),
            "CE" => Ok(ReferenceFrame::CE),
            other => Err(MasconError::ConfigError(format!(
                "reference frame must be CF, CM or CE, got {other}"
            ))),
        }
    }
}

/// Job-level options shared by every parameter file of a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub love_dataset: LoveDataset,
    pub reference: ReferenceFrame,
    /// Love number table; the dataset selects its column layout.
    pub love_file: PathBuf,
    /// Write a run log per job into the output directory.
    pub log: bool,
    /// Permission bits applied to output files.
    pub mode: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str = "\
LMIN 1 minimum degree
LMAX 60 maximum degree
MMAX None
RAD 250 gaussian radius (km)
DATAFORM ascii
MASCON_INDEX /data/mascons/index.txt
DIRECTORY /data/out
FIT_METHOD 1
MASCON_OCEAN N
DDEG 0.5,1.0
INTERVAL 2
";

    fn parse(contents: &str) -> MasconResult<KernelConfig> {
        KernelConfig::from_parameters(&parse_parameters(contents, "test")?)
    }

    #[test]
    fn test_parse_parameter_file() {
        let cfg = parse(PARAMS).unwrap();
        assert_eq!(cfg.lmin, 1);
        assert_eq!(cfg.lmax, 60);
        assert_eq!(cfg.mmax, None);
        assert_eq!(cfg.mmax(), 60);
        assert!((cfg.radius_km - 250.0).abs() < 1e-12);
        assert_eq!(cfg.data_format, DataFormat::Ascii);
        assert_eq!(cfg.fit_method, FitMode::Mass);
        assert!(!cfg.mascon_ocean);
        assert_eq!(cfg.ddeg, [0.5, 1.0]);
        assert_eq!(cfg.interval, GridInterval::Centers);
        assert_eq!(cfg.directory, PathBuf::from("/data/out"));
    }

    #[test]
    fn test_single_spacing_applies_to_both_axes() {
        let cfg = parse(&PARAMS.replace("DDEG 0.5,1.0", "DDEG 2.0")).unwrap();
        assert_eq!(cfg.ddeg, [2.0, 2.0]);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let err = parse(&PARAMS.replace("LMIN 1", "LMIN 61")).unwrap_err();
        assert!(matches!(err, MasconError::InvalidRange { lmin: 61, .. }));
        let err = parse(&PARAMS.replace("MMAX None", "MMAX 70")).unwrap_err();
        assert!(matches!(err, MasconError::InvalidRange { mmax: 70, .. }));
    }

    #[test]
    fn test_negative_degree_rejected() {
        assert!(parse(&PARAMS.replace("LMAX 60", "LMAX -1")).is_err());
    }

    #[test]
    fn test_ocean_requires_landmask() {
        let err = parse(&PARAMS.replace("MASCON_OCEAN N", "MASCON_OCEAN Y")).unwrap_err();
        assert!(matches!(err, MasconError::ConfigError(_)));
        let ok = parse(&PARAMS.replace(
            "MASCON_OCEAN N",
            "MASCON_OCEAN Y\nLANDMASK /data/landsea.txt",
        ))
        .unwrap();
        assert!(ok.mascon_ocean);
        assert_eq!(ok.landmask, Some(PathBuf::from("/data/landsea.txt")));
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let err = parse(&PARAMS.replace("DATAFORM ascii", "DATAFORM HDF5")).unwrap_err();
        assert!(matches!(err, MasconError::ConfigError(_)));
    }

    #[test]
    fn test_missing_value_is_parse_error() {
        let err = parse_parameters("LMAX\n", "test").unwrap_err();
        assert!(matches!(err, MasconError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let params = parse_parameters("# header\n\nLMAX 10\n", "test").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params["LMAX"], "10");
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = parse(PARAMS).unwrap();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: KernelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.lmax, cfg2.lmax);
        assert_eq!(cfg.fit_method, cfg2.fit_method);
        assert_eq!(cfg.interval, cfg2.interval);
        assert_eq!(cfg.ddeg, cfg2.ddeg);
    }

    #[test]
    fn test_to_parameters_reparses() {
        let cfg = parse(PARAMS).unwrap();
        let cfg2 = KernelConfig::from_parameters(&cfg.to_parameters()).unwrap();
        assert_eq!(cfg2.lmax, 60);
        assert_eq!(cfg2.mmax, None);
        assert_eq!(cfg2.ddeg, [0.5, 1.0]);
    }

    #[test]
    fn test_reference_frame_parse() {
        assert_eq!("cf".parse::<ReferenceFrame>().unwrap(), ReferenceFrame::CF);
        assert_eq!("CE".parse::<ReferenceFrame>().unwrap(), ReferenceFrame::CE);
        assert!("XY".parse::<ReferenceFrame>().is_err());
    }
}
