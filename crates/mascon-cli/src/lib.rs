// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Job Runner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runs sensitivity kernel jobs, one per parameter file.
//!
//! Each job reads its mascons, solves the joint least-squares problem and
//! writes a harmonics/grid pair per mascon. Jobs never abort each other;
//! every job produces a [`JobReport`].

use clap::Parser;
use log::{error, info};
use mascon_core::kernel::KernelPipeline;
use mascon_core::love::LoveTable;
use mascon_core::ocean::OceanHarmonicsProvider;
use mascon_io::files::{create_unique, set_mode, write_pair_atomic};
use mascon_io::format::{HarmonicReader, KernelWriter};
use mascon_io::mascons::{mascon_name, read_mascon_index};
use mascon_io::mask::read_land_sea_mask;
use mascon_io::naming::{grid_file_name, harmonics_file_name};
use mascon_types::config::{KernelConfig, LoveDataset, ReferenceFrame, RunOptions};
use mascon_types::error::{MasconError, MasconResult};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default permission bits for outputs (rwxrwxr-x).
pub const DEFAULT_MODE: u32 = 0o775;

fn parse_mode(value: &str) -> Result<u32, String> {
    let digits = value.trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|_| format!("'{value}' is not an octal permission mode"))
}

fn parse_love(value: &str) -> Result<LoveDataset, String> {
    let code: u8 = value.parse().map_err(|_| format!("'{value}' is not 0, 1 or 2"))?;
    LoveDataset::from_code(code).map_err(|e| e.to_string())
}

fn parse_reference(value: &str) -> Result<ReferenceFrame, String> {
    value.parse::<ReferenceFrame>().map_err(|e| e.to_string())
}

/// Calculates spatial sensitivity kernels for mascons through a
/// least-squares mascon fit.
#[derive(Parser, Debug)]
#[command(name = "calc-skernel", version, about)]
pub struct Cli {
    /// Parameter files (key/value text or .json)
    #[arg(required = true)]
    pub parameters: Vec<PathBuf>,

    /// Number of parallel jobs (0 runs serially)
    #[arg(short = 'P', long = "np", default_value_t = 0)]
    pub np: usize,

    /// Love number dataset: 0 Han and Wahr, 1 Gegout, 2 Wang et al.
    #[arg(short = 'n', long = "love", default_value = "0", value_parser = parse_love)]
    pub love: LoveDataset,

    /// Reference frame for degree-1 Love numbers (CF, CM, CE)
    #[arg(short = 'r', long = "reference", default_value = "CF", value_parser = parse_reference)]
    pub reference: ReferenceFrame,

    /// Love number table in the column layout of --love
    #[arg(long = "love-file")]
    pub love_file: PathBuf,

    /// Write a run log per job into its output directory
    #[arg(short = 'l', long = "log")]
    pub log: bool,

    /// Permission mode of directories and output files (octal)
    #[arg(short = 'M', long = "mode", default_value = "775", value_parser = parse_mode)]
    pub mode: u32,

    /// env_logger filter, e.g. info or mascon_core=debug
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            love_dataset: self.love,
            reference: self.reference,
            love_file: self.love_file.clone(),
            log: self.log,
            mode: self.mode,
        }
    }
}

/// Outcome of one parameter file.
#[derive(Debug)]
pub struct JobReport {
    pub parameter_file: PathBuf,
    pub success: bool,
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
    pub error: Option<MasconError>,
    pub run_log: Option<PathBuf>,
}

#[derive(Default)]
struct JobProgress {
    config: Option<KernelConfig>,
    outputs: Vec<PathBuf>,
}

fn execute(parameter_file: &Path, options: &RunOptions, progress: &mut JobProgress) -> MasconResult<()> {
    let config = KernelConfig::from_file(parameter_file)?;
    progress.config = Some(config.clone());

    std::fs::create_dir_all(&config.directory)?;
    set_mode(&config.directory, options.mode)?;

    let love = LoveTable::new(&options.love_file, options.love_dataset, options.reference);
    let mask = match (config.mascon_ocean, &config.landmask) {
        (true, Some(path)) => Some(read_land_sea_mask(path)?),
        _ => None,
    };
    let pipeline = KernelPipeline::new(
        &config,
        &love,
        mask.as_ref().map(|m| m as &dyn OceanHarmonicsProvider),
    )?;

    let files = read_mascon_index(&config.mascon_index)?;
    let mascons = files
        .iter()
        .map(|file| {
            let raw = config.data_format.read_harmonics(file)?;
            pipeline.prepare(mascon_name(file, config.lmax), raw)
        })
        .collect::<MasconResult<Vec<_>>>()?;
    info!(
        "{}: {} mascons, LMIN={} LMAX={} MMAX={}",
        parameter_file.display(),
        mascons.len(),
        config.lmin,
        config.lmax,
        config.mmax()
    );

    let run = pipeline.run(&mascons)?;
    for kernel in &run.kernels {
        let clm_path = config.directory.join(harmonics_file_name(&kernel.name, &config));
        let grid_path = config.directory.join(grid_file_name(&kernel.name, &config));
        write_pair_atomic(
            &clm_path,
            &grid_path,
            options.mode,
            |file| config.data_format.write_harmonics(&kernel.harmonics, file),
            |file| config.data_format.write_grid(&kernel.grid, file),
        )?;
        progress.outputs.push(clm_path);
        progress.outputs.push(grid_path);
    }
    Ok(())
}

fn error_chain(err: &MasconError) -> String {
    let mut out = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    out
}

fn write_run_log(
    parameter_file: &Path,
    progress: &JobProgress,
    error: Option<&MasconError>,
    mode: u32,
) -> MasconResult<PathBuf> {
    let directory = match &progress.config {
        Some(config) if config.directory.is_dir() => config.directory.clone(),
        _ => parameter_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let kind = if error.is_some() { "failed_run" } else { "run" };
    let name = format!(
        "calc_skernel_{kind}_{}_PID-{}.log",
        chrono::Local::now().format("%Y-%m-%d"),
        std::process::id()
    );
    let (mut file, path) = create_unique(&directory.join(name))?;

    writeln!(file, "PARAMETER FILE:\n{}\n", parameter_file.display())?;
    if let Some(config) = &progress.config {
        writeln!(file, "PARAMETERS:")?;
        for (key, value) in config.to_parameters() {
            writeln!(file, "{key}: {value}")?;
        }
        writeln!(file)?;
    }
    match error {
        None => {
            writeln!(file, "COMPLETED SUCCESSFULLY")?;
            writeln!(file, "OUTPUT FILES:")?;
            for output in &progress.outputs {
                writeln!(file, "{}", output.display())?;
            }
        }
        Some(err) => {
            writeln!(file, "ERROR:\n{}", error_chain(err))?;
        }
    }
    drop(file);
    set_mode(&path, mode)?;
    Ok(path)
}

/// Run one parameter file to completion.
pub fn run_job(parameter_file: &Path, options: &RunOptions) -> JobReport {
    let started = Instant::now();
    let mut progress = JobProgress::default();
    let error = execute(parameter_file, options, &mut progress)
        .err()
        .map(|e| MasconError::job(parameter_file.display().to_string(), e));
    let elapsed = started.elapsed();

    match &error {
        None => info!(
            "{}: wrote {} files in {:.2?}",
            parameter_file.display(),
            progress.outputs.len(),
            elapsed
        ),
        Some(e) => error!("{}", error_chain(e)),
    }

    let run_log = if options.log {
        match write_run_log(parameter_file, &progress, error.as_ref(), options.mode) {
            Ok(path) => Some(path),
            Err(e) => {
                error!("could not write run log for {}: {e}", parameter_file.display());
                None
            }
        }
    } else {
        None
    };

    JobReport {
        parameter_file: parameter_file.to_path_buf(),
        success: error.is_none(),
        outputs: progress.outputs,
        elapsed,
        error,
        run_log,
    }
}

/// Run every parameter file, on `np` worker threads (0 = serially).
pub fn run_jobs(parameter_files: &[PathBuf], options: &RunOptions, np: usize) -> MasconResult<Vec<JobReport>> {
    if np == 0 {
        return Ok(parameter_files.iter().map(|p| run_job(p, options)).collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(np)
        .build()
        .map_err(|e| MasconError::ConfigError(format!("worker pool: {e}")))?;
    Ok(pool.install(|| {
        parameter_files
            .par_iter()
            .map(|p| run_job(p, options))
            .collect()
    }))
}
