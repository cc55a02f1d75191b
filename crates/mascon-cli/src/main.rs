// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — calc-skernel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use mascon_cli::{run_jobs, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    let options = cli.run_options();
    let reports = run_jobs(&cli.parameters, &options, cli.np).context("dispatching jobs")?;

    let failed = reports.iter().filter(|r| !r.success).count();
    for report in &reports {
        info!(
            "{} {} ({:.2?}, {} files)",
            if report.success { "ok    " } else { "FAILED" },
            report.parameter_file.display(),
            report.elapsed,
            report.outputs.len()
        );
    }
    if failed > 0 {
        bail!("{failed} of {} jobs failed", reports.len());
    }
    Ok(())
}
