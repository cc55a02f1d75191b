// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Mascon Index
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use mascon_types::config::expand_user;
use mascon_types::error::{MasconError, MasconResult};
use std::path::{Path, PathBuf};

/// Mascon harmonic files listed one per line. Blank lines and `#`
/// comments are skipped; a leading `~` expands to `$HOME`.
pub fn parse_mascon_index(contents: &str, source_name: &str) -> MasconResult<Vec<PathBuf>> {
    let files: Vec<PathBuf> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(expand_user)
        .collect();
    if files.is_empty() {
        return Err(MasconError::Parse {
            source_name: source_name.to_string(),
            line: 0,
            message: "mascon index lists no files".to_string(),
        });
    }
    Ok(files)
}

pub fn read_mascon_index(path: &Path) -> MasconResult<Vec<PathBuf>> {
    let contents = std::fs::read_to_string(path)?;
    parse_mascon_index(&contents, &path.display().to_string())
}

/// Mascon name from its file: stem, upper-cased, `_L{lmax}` removed.
pub fn mascon_name(path: &Path, lmax: usize) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.to_uppercase().replace(&format!("_L{lmax}"), "")
}
