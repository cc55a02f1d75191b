// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Output Files
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exclusive file creation and all-or-nothing output pairs.

use log::{debug, warn};
use mascon_types::error::{MasconError, MasconResult};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Upper bound on `_N` suffixes tried by [`create_unique`].
const MAX_UNIQUE_ATTEMPTS: usize = 10_000;

fn with_counter(path: &Path, counter: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{counter}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{counter}"),
    };
    path.with_file_name(name)
}

/// Create `path` exclusively; on collision try `stem_1.ext`, `stem_2.ext`, ...
pub fn create_unique(path: &Path) -> MasconResult<(File, PathBuf)> {
    for counter in 0..MAX_UNIQUE_ATTEMPTS {
        let candidate = if counter == 0 {
            path.to_path_buf()
        } else {
            with_counter(path, counter)
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(MasconError::ConfigError(format!(
        "no free file name for {} after {MAX_UNIQUE_ATTEMPTS} attempts",
        path.display()
    )))
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, "tmp")
}

/// Apply unix permission bits; a no-op elsewhere.
pub fn set_mode(path: &Path, mode: u32) -> MasconResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

fn write_temp<F>(target: &Path, mode: u32, write: F) -> MasconResult<PathBuf>
where
    F: FnOnce(File) -> MasconResult<()>,
{
    let temp = temp_path(target);
    let result = File::create(&temp)
        .map_err(MasconError::from)
        .and_then(write)
        .and_then(|_| set_mode(&temp, mode));
    match result {
        Ok(()) => Ok(temp),
        Err(e) => {
            let _ = std::fs::remove_file(&temp);
            Err(e)
        }
    }
}

/// Write two files so that either both land at their targets or neither
/// does. Each writer receives a fresh temporary file next to its target.
pub fn write_pair_atomic<F, G>(
    first: &Path,
    second: &Path,
    mode: u32,
    write_first: F,
    write_second: G,
) -> MasconResult<()>
where
    F: FnOnce(File) -> MasconResult<()>,
    G: FnOnce(File) -> MasconResult<()>,
{
    let temp_first = write_temp(first, mode, write_first)?;
    let temp_second = match write_temp(second, mode, write_second) {
        Ok(t) => t,
        Err(e) => {
            let _ = std::fs::remove_file(&temp_first);
            return Err(e);
        }
    };

    // An existing first target is moved aside so a failed second rename
    // can put it back.
    let backup = sibling_path(first, "bak");
    let had_previous = first.exists();
    if had_previous {
        if let Err(e) = std::fs::rename(first, &backup) {
            let _ = std::fs::remove_file(&temp_first);
            let _ = std::fs::remove_file(&temp_second);
            return Err(e.into());
        }
    }
    let restore = || {
        if had_previous {
            let _ = std::fs::rename(&backup, first);
        }
    };

    if let Err(e) = std::fs::rename(&temp_first, first) {
        let _ = std::fs::remove_file(&temp_first);
        let _ = std::fs::remove_file(&temp_second);
        restore();
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&temp_second, second) {
        warn!(
            "rolling back {} after failed rename of {}",
            first.display(),
            second.display()
        );
        let _ = std::fs::remove_file(first);
        let _ = std::fs::remove_file(&temp_second);
        restore();
        return Err(e.into());
    }
    if had_previous {
        let _ = std::fs::remove_file(&backup);
    }
    debug!("wrote {} and {}", first.display(), second.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_create_unique_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let (_, p0) = create_unique(&path).unwrap();
        let (_, p1) = create_unique(&path).unwrap();
        let (_, p2) = create_unique(&path).unwrap();
        assert_eq!(p0, path);
        assert_eq!(p1, dir.path().join("run_1.log"));
        assert_eq!(p2, dir.path().join("run_2.log"));
    }

    #[test]
    fn test_pair_written() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        write_pair_atomic(
            &a,
            &b,
            0o644,
            |mut f| Ok(f.write_all(b"first")?),
            |mut f| Ok(f.write_all(b"second")?),
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "second");
    }

    #[test]
    fn test_failed_second_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let err = write_pair_atomic(
            &a,
            &b,
            0o644,
            |mut f| Ok(f.write_all(b"first")?),
            |_| Err(MasconError::LinAlg("boom".to_string())),
        );
        assert!(err.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_rename_restores_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "old first").unwrap();
        // A directory at the second target makes its rename fail.
        let b = dir.path().join("b.txt");
        std::fs::create_dir(&b).unwrap();
        std::fs::write(b.join("keep"), "x").unwrap();

        let err = write_pair_atomic(
            &a,
            &b,
            0o644,
            |mut f| Ok(f.write_all(b"new first")?),
            |mut f| Ok(f.write_all(b"new second")?),
        );
        assert!(err.is_err());
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "old first");
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2, "leftovers: {names:?}");
    }

    #[test]
    fn test_rerun_replaces_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "old").unwrap();
        std::fs::write(&b, "old").unwrap();
        write_pair_atomic(
            &a,
            &b,
            0o644,
            |mut f| Ok(f.write_all(b"new a")?),
            |mut f| Ok(f.write_all(b"new b")?),
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "new a");
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "new b");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_applied() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        write_pair_atomic(&a, &b, 0o640, |_| Ok(()), |_| Ok(())).unwrap();
        let mode = std::fs::metadata(&a).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
