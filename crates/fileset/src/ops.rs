//! Directory-scoped copy, removal and verification
//!
//! Every operation looks only at entries directly inside the source
//! directory. Subdirectories are never descended into.

use crate::compare::{Checksum, compare};
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Names of all entries directly inside `dir`
fn entry_names(dir: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| Error::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;
        names.push(entry.file_name().to_os_string());
    }
    Ok(names)
}

/// Regular files directly inside `dir` (symlinks to files count)
pub fn regular_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(entry_names(dir)?
        .into_iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .collect())
}

/// Copy every regular file in `src_dir` into `dest_dir`, overwriting.
///
/// Returns the number of files copied. The first failure aborts.
pub fn copy_all(src_dir: &Path, dest_dir: &Path) -> Result<usize> {
    let files = regular_files(src_dir)?;

    fs::create_dir_all(dest_dir).map_err(|source| Error::CreateDir {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    for from in &files {
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = dest_dir.join(name);
        fs::copy(from, &to).map_err(|source| Error::Copy {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        log::debug!("Copied {} -> {}", from.display(), to.display());
    }

    Ok(files.len())
}

/// Remove from `dest_dir` every regular file named like an entry of `src_dir`.
///
/// Files in `dest_dir` that `src_dir` does not name are left alone.
/// Returns the number of files removed.
pub fn delete_all(src_dir: &Path, dest_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for name in entry_names(src_dir)? {
        let target = dest_dir.join(&name);
        if !target.is_file() {
            continue;
        }
        fs::remove_file(&target).map_err(|source| Error::Remove {
            path: target.clone(),
            source,
        })?;
        log::debug!("Removed {}", target.display());
        removed += 1;
    }
    Ok(removed)
}

/// Check that every regular file in `src_dir` exists in `dest_dir` with equal content.
///
/// Fails closed: a listing error, a missing file or a comparison error all
/// yield `false`.
pub fn check_all(src_dir: &Path, dest_dir: &Path, checksum: Checksum) -> bool {
    let files = match regular_files(src_dir) {
        Ok(files) => files,
        Err(e) => {
            log::error!(
                "Check failed for src: {} dest: {}: {}",
                src_dir.display(),
                dest_dir.display(),
                e
            );
            return false;
        }
    };

    files.iter().all(|src| {
        let Some(name) = src.file_name() else {
            return false;
        };
        let dest = dest_dir.join(name);
        if !dest.is_file() {
            log::debug!("Missing {}", dest.display());
            return false;
        }
        match compare(src, &dest, checksum) {
            Ok(result) => result.is_equal(),
            Err(e) => {
                log::error!("Comparison failed: {}", e);
                false
            }
        }
    })
}

/// Check that no regular file of `src_dir` is present in `dest_dir`.
///
/// A listing error yields `false`.
pub fn none_present(src_dir: &Path, dest_dir: &Path) -> bool {
    match regular_files(src_dir) {
        Ok(files) => files
            .iter()
            .filter_map(|src| src.file_name())
            .all(|name| !dest_dir.join(name).is_file()),
        Err(e) => {
            log::error!(
                "Absence check failed for src: {} dest: {}: {}",
                src_dir.display(),
                dest_dir.display(),
                e
            );
            false
        }
    }
}
