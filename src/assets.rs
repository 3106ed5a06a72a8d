//! Resets the output directory before a build and copies the static assets
//! into it afterwards.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names that are never copied out of the static tree.
pub const CACHE_DIRECTORIES: &[&str] = &["__pycache__"];

/// Deletes `dir` and everything in it, then recreates it empty. A missing
/// `dir` is not an error.
pub fn reset_output(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(Error::Clean {
                path: dir.to_owned(),
                err,
            })
        }
    }
    std::fs::create_dir_all(dir).map_err(|err| Error::Clean {
        path: dir.to_owned(),
        err,
    })
}

fn is_ignored(entry: &DirEntry) -> bool {
    // The root is named by the caller; only its contents are filtered.
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || CACHE_DIRECTORIES.contains(&name.as_ref())
}

/// Copies the contents of `src` into `dst`, merging with whatever `dst`
/// already holds and overwriting files of the same name. Hidden entries and
/// cache directories are skipped along with everything below them. Does
/// nothing if `src` doesn't exist. Returns the number of files copied.
pub fn copy_static(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        debug!(dir = %src.display(), "no static directory");
        return Ok(0);
    }

    let mut copied = 0;
    for result in WalkDir::new(src)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry))
    {
        let entry = result?;
        // strip_prefix can't fail: every entry is below `src`.
        let target = match entry.path().strip_prefix(src) {
            Ok(relative) => dst.join(relative),
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|err| Error::Copy {
                path: target.clone(),
                err,
            })?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|err| Error::Copy {
                path: target.clone(),
                err,
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error preparing the output directory or copying assets.
#[derive(Debug, Error)]
pub enum Error {
    /// Returned for I/O problems while cleaning the output directory.
    #[error("Cleaning directory '{}': {err}", path.display())]
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while copying a static file.
    #[error("Copying to '{}': {err}", path.display())]
    Copy { path: PathBuf, err: std::io::Error },

    /// Returned when the static tree can't be walked.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
}
