use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::{DirEntry, WalkDir};

use crate::eligibility::Eligibility;
use crate::error::ScanError;
use crate::model::ScanTarget;
use crate::utils::absolutize;

/// Enumerate candidates under `root`.
///
/// A file root yields itself regardless of extension so that the filter can
/// report why it was skipped. A directory walk only yields files (including
/// symlinks to files) with a supported extension; oversized ones are still
/// yielded.
pub fn enumerate_tree(
    root: &Path,
    recursive: bool,
    filter: &Eligibility,
    exclude: Option<&GlobSet>,
) -> Result<Vec<ScanTarget>, ScanError> {
    let root = absolutize(root);
    if !root.exists() {
        return Err(ScanError::NotFound(root));
    }

    if root.is_file() {
        let target = ScanTarget::stat(0, root.clone()).map_err(|err| {
            log::warn!("Unable to stat {}: {}", root.display(), err);
            ScanError::NotFound(root.clone())
        })?;
        return Ok(vec![target]);
    }

    if !root.is_dir() {
        return Err(ScanError::NotAFileOrDirectory(root));
    }

    let paths = walk_directory(&root, recursive, filter, exclude);
    log::info!("Found {} candidate file(s) under {}", paths.len(), root.display());
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, (path, size))| ScanTarget::new(index, path, size))
        .collect())
}

fn walk_directory(
    root: &Path,
    recursive: bool,
    filter: &Eligibility,
    exclude: Option<&GlobSet>,
) -> Vec<(PathBuf, u64)> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).max_depth(max_depth).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Skipping {:?}: {}", err.path(), err);
                continue;
            }
        };

        let path = entry.path();
        // The root was named explicitly; only its descendants are subject to excludes.
        if entry.depth() > 0 && is_excluded(path, exclude) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            log::debug!("Excluded {}", path.display());
            continue;
        }

        if entry.file_type().is_dir() {
            continue;
        }

        let extension = crate::model::extension_of(path);
        if !filter.supports_extension(&extension) {
            continue;
        }

        match file_size(&entry) {
            Ok(Some(size)) => found.push((path.to_path_buf(), size)),
            Ok(None) => log::debug!("Skipping {}: not a regular file", path.display()),
            Err(err) => log::warn!("Skipping {}: {}", path.display(), err),
        }
    }
    found
}

/// Size of a regular file, following a symlink to its target. Directory
/// symlinks are never descended into, and resolve to `None` here.
fn file_size(entry: &DirEntry) -> io::Result<Option<u64>> {
    let metadata = if entry.path_is_symlink() {
        fs::metadata(entry.path())?
    } else {
        entry.metadata().map_err(io::Error::from)?
    };
    Ok(metadata.is_file().then(|| metadata.len()))
}

fn is_excluded(path: &Path, exclude: Option<&GlobSet>) -> bool {
    match exclude {
        Some(set) => set.is_match(absolutize(path)),
        None => false,
    }
}
