use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::ScanError;
use crate::model::ScanTarget;
use crate::utils::absolutize;

/// Lists paths, relative to the project root, that differ between two branches.
pub trait VcsQuery {
    fn changed_files(
        &self,
        root: &Path,
        source: &str,
        target: &str,
    ) -> Result<Vec<PathBuf>, ScanError>;
}

/// Shells out to `git diff --name-only <target>...<source>`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new() -> Self {
        Self { program: "git".to_string() }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        GitCli::new()
    }
}

impl VcsQuery for GitCli {
    fn changed_files(
        &self,
        root: &Path,
        source: &str,
        target: &str,
    ) -> Result<Vec<PathBuf>, ScanError> {
        let range = format!("{target}...{source}");
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(root)
            .args(["diff", "--name-only", "-z", &range, "--"])
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                ScanError::ChangeSetResolution(format!("failed to run {}: {}", self.program, err))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("'git diff {range}' exited with status {}", output.status)
            } else {
                format!("'git diff {range}' failed: {}", stderr.trim())
            };
            return Err(ScanError::ChangeSetResolution(message));
        }

        Ok(parse_name_list(&output.stdout))
    }
}

/// Split `git diff -z` output. Names are kept byte for byte.
fn parse_name_list(stdout: &[u8]) -> Vec<PathBuf> {
    stdout.split(|&byte| byte == 0).filter(|name| !name.is_empty()).map(path_from_bytes).collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Resolve a change-set into scan targets under `root`.
///
/// Paths that no longer exist as regular files (deleted on the source
/// branch, or replaced by a directory) are dropped without an outcome.
pub fn resolve_change_set(
    query: &dyn VcsQuery,
    root: &Path,
    source: &str,
    target: &str,
) -> Result<Vec<ScanTarget>, ScanError> {
    let root = absolutize(root);
    let relative = query.changed_files(&root, source, target)?;
    log::info!("{} path(s) differ between {target} and {source}", relative.len());

    let mut targets = Vec::with_capacity(relative.len());
    for path in relative {
        let full = root.join(&path);
        if !full.is_file() {
            log::debug!("Dropping {}: not a regular file in the working tree", full.display());
            continue;
        }
        match ScanTarget::stat(targets.len(), full.clone()) {
            Ok(scan_target) => targets.push(scan_target),
            Err(err) => log::debug!("Dropping {}: {}", full.display(), err),
        }
    }
    Ok(targets)
}
