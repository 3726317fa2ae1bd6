use std::path::PathBuf;

use crate::changeset::GitCli;
use crate::error::AppError;

use super::output::{ProgressObserver, finish_scan};
use super::{CommonOptions, build_scanner};

pub struct ChangesOptions {
    pub project_dir: PathBuf,
    pub source_branch: String,
    pub target_branch: String,
    pub common: CommonOptions,
}

pub fn execute_changes(options: ChangesOptions) -> Result<(), AppError> {
    let scanner = build_scanner(&options.common)?;
    let output = options.common.output.as_deref();
    let mut progress = ProgressObserver::new(options.common.quiet, output);
    let result = scanner.scan_change_set(
        &GitCli::new(),
        &options.project_dir,
        &options.source_branch,
        &options.target_branch,
        &mut progress,
    );
    finish_scan(result, &progress, output)
}
