use std::path::PathBuf;

use crate::error::AppError;

use super::output::{ProgressObserver, finish_scan};
use super::{CommonOptions, build_scanner};

pub struct ProjectOptions {
    pub path: PathBuf,
    pub recursive: bool,
    pub common: CommonOptions,
}

pub fn execute_project(options: ProjectOptions) -> Result<(), AppError> {
    let scanner = build_scanner(&options.common)?;
    let output = options.common.output.as_deref();
    let mut progress = ProgressObserver::new(options.common.quiet, output);
    let result = scanner.scan_path(&options.path, options.recursive, &mut progress);
    finish_scan(result, &progress, output)
}
