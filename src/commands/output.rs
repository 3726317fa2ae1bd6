use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use crate::error::{AppError, ScanError};
use crate::model::FileOutcome;
use crate::report::AggregateReport;
use crate::scanner::ScanObserver;
use crate::utils::display_path;

const PROGRESS_TEMPLATE: &str = "Scanning files {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]";

/// Progress bar on stderr, advanced once per completed file.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    /// `output` is the report file, if any; a report piped through stdout hides the bar.
    pub fn new(quiet: bool, output: Option<&Path>) -> Self {
        let hidden = hide_progress(quiet, output.is_none(), io::stdout().is_terminal());
        let bar = if hidden { ProgressBar::hidden() } else { ProgressBar::new(0) };
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn hide_progress(quiet: bool, report_on_stdout: bool, stdout_is_terminal: bool) -> bool {
    quiet || (report_on_stdout && !stdout_is_terminal)
}

impl ScanObserver for ProgressObserver {
    fn started(&mut self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn completed(&mut self, _outcome: &FileOutcome) {
        self.bar.inc(1);
    }
}

pub fn write_report(report: &AggregateReport, output: Option<&Path>) -> Result<(), AppError> {
    write_document(&serde_json::to_string_pretty(report)?, output)
}

/// Emit `{"error": ...}` in place of a report when no candidates could be produced.
pub fn write_scan_error(err: &ScanError, output: Option<&Path>) -> Result<(), AppError> {
    let document = json!({ "error": err.to_string() });
    write_document(&serde_json::to_string_pretty(&document)?, output)
}

fn write_document(contents: &str, output: Option<&Path>) -> Result<(), AppError> {
    match output {
        Some(path) => {
            fs::write(path, contents)?;
            println!("Results written to {}", display_path(path));
        }
        None => println!("{contents}"),
    }
    Ok(())
}

pub fn finish_scan(
    result: Result<AggregateReport, ScanError>,
    progress: &ProgressObserver,
    output: Option<&Path>,
) -> Result<(), AppError> {
    progress.finish();
    match result {
        Ok(report) => {
            let summary = report.summary();
            log::info!(
                "Scanned {} file(s): {} malicious, {} suspicious, {} clean, {} error(s)",
                summary.total_files,
                summary.malicious_files,
                summary.suspicious_files,
                summary.clean_files,
                summary.error_files
            );
            write_report(&report, output)
        }
        Err(err) => {
            write_scan_error(&err, output)?;
            Err(err.into())
        }
    }
}
