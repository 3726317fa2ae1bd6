use std::path::Path;

use globset::GlobSet;

use crate::backend::Analyzer;
use crate::changeset::{VcsQuery, resolve_change_set};
use crate::config::Config;
use crate::discovery::enumerate_tree;
use crate::dispatcher::Dispatcher;
use crate::eligibility::Eligibility;
use crate::error::{AppError, ScanError};
use crate::gate::AdmissionGate;
use crate::model::{FileOutcome, ScanTarget};
use crate::report::{AggregateReport, aggregate};

pub const NO_SUPPORTED_FILES: &str = "No supported files found to scan";
pub const NO_CHANGED_FILES: &str = "No files changed in this merge request";

/// Receives scan progress. Called from a single thread.
pub trait ScanObserver: Send {
    fn started(&mut self, _total: usize) {}
    fn completed(&mut self, _outcome: &FileOutcome) {}
}

impl ScanObserver for () {}

/// Mode-agnostic pipeline: candidates in, report out.
pub struct Scanner {
    filter: Eligibility,
    exclude: Option<GlobSet>,
    malicious_threshold: f64,
    dispatcher: Dispatcher,
    analyzer: Box<dyn Analyzer>,
}

impl Scanner {
    pub fn new(config: &Config, analyzer: Box<dyn Analyzer>) -> Result<Self, AppError> {
        config.validate()?;
        let gate = AdmissionGate::new(config.max_concurrent_requests);
        let dispatcher = Dispatcher::new(config.worker_bound(), gate)?;
        log::debug!(
            "Scanner ready: {} worker(s), {} concurrent request(s)",
            dispatcher.workers(),
            config.max_concurrent_requests
        );
        Ok(Self {
            filter: Eligibility::from_config(config),
            exclude: config.compile_excludes()?,
            malicious_threshold: config.malicious_threshold,
            dispatcher,
            analyzer,
        })
    }

    /// Scan a single file or a directory tree.
    pub fn scan_path<O: ScanObserver>(
        &self,
        root: &Path,
        recursive: bool,
        observer: &mut O,
    ) -> Result<AggregateReport, ScanError> {
        let targets = enumerate_tree(root, recursive, &self.filter, self.exclude.as_ref())?;
        Ok(self.run(targets, NO_SUPPORTED_FILES, observer))
    }

    /// Scan the files changed on `source` since it diverged from `target`.
    pub fn scan_change_set<O: ScanObserver>(
        &self,
        query: &dyn VcsQuery,
        root: &Path,
        source: &str,
        target: &str,
        observer: &mut O,
    ) -> Result<AggregateReport, ScanError> {
        let targets = resolve_change_set(query, root, source, target)?;
        Ok(self.run(targets, NO_CHANGED_FILES, observer))
    }

    fn run<O: ScanObserver>(
        &self,
        targets: Vec<ScanTarget>,
        empty_message: &str,
        observer: &mut O,
    ) -> AggregateReport {
        if targets.is_empty() {
            return AggregateReport::empty(empty_message);
        }

        observer.started(targets.len());
        let outcomes = self.dispatcher.dispatch(
            targets,
            &self.filter,
            self.analyzer.as_ref(),
            |outcome| observer.completed(outcome),
        );
        aggregate(outcomes, self.malicious_threshold)
    }
}
