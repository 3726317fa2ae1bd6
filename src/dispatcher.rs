use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::Sender;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::backend::Analyzer;
use crate::eligibility::Eligibility;
use crate::error::{AppError, BackendError};
use crate::gate::AdmissionGate;
use crate::model::{FileOutcome, ScanTarget};

/// Runs one analysis per target under two independent bounds: the worker
/// pool size and the admission gate capacity.
pub struct Dispatcher {
    pool: ThreadPool,
    gate: AdmissionGate,
}

impl Dispatcher {
    pub fn new(workers: usize, gate: AdmissionGate) -> Result<Self, AppError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|index| format!("sheriff-worker-{index}"))
            .build()?;
        Ok(Self { pool, gate })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Produce exactly one outcome per target, in completion order.
    ///
    /// `on_complete` runs on a single collector thread, once per outcome, and
    /// is the only place a progress display should hook in.
    pub fn dispatch<F>(
        &self,
        targets: Vec<ScanTarget>,
        filter: &Eligibility,
        analyzer: &dyn Analyzer,
        mut on_complete: F,
    ) -> Vec<FileOutcome>
    where
        F: FnMut(&FileOutcome) + Send,
    {
        let total = targets.len();
        let (tx, rx) = crossbeam_channel::unbounded::<FileOutcome>();

        thread::scope(|scope| {
            let collector = scope.spawn(move || {
                let mut outcomes = Vec::with_capacity(total);
                for outcome in rx {
                    on_complete(&outcome);
                    outcomes.push(outcome);
                }
                outcomes
            });

            self.fan_out(targets, filter, analyzer, tx);

            collector.join().unwrap_or_else(|payload| panic::resume_unwind(payload))
        })
    }

    fn fan_out(
        &self,
        targets: Vec<ScanTarget>,
        filter: &Eligibility,
        analyzer: &dyn Analyzer,
        tx: Sender<FileOutcome>,
    ) {
        let mut eligible = Vec::with_capacity(targets.len());
        for target in targets {
            match filter.rejection(&target) {
                Some(reason) => {
                    log::debug!("Skipping {}: {}", target.path.display(), reason);
                    let _ = tx.send(FileOutcome::ineligible(&target, reason));
                }
                None => eligible.push(target),
            }
        }

        self.pool.scope(|scope| {
            for target in eligible {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = self.process(&target, analyzer);
                    let _ = tx.send(outcome);
                });
            }
        });
    }

    fn process(&self, target: &ScanTarget, analyzer: &dyn Analyzer) -> FileOutcome {
        let code = match fs::read_to_string(&target.path) {
            Ok(code) => code,
            Err(err) => {
                log::warn!("Failed to read {}: {}", target.path.display(), err);
                return FileOutcome::backend_error(target, BackendError::from(err).to_string());
            }
        };

        let result = {
            let permit = self.gate.acquire();
            log::debug!(
                "Analyzing {} (active requests: {}/{})",
                target.path.display(),
                permit.held_at_grant(),
                self.gate.capacity()
            );
            panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(&code, &target.path)))
        };

        match result {
            Ok(Ok(verdict)) => {
                if verdict.failed {
                    log::warn!(
                        "Degraded verdict for {}: {}",
                        target.path.display(),
                        verdict.reasoning
                    );
                }
                FileOutcome::analyzed(target, verdict)
            }
            Ok(Err(err)) => {
                log::warn!("Error analyzing file {}: {}", target.path.display(), err);
                FileOutcome::backend_error(target, err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("Backend panicked on {}: {}", target.path.display(), message);
                FileOutcome::backend_error(target, format!("Backend panicked: {message}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
