use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One enumerated file, with the metadata used for eligibility decisions.
///
/// `index` is the position in enumeration order and is used to keep the
/// final report stable when verdicts tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub index: usize,
    pub path: PathBuf,
    pub size: u64,
    pub extension: String,
}

impl ScanTarget {
    pub fn new(index: usize, path: PathBuf, size: u64) -> Self {
        let extension = extension_of(&path);
        ScanTarget { index, path, size, extension }
    }

    /// Stat the path once. Both the filter and the later read rely on this snapshot.
    pub fn stat(index: usize, path: PathBuf) -> io::Result<Self> {
        let size = fs::metadata(&path)?.len();
        Ok(ScanTarget::new(index, path, size))
    }
}

/// Extension including the leading dot (`.py`), or empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisVerdict {
    pub is_malicious: bool,
    pub malicious_probability: f64,
    pub reasoning: String,
    pub identified_threats: Vec<String>,
    /// Set when the backend answered but the answer could not be parsed.
    pub failed: bool,
}

impl AnalysisVerdict {
    pub fn degraded(reason: impl Into<String>) -> Self {
        AnalysisVerdict {
            is_malicious: false,
            malicious_probability: 0.0,
            reasoning: reason.into(),
            identified_threats: Vec::new(),
            failed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ineligible { reason: String },
    BackendError { message: String },
    Analyzed { verdict: AnalysisVerdict },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub index: usize,
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl FileOutcome {
    pub fn ineligible(target: &ScanTarget, reason: impl Into<String>) -> Self {
        FileOutcome {
            index: target.index,
            path: target.path.clone(),
            outcome: Outcome::Ineligible { reason: reason.into() },
        }
    }

    pub fn backend_error(target: &ScanTarget, message: impl Into<String>) -> Self {
        FileOutcome {
            index: target.index,
            path: target.path.clone(),
            outcome: Outcome::BackendError { message: message.into() },
        }
    }

    pub fn analyzed(target: &ScanTarget, verdict: AnalysisVerdict) -> Self {
        FileOutcome {
            index: target.index,
            path: target.path.clone(),
            outcome: Outcome::Analyzed { verdict },
        }
    }
}
