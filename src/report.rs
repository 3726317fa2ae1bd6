use serde::Serialize;

use crate::model::{FileOutcome, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaliciousFile {
    pub file_path: String,
    pub probability: f64,
    pub reasoning: String,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspiciousFile {
    pub file_path: String,
    pub probability: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanFile {
    pub file_path: String,
    /// Backend answer that could not be parsed, if that is why the file landed here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFile {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub malicious_files: usize,
    pub suspicious_files: usize,
    pub clean_files: usize,
    pub error_files: usize,
}

/// Final bucketed result of one scan. Counts are always derived from the buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    malicious: Vec<MaliciousFile>,
    suspicious: Vec<SuspiciousFile>,
    clean: Vec<CleanFile>,
    errors: Vec<ErrorFile>,
    message: Option<String>,
}

impl AggregateReport {
    /// A report for a scan that had nothing to analyze.
    pub fn empty(message: impl Into<String>) -> Self {
        AggregateReport { message: Some(message.into()), ..AggregateReport::default() }
    }

    pub fn summary(&self) -> Summary {
        let malicious_files = self.malicious.len();
        let suspicious_files = self.suspicious.len();
        let clean_files = self.clean.len();
        let error_files = self.errors.len();
        Summary {
            total_files: malicious_files + suspicious_files + clean_files + error_files,
            malicious_files,
            suspicious_files,
            clean_files,
            error_files,
        }
    }

    pub fn malicious(&self) -> &[MaliciousFile] {
        &self.malicious
    }

    pub fn suspicious(&self) -> &[SuspiciousFile] {
        &self.suspicious
    }

    pub fn clean(&self) -> &[CleanFile] {
        &self.clean
    }

    pub fn errors(&self) -> &[ErrorFile] {
        &self.errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    malicious_files: &'a [MaliciousFile],
    suspicious_files: &'a [SuspiciousFile],
    clean_files: &'a [CleanFile],
    error_files: &'a [ErrorFile],
}

impl Serialize for AggregateReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ReportDocument {
            summary: self.summary(),
            message: self.message(),
            malicious_files: &self.malicious,
            suspicious_files: &self.suspicious,
            clean_files: &self.clean,
            error_files: &self.errors,
        }
        .serialize(serializer)
    }
}

/// Reduce outcomes, in any order, to a deterministic report.
///
/// Non-malicious verdicts at or above half the threshold are suspicious.
/// Ties in probability keep enumeration order.
pub fn aggregate(mut outcomes: Vec<FileOutcome>, malicious_threshold: f64) -> AggregateReport {
    outcomes.sort_by_key(|outcome| outcome.index);
    let suspicious_floor = malicious_threshold / 2.0;

    let mut report = AggregateReport::default();
    for FileOutcome { path, outcome, .. } in outcomes {
        let file_path = path.to_string_lossy().into_owned();
        match outcome {
            Outcome::Ineligible { reason } => {
                report.errors.push(ErrorFile { file_path, error: reason });
            }
            Outcome::BackendError { message } => {
                report.errors.push(ErrorFile { file_path, error: message });
            }
            Outcome::Analyzed { verdict } if verdict.is_malicious => {
                report.malicious.push(MaliciousFile {
                    file_path,
                    probability: verdict.malicious_probability,
                    reasoning: verdict.reasoning,
                    threats: verdict.identified_threats,
                });
            }
            Outcome::Analyzed { verdict } if verdict.malicious_probability >= suspicious_floor => {
                report.suspicious.push(SuspiciousFile {
                    file_path,
                    probability: verdict.malicious_probability,
                    reasoning: verdict.reasoning,
                });
            }
            Outcome::Analyzed { verdict } => {
                let degraded = verdict.failed.then_some(verdict.reasoning);
                report.clean.push(CleanFile { file_path, degraded });
            }
        }
    }

    report.malicious.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    report.suspicious.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    report
}
