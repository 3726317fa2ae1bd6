use std::collections::HashSet;
use std::path::Path;

use crate::config::Config;
use crate::model::ScanTarget;
use crate::utils::format_bytes;

/// Pure predicate over metadata the caller already collected.
#[derive(Debug, Clone)]
pub struct Eligibility {
    max_file_size: u64,
    extensions: HashSet<String>,
}

impl Eligibility {
    pub fn new<I, S>(max_file_size: u64, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { max_file_size, extensions: extensions.into_iter().map(Into::into).collect() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_file_size, config.supported_extensions.iter().cloned())
    }

    pub fn eligible(&self, _path: &Path, size: u64, extension: &str) -> bool {
        self.rejection_for(size, extension).is_none()
    }

    pub fn supports_extension(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Reason the target cannot be analyzed, if any.
    pub fn rejection(&self, target: &ScanTarget) -> Option<String> {
        self.rejection_for(target.size, &target.extension)
    }

    fn rejection_for(&self, size: u64, extension: &str) -> Option<String> {
        if size > self.max_file_size {
            return Some(format!(
                "File too large ({}, max size: {})",
                format_bytes(size),
                format_bytes(self.max_file_size)
            ));
        }
        if !self.supports_extension(extension) {
            return Some(format!("Unsupported file extension: '{extension}'"));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> Eligibility {
        Eligibility::new(1_000_000, [".py", ".js"])
    }

    #[test]
    fn oversized_file_is_rejected() {
        let filter = filter();
        assert!(!filter.eligible(Path::new("big.py"), 2_000_000, ".py"));
        let target = ScanTarget::new(0, "big.py".into(), 2_000_000);
        assert!(filter.rejection(&target).unwrap().starts_with("File too large"));
    }

    #[test]
    fn size_at_limit_is_accepted() {
        assert!(filter().eligible(Path::new("edge.js"), 1_000_000, ".js"));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let filter = filter();
        assert!(filter.eligible(Path::new("a.py"), 10, ".py"));
        assert!(!filter.eligible(Path::new("a.PY"), 10, ".PY"));
        assert!(!filter.eligible(Path::new("README"), 10, ""));
    }
}
