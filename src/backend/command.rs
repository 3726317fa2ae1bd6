use std::path::Path;

use super::process::run_with_stdin;
use super::prompt::malicious_code_prompt;
use super::response::parse_verdict;
use super::Analyzer;
use crate::error::BackendError;
use crate::model::AnalysisVerdict;

/// Runs a local program per file: prompt on stdin, JSON verdict on stdout.
///
/// `SHERIFF_FILE` is set to the analyzed path for programs that want it.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl Analyzer for CommandBackend {
    fn analyze(&self, code: &str, path: &Path) -> Result<AnalysisVerdict, BackendError> {
        let prompt = malicious_code_prompt(code, path);
        let envs = [("SHERIFF_FILE", path.display().to_string())];
        let stdout = run_with_stdin(&self.program, &self.args, &envs, prompt.into_bytes())?;
        Ok(parse_verdict(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandBackend {
        CommandBackend::new("sh".to_string(), vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn stdout_becomes_the_verdict() {
        let backend = sh(r#"cat >/dev/null; echo '{"is_malicious": false, "malicious_probability": 0.2, "reasoning": "ok"}'"#);
        let verdict = backend.analyze("print(1)", Path::new("a.py")).unwrap();
        assert!(!verdict.failed);
        assert_eq!(verdict.malicious_probability, 0.2);
    }

    #[test]
    fn analyzed_path_is_exported() {
        let backend = sh(r#"cat >/dev/null; printf '{"is_malicious": false, "reasoning": "%s"}' "$SHERIFF_FILE""#);
        let verdict = backend.analyze("", Path::new("dir/b.py")).unwrap();
        assert_eq!(verdict.reasoning, "dir/b.py");
    }

    #[test]
    fn non_zero_exit_is_a_backend_error() {
        let backend = sh("cat >/dev/null; echo 'quota exceeded' >&2; exit 3");
        let err = backend.analyze("", Path::new("c.py")).unwrap_err();
        assert!(matches!(err, BackendError::Exit { ref detail, .. } if detail == "quota exceeded"));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let backend = CommandBackend::new("sheriff-no-such-program".to_string(), Vec::new());
        assert!(matches!(backend.analyze("", Path::new("d.py")), Err(BackendError::Spawn { .. })));
    }
}
