use assert_cmd::Command;
use assert_fs::prelude::*;

const STUB_BACKEND: &str = r#"
max_concurrent_requests = 2
workers = 4
supported_extensions = [".py", ".js"]

[backend]
provider = "command"
command = "sh"
args = ["-c", '''
cat >/dev/null
case "$SHERIFF_FILE" in
  *evil*) echo '{"is_malicious": true, "malicious_probability": 0.95, "reasoning": "reverse shell", "identified_threats": ["backdoor"]}' ;;
  *odd*) echo '{"is_malicious": false, "malicious_probability": 0.5, "reasoning": "evaluates remote input"}' ;;
  *garbled*) echo 'I think this file is fine' ;;
  *broken*) echo 'rate limited' >&2; exit 7 ;;
  *) echo '{"is_malicious": false, "malicious_probability": 0.1, "reasoning": "benign"}' ;;
esac
''']
"#;

/// Isolated HOME and config dir, with a config pointing at a shell stub backend.
pub struct Sandbox {
    pub temp: assert_fs::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("config/sheriff/config.toml").write_str(STUB_BACKEND).unwrap();
        temp.child("home").create_dir_all().unwrap();
        Sandbox { temp }
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp.child(path)
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("sheriff").expect("binary exists");
        cmd.env("HOME", self.temp.child("home").path())
            .env("XDG_CONFIG_HOME", self.temp.child("config").path())
            .env_remove("RUST_LOG");
        for key in [
            "LLM_PROVIDER",
            "LLM_API_KEY",
            "LLM_API_URL",
            "LLM_MODEL",
            "MAX_CONCURRENT_REQUESTS",
            "MALICIOUS_THRESHOLD",
            "MAX_FILE_SIZE",
            "SUPPORTED_EXTENSIONS",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }
}

pub fn report_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is a JSON document")
}
