use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use dirs_next as dirs;
use globset::{Glob, GlobSet};
use serde::{Deserialize, Serialize};

use crate::backend::Provider;
use crate::error::AppError;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;
pub const DEFAULT_MALICIOUS_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;
pub const DEFAULT_EXTENSIONS: &str = ".py,.js,.ts,.php,.java,.c,.cpp,.cs,.go,.rb,.pl,.sh,.ps1";
const MAX_DEFAULT_WORKERS: usize = 32;
const REDACTED: &str = "********";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_file_size: u64,
    pub supported_extensions: Vec<String>,
    pub malicious_threshold: f64,
    pub workers: Option<usize>,
    pub max_concurrent_requests: usize,
    pub exclude: Vec<String>,
    pub backend: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            supported_extensions: split_extensions(DEFAULT_EXTENSIONS),
            malicious_threshold: DEFAULT_MALICIOUS_THRESHOLD,
            workers: None,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            exclude: Vec::new(),
            backend: BackendConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub provider: Provider,
    pub model: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Program spawned by the `command` provider.
    pub command: Option<String>,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::DeepSeek,
            model: "deepseek-coder".to_string(),
            api_url: None,
            api_key: None,
            command: None,
            args: Vec::new(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Read the config file only, without environment overrides.
    pub fn load() -> Result<Self, AppError> {
        let path = config_file_path()?;
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Config file, then process environment, then validation.
    pub fn resolve() -> Result<Self, AppError> {
        let mut config = Config::load()?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), AppError> {
        let path = config_file_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = fs::File::create(path)?;
        let contents = toml::to_string_pretty(self)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LLM_PROVIDER") {
            self.backend.provider = Provider::from_str(&value).map_err(AppError::Config)?;
        }
        if let Some(value) = lookup("LLM_API_KEY") {
            self.backend.api_key = Some(value);
        }
        if let Some(value) = lookup("LLM_API_URL") {
            self.backend.api_url = Some(value);
        }
        if let Some(value) = lookup("LLM_MODEL") {
            self.backend.model = value;
        }
        if let Some(value) = lookup("MAX_CONCURRENT_REQUESTS") {
            self.max_concurrent_requests = parse_env("MAX_CONCURRENT_REQUESTS", &value)?;
        }
        if let Some(value) = lookup("MALICIOUS_THRESHOLD") {
            self.malicious_threshold = parse_env("MALICIOUS_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("MAX_FILE_SIZE") {
            self.max_file_size = parse_env("MAX_FILE_SIZE", &value)?;
        }
        if let Some(value) = lookup("SUPPORTED_EXTENSIONS") {
            self.supported_extensions = split_extensions(&value);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.malicious_threshold > 0.0 && self.malicious_threshold <= 1.0) {
            return Err(AppError::config(format!(
                "malicious_threshold must be in (0, 1], got {}",
                self.malicious_threshold
            )));
        }
        if self.max_concurrent_requests == 0 {
            return Err(AppError::config("max_concurrent_requests must be at least 1"));
        }
        if self.workers == Some(0) {
            return Err(AppError::config("workers must be at least 1"));
        }
        if self.supported_extensions.is_empty() {
            return Err(AppError::config("supported_extensions must not be empty"));
        }
        Ok(())
    }

    pub fn worker_bound(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    /// Validate and record an exclude glob. Returns `false` if it was already present.
    pub fn add_exclude_pattern(&mut self, pattern: &str) -> Result<bool, AppError> {
        Glob::new(&expand_home(pattern)?)?;
        if self.exclude.iter().any(|existing| existing == pattern) {
            return Ok(false);
        }
        self.exclude.push(pattern.to_string());
        Ok(true)
    }

    /// TOML rendering safe to print: the API key is masked.
    pub fn to_redacted_toml(&self) -> Result<String, AppError> {
        let mut shown = self.clone();
        if shown.backend.api_key.is_some() {
            shown.backend.api_key = Some(REDACTED.to_string());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }

    pub fn compile_excludes(&self) -> Result<Option<GlobSet>, AppError> {
        if self.exclude.is_empty() {
            return Ok(None);
        }

        let mut builder = globset::GlobSetBuilder::new();
        for pattern in &self.exclude {
            let expanded = expand_home(pattern)?;
            builder.add(Glob::new(&expanded)?);
        }

        Ok(Some(builder.build()?))
    }
}

pub fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
    (cpus + 4).min(MAX_DEFAULT_WORKERS)
}

pub fn split_extensions(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|ext| !ext.is_empty()).map(String::from).collect()
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{key} has an invalid value '{value}'")))
}

pub fn config_file_path() -> Result<PathBuf, AppError> {
    let config_root = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .ok_or_else(|| {
            AppError::config("Unable to determine configuration directory for this platform")
        })?;
    Ok(config_root.join("sheriff").join("config.toml"))
}

pub fn ensure_config_file() -> Result<PathBuf, AppError> {
    let path = config_file_path()?;
    if !path.exists() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let default = Config::default();
        let contents = toml::to_string_pretty(&default)?;
        fs::write(&path, contents)?;
    }
    Ok(path)
}

fn expand_home(value: &str) -> Result<String, AppError> {
    if !value.starts_with('~') {
        return Ok(value.to_string());
    }
    let home_dir = dirs::home_dir().ok_or_else(|| {
        AppError::config("Unable to expand '~' because the home directory is unknown")
    })?;
    if value == "~" {
        Ok(home_dir.display().to_string())
    } else if let Some(stripped) = value.strip_prefix("~/") {
        Ok(home_dir.join(stripped).display().to_string())
    } else {
        Ok(value.to_string())
    }
}
