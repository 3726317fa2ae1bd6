//! Analysis backends. The dispatcher only ever sees [`Analyzer`].

mod chat;
mod command;
mod process;
pub mod prompt;
pub mod response;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::model::AnalysisVerdict;

pub use chat::ChatBackend;
pub use command::CommandBackend;

/// Classifies one file's source text.
///
/// Unparseable model output must come back as a degraded verdict
/// (`failed = true`); `Err` is reserved for failed invocations.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, code: &str, path: &Path) -> Result<AnalysisVerdict, BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    DeepSeek,
    #[serde(alias = "local")]
    Custom,
    Command,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::DeepSeek => "deepseek",
            Provider::Custom => "custom",
            Provider::Command => "command",
        }
    }

    fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("https://api.openai.com/v1"),
            Provider::DeepSeek => Some("https://api.deepseek.com/v1"),
            Provider::Custom | Provider::Command => None,
        }
    }

    fn requires_api_key(&self) -> bool {
        matches!(self, Provider::OpenAi | Provider::DeepSeek)
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "deepseek" => Ok(Provider::DeepSeek),
            "custom" | "local" => Ok(Provider::Custom),
            "command" => Ok(Provider::Command),
            _ => Err(format!("Unknown provider '{s}'")),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The configured backend, chosen once at startup.
#[derive(Debug)]
pub enum Backend {
    Chat(ChatBackend),
    Command(CommandBackend),
}

impl Backend {
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let provider = config.provider;
        match provider {
            Provider::Command => {
                let program = config
                    .command
                    .clone()
                    .ok_or_else(|| BackendError::MissingCommand(provider.to_string()))?;
                Ok(Backend::Command(CommandBackend::new(program, config.args.clone())))
            }
            Provider::OpenAi | Provider::DeepSeek | Provider::Custom => {
                if provider.requires_api_key() && config.api_key.is_none() {
                    return Err(BackendError::MissingApiKey(provider.to_string()));
                }
                let base_url = config
                    .api_url
                    .clone()
                    .or_else(|| provider.default_base_url().map(String::from))
                    .ok_or_else(|| BackendError::MissingApiUrl(provider.to_string()))?;
                log::info!("Using {provider} backend with model {}", config.model);
                Ok(Backend::Chat(ChatBackend::new(
                    base_url,
                    config.model.clone(),
                    config.api_key.clone(),
                    config.timeout_secs,
                )?))
            }
        }
    }
}

impl Analyzer for Backend {
    fn analyze(&self, code: &str, path: &Path) -> Result<AnalysisVerdict, BackendError> {
        match self {
            Backend::Chat(chat) => chat.analyze(code, path),
            Backend::Command(command) => command.analyze(code, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip_through_from_str() {
        for provider in [Provider::OpenAi, Provider::DeepSeek, Provider::Custom, Provider::Command] {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!("LOCAL".parse::<Provider>().unwrap(), Provider::Custom);
        assert!("gemini".parse::<Provider>().is_err());
    }

    #[test]
    fn hosted_providers_need_a_key() {
        let config = BackendConfig { provider: Provider::OpenAi, ..BackendConfig::default() };
        assert!(matches!(Backend::from_config(&config), Err(BackendError::MissingApiKey(_))));
    }

    #[test]
    fn custom_provider_needs_a_url_but_no_key() {
        let config = BackendConfig { provider: Provider::Custom, ..BackendConfig::default() };
        assert!(matches!(Backend::from_config(&config), Err(BackendError::MissingApiUrl(_))));

        let config = BackendConfig {
            provider: Provider::Custom,
            api_url: Some("http://localhost:11434/v1".to_string()),
            ..BackendConfig::default()
        };
        assert!(matches!(Backend::from_config(&config), Ok(Backend::Chat(_))));
    }

    #[test]
    fn command_provider_needs_a_program() {
        let config = BackendConfig { provider: Provider::Command, ..BackendConfig::default() };
        assert!(matches!(Backend::from_config(&config), Err(BackendError::MissingCommand(_))));
    }
}
