use serde::Deserialize;

use crate::error::BackendError;
use crate::model::AnalysisVerdict;

#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_malicious: bool,
    malicious_probability: Option<f64>,
    reasoning: String,
    #[serde(default)]
    identified_threats: Vec<String>,
}

/// Turn the model's answer into a verdict, degrading instead of failing.
pub fn parse_verdict(content: &str) -> AnalysisVerdict {
    match try_parse_verdict(content) {
        Ok(verdict) => verdict,
        Err(reason) => {
            log::warn!("Error parsing LLM response: {reason}");
            AnalysisVerdict::degraded(format!("Error parsing LLM response: {reason}"))
        }
    }
}

fn try_parse_verdict(content: &str) -> Result<AnalysisVerdict, String> {
    let raw: RawVerdict = serde_json::from_str(content.trim()).map_err(|err| err.to_string())?;
    let default = if raw.is_malicious { 1.0 } else { 0.0 };
    let probability = raw.malicious_probability.unwrap_or(default);
    if !(0.0..=1.0).contains(&probability) {
        return Err(format!("malicious_probability {probability} is outside [0, 1]"));
    }
    Ok(AnalysisVerdict {
        is_malicious: raw.is_malicious,
        malicious_probability: probability,
        reasoning: raw.reasoning,
        identified_threats: raw.identified_threats,
        failed: false,
    })
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the assistant message out of an OpenAI-style chat completion body.
pub fn completion_content(body: &str) -> Result<String, BackendError> {
    let completion: ChatCompletion =
        serde_json::from_str(body).map_err(|err| BackendError::Envelope(err.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BackendError::Envelope("response contained no message content".to_string()))
}

/// Best-effort message from an error body such as `{"error": {"message": "..."}}`.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value.pointer("/error/message").and_then(|m| m.as_str()).map(String::from)
        })
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}
