use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};

use super::Analyzer;
use super::prompt::malicious_code_prompt;
use super::response::{completion_content, error_message, parse_verdict};
use crate::error::BackendError;
use crate::model::AnalysisVerdict;

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatBackend {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl ChatBackend {
    pub fn new(
        base_url: String,
        model: String,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, BackendError> {
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
        Ok(Self { endpoint, model, api_key, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.1,
            "response_format": { "type": "json_object" },
        })
    }
}

impl Analyzer for ChatBackend {
    fn analyze(&self, code: &str, path: &Path) -> Result<AnalysisVerdict, BackendError> {
        let prompt = malicious_code_prompt(code, path);
        let mut request = self.client.post(&self.endpoint).json(&self.request_body(&prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                detail: error_message(&body),
            });
        }
        Ok(parse_verdict(&completion_content(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    fn backend(base_url: &str) -> ChatBackend {
        ChatBackend::new(base_url.to_string(), "coder".to_string(), Some("sk-test".to_string()), 5)
            .unwrap()
    }

    /// Answer one request with `status` and `body`; hands back the raw request.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload).unwrap();
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            head + &String::from_utf8_lossy(&payload)
        });
        (url, handle)
    }

    #[test]
    fn endpoint_joins_base_url() {
        let backend = backend("https://api.example.com/v1/");
        assert_eq!(backend.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn request_body_asks_for_json() {
        let body = backend("http://localhost").request_body("hi");
        assert_eq!(body["model"], "coder");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn successful_completion_becomes_a_verdict() {
        let content =
            r#"{\"is_malicious\": true, \"malicious_probability\": 0.9, \"reasoning\": \"beacon\"}"#;
        let body = format!(r#"{{"choices": [{{"message": {{"content": "{content}"}}}}]}}"#);
        let (url, server) = serve_once("200 OK", &body);

        let verdict = backend(&url).analyze("import socket", Path::new("a.py")).unwrap();
        assert!(verdict.is_malicious);
        assert_eq!(verdict.malicious_probability, 0.9);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains("\"model\":\"coder\""));
    }

    #[test]
    fn error_status_is_a_backend_error() {
        let body = r#"{"error": {"message": "slow down"}}"#;
        let (url, server) = serve_once("429 Too Many Requests", body);

        let err = backend(&url).analyze("x = 1", Path::new("a.py")).unwrap_err();
        assert!(matches!(
            &err,
            BackendError::Status { status: 429, detail, .. } if detail == "slow down"
        ));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_endpoint_is_a_backend_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = backend(&url).analyze("x = 1", Path::new("a.py")).unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
    }
}
