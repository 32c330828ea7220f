//! Blocking client for the Generative Language `generateContent` method.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use nlterm_terminal::CompletionBackend;
use nlterm_types::config::RemoteConfig;
use nlterm_types::error::{Result, TermError};

/// Remote backend that sends one prompt per request.
pub struct GeminiBackend {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl GeminiBackend {
    /// Build a backend for `model` under `endpoint`.
    pub fn new(endpoint: &str, model: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TermError::Backend(e.to_string()))?;
        Ok(Self {
            client,
            url: request_url(endpoint, model),
            api_key,
        })
    }

    /// Build a backend from configuration.
    ///
    /// Returns `Ok(None)` when the remote resolver is switched off or no
    /// credential is available, in which case the session runs on the
    /// deterministic rules.
    pub fn from_config(config: &RemoteConfig) -> Result<Option<Self>> {
        if !config.enabled {
            log::info!("remote resolver disabled by configuration");
            return Ok(None);
        }
        let Some(api_key) = config.api_key() else {
            log::info!("{} not set; remote resolver unavailable", config.api_key_env);
            return Ok(None);
        };
        let backend = Self::new(
            &config.endpoint,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Some(backend))
    }
}

impl CompletionBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::new(prompt))
            .send()
            .map_err(|e| TermError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::debug!("gemini error body: {body}");
            return Err(TermError::Rejected(format!("HTTP {status}")));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| TermError::Backend(e.to_string()))?;
        Ok(body.first_text().unwrap_or_default())
    }
}

fn request_url(endpoint: &str, model: &str) -> String {
    format!("{}/{model}:generateContent", endpoint.trim_end_matches('/'))
}

// ----- wire types -----

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn new(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, trimmed.
    fn first_text(&self) -> Option<String> {
        let part = self.candidates.first()?.content.parts.first()?;
        Some(part.text.trim().to_string())
    }
}
