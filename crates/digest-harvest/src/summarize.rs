//! Documentation summarization through an OpenAI-compatible chat API.

use std::time::Duration;

use async_trait::async_trait;
use digest_core::SummarizerSettings;
use thiserror::Error;
use tracing::{error, info, warn};

/// Attempts per summary, counting the first.
pub const MAX_ATTEMPTS: u32 = 5;

/// First wait after a rate-limited request; doubles on each retry.
pub const BACKOFF_BASE: Duration = Duration::from_secs(10);

const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.3;

/// System prompt for the summarizer.
const SYSTEM_PROMPT: &str = "You are a technical documentation expert who creates comprehensive, \
detailed summaries. Your summaries should be thorough, well-structured, and include all important \
technical details, code examples, and specific implementation guidance.";

/// Section outline the summary must follow. The email renderer decorates
/// the first three headings.
const SECTIONS: &str = r#"## 1. Project Overview & Purpose
- What is this project and what problem does it solve?
- Target audience and use cases
- Project history, maturity, and current status
- Key differentiators from similar projects

## 2. Key Features & Capabilities
For each major feature, explain:
- **What it does**: ...
- **Why it's useful**: ...
- **When to use it**: ...
- **Limitations**: ...

## 3. Architecture & Technical Design
- Overall system architecture, design patterns, data flow, technology stack

## 4. Installation & Setup
## 5. Core Components & Modules
## 6. Usage Guide & Examples
## 7. API / CLI Reference
## 8. Configuration & Customization
## 9. Dependencies & Requirements
## 10. Development & Contributing
## 11. Deployment & Production
## 12. Troubleshooting & Common Issues
## 13. Additional Resources"#;

/// Why one summarization request failed.
#[derive(Error, Debug)]
pub enum SummarizerError {
    /// HTTP 429 from the API.
    #[error("rate limited")]
    RateLimited,

    /// API request failed.
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse API response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Turns concatenated documentation into a markdown summary.
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Returns `None` when no summary could be produced.
    async fn summarize(&self, docs_content: &str, repo_key: &str) -> Option<String>;
}

/// Summarizer backed by `POST {base_url}/chat/completions`.
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    settings: SummarizerSettings,
    backoff_base: Duration,
}

impl OpenAiSummarizer {
    pub fn new(settings: SummarizerSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            backoff_base: BACKOFF_BASE,
        }
    }

    /// Overrides the initial rate-limit wait.
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    async fn request(&self, docs_content: &str, repo_key: &str) -> Result<String, SummarizerError> {
        let user_prompt = format!(
            "Create an exhaustive and highly detailed summary of the documentation for the \
             repository '{}'.\n\n\
             Be thorough: include specific technical details, configuration values, command \
             examples, code snippets, version requirements, caveats, and best practices. Use \
             markdown with headers, lists, code blocks, and emphasis.\n\n\
             **Required sections:**\n\n{}\n\n\
             **Documentation Content:**\n{}",
            repo_key, SECTIONS, docs_content
        );

        let request_body = serde_json::json!({
            "model": self.settings.model,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt}
            ]
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SummarizerError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SummarizerError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::RequestFailed(format!("{}: {}", status, body)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SummarizerError::ParseError(e.to_string()))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| SummarizerError::ParseError("No content in response".to_string()))
    }
}

#[async_trait]
impl Summarize for OpenAiSummarizer {
    async fn summarize(&self, docs_content: &str, repo_key: &str) -> Option<String> {
        if docs_content.trim().is_empty() {
            warn!(repo = repo_key, "No content to summarize");
            return None;
        }

        for attempt in 0..MAX_ATTEMPTS {
            match self.request(docs_content, repo_key).await {
                Ok(summary) => {
                    info!(repo = repo_key, chars = summary.len(), "Generated summary");
                    return Some(summary);
                }
                Err(SummarizerError::RateLimited) if attempt + 1 < MAX_ATTEMPTS => {
                    let wait = self.backoff_base * 2u32.pow(attempt);
                    warn!(
                        repo = repo_key,
                        attempt = attempt + 1,
                        max = MAX_ATTEMPTS,
                        wait_secs = wait.as_secs_f64(),
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(SummarizerError::RateLimited) => break,
                Err(e) => {
                    error!(repo = repo_key, error = %e, "Failed to generate summary");
                    return None;
                }
            }
        }

        error!(repo = repo_key, "Max retries reached");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Mock, Server, ServerGuard};

    fn summarizer(base_url: String) -> OpenAiSummarizer {
        OpenAiSummarizer::new(SummarizerSettings {
            api_key: "sk-test".into(),
            model: "gpt-4o-mini".into(),
            base_url,
        })
        .with_backoff_base(Duration::from_millis(1))
    }

    const REPLY: &str = r#"{"choices": [{"message": {"role": "assistant", "content": "Great docs."}}]}"#;

    async fn completions(server: &mut ServerGuard, status: usize, body: &str, hits: usize) -> Mock {
        server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = completions(&mut server, 200, REPLY, 0).await;

        let summary = summarizer(server.url()).summarize("  \n", "a_b").await;

        assert!(summary.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retries_after_rate_limit() {
        let mut server = Server::new_async().await;
        let limited = completions(&mut server, 429, "{}", 2).await;
        let ok = completions(&mut server, 200, REPLY, 1).await;

        let summary = summarizer(server.url()).summarize("docs", "a_b").await;

        assert_eq!(summary.as_deref(), Some("Great docs."));
        limited.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let mut server = Server::new_async().await;
        let failing = completions(&mut server, 500, "oops", 1).await;
        let ok = completions(&mut server, 200, REPLY, 0).await;

        let summary = summarizer(server.url()).summarize("docs", "a_b").await;

        assert!(summary.is_none());
        failing.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut server = Server::new_async().await;
        let limited = completions(&mut server, 429, "{}", MAX_ATTEMPTS as usize).await;

        let summary = summarizer(server.url()).summarize("docs", "a_b").await;

        assert!(summary.is_none());
        limited.assert_async().await;
    }
}
