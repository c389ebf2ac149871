//! The external summarization service and an HTTP client for it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use feedlybd_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::error::SummaryError;

/// Returned when the service answers successfully but with no text.
pub const FALLBACK_SUMMARY: &str = "সারসংক্ষেপ পাওয়া যায়নি।";

/// Produces a short summary of `text` following `prompt`.
///
/// Implementations must report throttling as [`SummaryError::RateLimited`]
/// so the queue can tell it apart from other failures.
pub trait Summarizer: Send + Sync + 'static {
    fn summarize(
        &self,
        text: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, SummaryError>> + Send;
}

/// JSON-over-HTTP summarizer: `POST {text, prompt}` answered by `{summary}`.
pub struct HttpSummarizer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl fmt::Debug for HttpSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSummarizer")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    #[serde(default)]
    summary: Option<String>,
}

impl HttpSummarizer {
    /// # Errors
    ///
    /// Returns [`SummaryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, api_key: Option<&str>, timeout_secs: u64) -> Result<Self, SummaryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    /// Build from config; `Ok(None)` when no summary endpoint is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, SummaryError> {
        config
            .summary_url
            .as_deref()
            .map(|url| {
                Self::new(
                    url,
                    config.summary_api_key.as_deref(),
                    config.fetch_timeout_secs,
                )
            })
            .transpose()
    }
}

impl Summarizer for HttpSummarizer {
    async fn summarize(&self, text: &str, prompt: &str) -> Result<String, SummaryError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&SummarizeRequest { text, prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SummaryError::RateLimited);
        }
        if !status.is_success() {
            return Err(SummaryError::Failed(format!(
                "summarizer returned status {status}"
            )));
        }

        let body: SummarizeResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::Failed(format!("summarizer response parse error: {e}")))?;

        Ok(body
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_SUMMARY.to_string()))
    }
}
