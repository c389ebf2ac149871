use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    /// The summarizer asked the caller to slow down (HTTP 429 or equivalent).
    #[error("summarizer rate limit hit")]
    RateLimited,

    #[error("summarization failed: {0}")]
    Failed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The queue worker has shut down.
    #[error("summary queue is closed")]
    QueueClosed,
}

impl SummaryError {
    /// Whether this failure is a rate limit worth retrying after a pause.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Http(e) => e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS),
            Self::Failed(_) | Self::QueueClosed => false,
        }
    }
}
