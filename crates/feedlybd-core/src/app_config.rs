use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Production logs go to collectors, so they are written without ANSI colors.
    #[must_use]
    pub fn uses_ansi_logs(self) -> bool {
        self != Environment::Production
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Response shape the configured relay returns.
///
/// `RawXml` relays forward the feed body untouched; `JsonEnvelope` relays
/// (rss2json-style) convert the feed into `{status, feed, items}` JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    RawXml,
    JsonEnvelope,
}

impl std::fmt::Display for RelayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayMode::RawXml => write!(f, "xml"),
            RelayMode::JsonEnvelope => write!(f, "json"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub feeds_path: PathBuf,
    /// Base URL the percent-encoded feed URL is appended to.
    pub relay_url: String,
    pub relay_mode: RelayMode,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on in-flight feed fetches per aggregation pass. `0` means no cap.
    pub max_concurrent_feeds: usize,
    pub title_cleanup: bool,
    pub title_strip_dash_suffix: bool,
    pub summary_url: Option<String>,
    pub summary_api_key: Option<String>,
    pub summary_min_gap_ms: u64,
    pub summary_max_retries: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("feeds_path", &self.feeds_path)
            .field("relay_url", &self.relay_url)
            .field("relay_mode", &self.relay_mode)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_feeds", &self.max_concurrent_feeds)
            .field("title_cleanup", &self.title_cleanup)
            .field("title_strip_dash_suffix", &self.title_strip_dash_suffix)
            .field("summary_url", &self.summary_url)
            .field(
                "summary_api_key",
                &self.summary_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("summary_min_gap_ms", &self.summary_min_gap_ms)
            .field("summary_max_retries", &self.summary_max_retries)
            .finish()
    }
}
