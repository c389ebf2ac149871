//! Relay-backed feed fetcher.

use std::time::Duration;

use feedlybd_core::AppConfig;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::IngestError;

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Fetches feed documents through a CORS-style relay.
///
/// The relay receives the target URL percent-encoded and appended to its
/// base URL. Every fetch is a single unauthenticated `GET` with no retry.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(relay_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            relay_url: relay_url.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        Self::new(
            &config.relay_url,
            config.fetch_timeout_secs,
            &config.user_agent,
        )
    }

    /// Relay URL requested for `feed_url`.
    #[must_use]
    pub fn relay_target(&self, feed_url: &str) -> String {
        format!(
            "{}{}",
            self.relay_url,
            utf8_percent_encode(feed_url, COMPONENT)
        )
    }

    /// Fetch the raw document for `feed_url`, reporting why it failed.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Http`]: network failure, timeout, or unreadable body.
    /// - [`IngestError::UnexpectedStatus`]: the relay answered with a non-2xx status.
    pub async fn try_fetch(&self, feed_url: &str) -> Result<String, IngestError> {
        let target = self.relay_target(feed_url);
        let response = self.client.get(&target).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url: feed_url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch the raw document for `feed_url`, or `None` on any failure.
    ///
    /// Failures are logged and never propagate.
    pub async fn fetch(&self, feed_url: &str) -> Option<String> {
        match self.try_fetch(feed_url).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url = feed_url, error = %e, "feed fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RelayClient {
        RelayClient::new("https://relay.test/?url=", 5, "feedlybd-test").expect("client builds")
    }

    #[test]
    fn relay_target_encodes_like_encode_uri_component() {
        assert_eq!(
            client().relay_target("https://www.prothomalo.com/feed/?a=1&b=two words"),
            "https://relay.test/?url=https%3A%2F%2Fwww.prothomalo.com%2Ffeed%2F%3Fa%3D1%26b%3Dtwo%20words"
        );
    }

    #[test]
    fn relay_target_keeps_unreserved_marks() {
        assert_eq!(
            client().relay_target("a-b_c.d!e~f*g'h(i)j"),
            "https://relay.test/?url=a-b_c.d!e~f*g'h(i)j"
        );
    }

    #[test]
    fn relay_target_encodes_non_ascii_as_utf8() {
        assert_eq!(
            client().relay_target("খবর"),
            "https://relay.test/?url=%E0%A6%96%E0%A6%AC%E0%A6%B0"
        );
    }
}
