//! Concurrent fetch, merge, and time-window filtering across feeds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveTime, Offset, TimeZone};
use feedlybd_core::{AppConfig, FeedSource};
use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::error::IngestError;
use crate::fetch::RelayClient;
use crate::normalize::Normalizer;
use crate::types::Article;

const DAY_MS: i64 = 86_400_000;

/// Recency filter applied to a merged timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    All,
    /// Published at or after local midnight.
    Today,
    /// Published less than `n` whole days before now.
    LastDays(u32),
}

#[derive(Debug, Error)]
#[error("unknown time window {0:?}: expected all, today, 7days, 30days, or <n>d")]
pub struct ParseTimeWindowError(String);

impl FromStr for TimeWindow {
    type Err = ParseTimeWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "all" => return Ok(Self::All),
            "today" => return Ok(Self::Today),
            _ => {}
        }
        value
            .strip_suffix("days")
            .or_else(|| value.strip_suffix('d'))
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(Self::LastDays)
            .ok_or_else(|| ParseTimeWindowError(s.to_string()))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Today => write!(f, "today"),
            Self::LastDays(n) => write!(f, "{n}days"),
        }
    }
}

impl TimeWindow {
    /// Whether an article published at `published_at` (epoch ms) falls in the
    /// window as seen at `now`.
    #[must_use]
    pub fn contains<Tz: TimeZone>(&self, published_at: i64, now: &DateTime<Tz>) -> bool {
        match self {
            Self::All => true,
            Self::Today => published_at >= start_of_day_ms(now),
            Self::LastDays(n) => {
                now.timestamp_millis() - published_at < i64::from(*n) * DAY_MS
            }
        }
    }
}

/// Epoch milliseconds of midnight on `now`'s calendar day in its own zone.
fn start_of_day_ms<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.timestamp_millis(),
        // Midnight skipped by a DST jump; use the current offset instead.
        None => {
            let offset_ms = i64::from(now.offset().fix().local_minus_utc()) * 1_000;
            midnight.and_utc().timestamp_millis() - offset_ms
        }
    }
}

/// Keep the articles inside `window` as seen at `now`, preserving order.
#[must_use]
pub fn apply_window<Tz: TimeZone>(
    articles: Vec<Article>,
    window: TimeWindow,
    now: &DateTime<Tz>,
) -> Vec<Article> {
    if window == TimeWindow::All {
        return articles;
    }
    articles
        .into_iter()
        .filter(|article| window.contains(article.published_at, now))
        .collect()
}

/// Concatenate per-source batches in source order, then stable-sort newest
/// first. Equal timestamps keep their concatenation order.
#[must_use]
pub fn merge_sorted(batches: Vec<Vec<Article>>) -> Vec<Article> {
    let mut merged: Vec<Article> = batches.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    merged
}

/// Runs fetch and normalize across many feeds and merges the results.
#[derive(Debug, Clone)]
pub struct Aggregator {
    client: RelayClient,
    normalizer: Normalizer,
    /// In-flight fetch cap; `0` means one slot per source.
    max_concurrent: usize,
}

impl Aggregator {
    #[must_use]
    pub const fn new(client: RelayClient, normalizer: Normalizer) -> Self {
        Self {
            client,
            normalizer,
            max_concurrent: 0,
        }
    }

    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the relay client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        Ok(Self::new(
            RelayClient::from_config(config)?,
            Normalizer::from_config(config),
        )
        .with_max_concurrent(config.max_concurrent_feeds))
    }

    #[must_use]
    pub const fn client(&self) -> &RelayClient {
        &self.client
    }

    #[must_use]
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Fetch every source, merge newest first, and filter by `window` using
    /// the local clock.
    ///
    /// Sources that fail to fetch or parse contribute nothing; the pass
    /// always completes.
    pub async fn aggregate(&self, sources: &[FeedSource], window: TimeWindow) -> Vec<Article> {
        let merged = self.collect(sources).await;
        apply_window(merged, window, &Local::now())
    }

    /// Fetch and merge every source without a window filter.
    pub async fn collect(&self, sources: &[FeedSource]) -> Vec<Article> {
        let limit = if self.max_concurrent == 0 {
            sources.len().max(1)
        } else {
            self.max_concurrent
        };

        // `buffered` yields in input order regardless of completion order.
        let batches: Vec<Vec<Article>> = stream::iter(sources)
            .map(|source| self.fetch_source(source))
            .buffered(limit)
            .collect()
            .await;

        let contributing = batches.iter().filter(|batch| !batch.is_empty()).count();
        let merged = merge_sorted(batches);
        tracing::debug!(
            sources = sources.len(),
            contributing,
            count = merged.len(),
            "aggregation pass complete"
        );
        merged
    }

    /// Fetch and normalize one source; empty on any failure.
    pub async fn fetch_source(&self, source: &FeedSource) -> Vec<Article> {
        let Some(raw) = self.client.fetch(&source.url).await else {
            return Vec::new();
        };
        let articles = self.normalizer.parse(&raw, &source.id, &source.title);
        if articles.is_empty() {
            tracing::debug!(feed_id = %source.id, url = %source.url, "feed produced no articles");
        }
        articles
    }
}
