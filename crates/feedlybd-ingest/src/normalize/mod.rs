//! Feed normalization: RSS, Atom, and JSON envelopes into [`Article`]s.

mod date;
mod document;
mod envelope;
mod thumbnail;
mod xml;

use std::fmt;

use feedlybd_core::{AppConfig, RelayMode};

use crate::error::IngestError;
use crate::text::{strip_html, summarize_description, TitleCleanup};
use crate::types::{Article, UNRESOLVED_LINK, UNTITLED};

pub use date::parse_published;
use thumbnail::{resolve_thumbnail, ThumbnailCandidates};

/// Source title used when neither the caller nor the feed provides one.
pub const DEFAULT_SOURCE_TITLE: &str = "News";

/// Spacing between synthesized timestamps of undated items.
const SYNTHETIC_STEP_MS: i64 = 1_000;

/// Document dialect, sniffed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
    JsonEnvelope,
}

impl FeedFormat {
    /// Guess the dialect of `document` without fully parsing it.
    ///
    /// A leading `{` means a JSON envelope. Otherwise the first element name
    /// decides: `feed` is Atom, anything else (including unparseable input)
    /// is treated as RSS and left for the parser to reject.
    #[must_use]
    pub fn sniff(document: &str) -> Self {
        let trimmed = document.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        if trimmed.starts_with('{') {
            return Self::JsonEnvelope;
        }
        match first_element_name(trimmed) {
            Some(name) if name == "feed" || name.ends_with(":feed") => Self::Atom,
            _ => Self::Rss,
        }
    }

    fn extract(self, document: &str) -> Result<ExtractedFeed, IngestError> {
        match self {
            Self::Rss | Self::Atom => xml::extract(document),
            Self::JsonEnvelope => envelope::extract(document),
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rss => write!(f, "rss"),
            Self::Atom => write!(f, "atom"),
            Self::JsonEnvelope => write!(f, "json-envelope"),
        }
    }
}

/// Name of the first element in an XML document, skipping the prolog,
/// comments, and doctype.
fn first_element_name(document: &str) -> Option<&str> {
    let mut rest = document;
    loop {
        let start = rest.find('<')?;
        rest = &rest[start + 1..];
        match rest.chars().next()? {
            '?' | '!' => {}
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                    .unwrap_or(rest.len());
                return Some(&rest[..end]);
            }
        }
    }
}

/// Item fields pulled out of a document before normalization.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawItem {
    pub(crate) title: Option<String>,
    pub(crate) link: Option<String>,
    pub(crate) published: Option<String>,
    /// `description`/`summary`, markup retained.
    pub(crate) description: String,
    /// `content:encoded`/`content`, markup retained.
    pub(crate) content: String,
    pub(crate) author: Option<String>,
    pub(crate) thumbnails: ThumbnailCandidates,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ExtractedFeed {
    pub(crate) title: Option<String>,
    pub(crate) items: Vec<RawItem>,
}

/// Turns raw feed documents into [`Article`]s.
///
/// Parsing never fails: a document that cannot be read yields an empty list
/// and a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    title_cleanup: TitleCleanup,
    expect_envelope: bool,
}

impl Normalizer {
    #[must_use]
    pub const fn new(title_cleanup: TitleCleanup) -> Self {
        Self {
            title_cleanup,
            expect_envelope: false,
        }
    }

    /// Build a normalizer from the title cleanup and relay settings.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let title_cleanup = if config.title_cleanup {
            TitleCleanup::standard().with_dash_suffix(config.title_strip_dash_suffix)
        } else {
            TitleCleanup::disabled().with_dash_suffix(config.title_strip_dash_suffix)
        };
        Self {
            title_cleanup,
            expect_envelope: config.relay_mode == RelayMode::JsonEnvelope,
        }
    }

    #[must_use]
    pub const fn title_cleanup(&self) -> TitleCleanup {
        self.title_cleanup
    }

    /// Parse `raw` into articles attributed to `feed_id`.
    ///
    /// An empty `source_title` falls back to the document's own feed title,
    /// then to [`DEFAULT_SOURCE_TITLE`].
    #[must_use]
    pub fn parse(&self, raw: &str, feed_id: &str, source_title: &str) -> Vec<Article> {
        self.parse_at(raw, feed_id, source_title, chrono::Utc::now().timestamp_millis())
    }

    /// [`Self::parse`] with an explicit clock, in epoch milliseconds, used for
    /// items without a usable date.
    #[must_use]
    pub fn parse_at(&self, raw: &str, feed_id: &str, source_title: &str, now_ms: i64) -> Vec<Article> {
        let format = FeedFormat::sniff(raw);
        if self.expect_envelope && format != FeedFormat::JsonEnvelope {
            tracing::debug!(feed_id, %format, "relay is set to JSON envelopes but returned XML");
        }

        let feed = match format.extract(raw) {
            Ok(feed) => feed,
            Err(e) => {
                tracing::warn!(feed_id, %format, error = %e, "dropping unparseable feed document");
                return Vec::new();
            }
        };

        let source_title = resolve_source_title(source_title, feed.title.as_deref());
        let articles: Vec<Article> = feed
            .items
            .into_iter()
            .enumerate()
            .map(|(ordinal, item)| self.build_article(item, ordinal, feed_id, &source_title, now_ms))
            .collect();

        tracing::debug!(feed_id, %format, count = articles.len(), "normalized feed");
        articles
    }

    fn build_article(
        &self,
        item: RawItem,
        ordinal: usize,
        feed_id: &str,
        source_title: &str,
        now_ms: i64,
    ) -> Article {
        let published_at = item
            .published
            .as_deref()
            .and_then(parse_published)
            .unwrap_or_else(|| synthesized_timestamp(now_ms, ordinal));

        let thumbnail_url = resolve_thumbnail(
            &item.thumbnails,
            &format!("{} {}", item.description, item.content),
        );

        let link = item
            .link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .unwrap_or(UNRESOLVED_LINK)
            .to_string();

        Article {
            id: format!("{feed_id}-{ordinal}-{published_at}"),
            feed_id: feed_id.to_string(),
            source_title: source_title.to_string(),
            title: self.clean_title(item.title.as_deref()),
            link,
            summary: summarize_description(&item.description),
            raw_content: item.content,
            published_at,
            author: item.author,
            thumbnail_url,
        }
    }

    fn clean_title(&self, raw: Option<&str>) -> String {
        let title = strip_html(raw.unwrap_or_default());
        if title.is_empty() {
            return UNTITLED.to_string();
        }
        if !self.title_cleanup.is_enabled() {
            return title;
        }
        let cleaned = self.title_cleanup.apply(&title);
        if cleaned.is_empty() {
            title
        } else {
            cleaned
        }
    }
}

/// Normalize `raw` with title cleanup disabled.
#[must_use]
pub fn parse(raw: &str, feed_id: &str, source_title: &str) -> Vec<Article> {
    Normalizer::default().parse(raw, feed_id, source_title)
}

fn resolve_source_title(caller: &str, from_feed: Option<&str>) -> String {
    let caller = caller.trim();
    if !caller.is_empty() {
        return caller.to_string();
    }
    from_feed
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_SOURCE_TITLE)
        .to_string()
}

fn synthesized_timestamp(now_ms: i64, ordinal: usize) -> i64 {
    let offset = i64::try_from(ordinal).map_or(i64::MAX, |n| n.saturating_mul(SYNTHETIC_STEP_MS));
    now_ms.saturating_sub(offset)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
