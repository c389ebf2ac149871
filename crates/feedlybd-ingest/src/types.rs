use serde::{Deserialize, Serialize};

/// Link value used when an item carries neither link text nor an `href`.
pub const UNRESOLVED_LINK: &str = "#";

/// Title used when an item has no `<title>`.
pub const UNTITLED: &str = "No Title";

/// A feed item normalized into the shape every downstream step works on.
///
/// `id` is `"{feed_id}-{ordinal}-{published_at}"`: stable for one feed across
/// re-fetches in the same process, but two feeds emitting the same tuple
/// would collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub feed_id: String,
    pub source_title: String,
    pub title: String,
    /// Absolute link, or [`UNRESOLVED_LINK`].
    pub link: String,
    /// Plain text, at most 200 characters plus an ellipsis.
    pub summary: String,
    /// Original body with markup retained.
    pub raw_content: String,
    /// Epoch milliseconds.
    pub published_at: i64,
    pub author: Option<String>,
    /// Always an absolute `http`/`https` URL when present.
    pub thumbnail_url: Option<String>,
}

impl Article {
    /// Lower-cased `title summary source` text the query engine matches against.
    #[must_use]
    pub fn search_haystack(&self) -> String {
        format!("{} {} {}", self.title, self.summary, self.source_title).to_lowercase()
    }
}
