//! Boolean and phrase search over a timeline.
//!
//! Query grammar:
//! - `"exact phrase"` must appear verbatim (case-insensitive).
//! - `-term` excludes articles containing `term`.
//! - Bare words are included terms, combined with AND unless the query
//!   contains ` OR ` anywhere, in which case any one of them suffices.
//! - Literal `AND` / `OR` tokens are combinators, never terms.
//!
//! Terms match as substrings of `title summary source_title`, so `port` also
//! matches "report".

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Article;

static PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid phrase regex"));

/// How included terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// A parsed query. Built fresh for each [`search`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryExpression {
    pub phrases: Vec<String>,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
    pub mode: Combinator,
}

impl QueryExpression {
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let phrases: Vec<String> = PHRASE
            .captures_iter(query)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().to_lowercase())
            .collect();
        let remainder = PHRASE.replace_all(query, "");

        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for token in remainder.split_whitespace() {
            if token == "AND" || token == "OR" {
                continue;
            }
            // A bare `-` excludes the empty term, which every article contains.
            if let Some(term) = token.strip_prefix('-') {
                excluded.push(term.to_lowercase());
            } else {
                included.push(token.to_lowercase());
            }
        }

        let mode = if query.contains(" OR ") {
            Combinator::Or
        } else {
            Combinator::And
        };

        Self {
            phrases,
            included,
            excluded,
            mode,
        }
    }

    /// Whether the query places no constraint at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.included.is_empty() && self.excluded.is_empty()
    }

    /// Match against a lower-cased haystack.
    #[must_use]
    pub fn matches_haystack(&self, haystack: &str) -> bool {
        if !self.phrases.iter().all(|p| haystack.contains(p.as_str())) {
            return false;
        }
        if self.excluded.iter().any(|t| haystack.contains(t.as_str())) {
            return false;
        }
        if self.included.is_empty() {
            return true;
        }
        match self.mode {
            Combinator::And => self.included.iter().all(|t| haystack.contains(t.as_str())),
            Combinator::Or => self.included.iter().any(|t| haystack.contains(t.as_str())),
        }
    }

    #[must_use]
    pub fn matches(&self, article: &Article) -> bool {
        self.matches_haystack(&article.search_haystack())
    }
}

/// Filter `articles` by `query`, preserving order.
///
/// An empty or whitespace-only query returns the input unchanged.
#[must_use]
pub fn search(articles: Vec<Article>, query: &str) -> Vec<Article> {
    if query.trim().is_empty() {
        return articles;
    }
    let expression = QueryExpression::parse(query);
    articles
        .into_iter()
        .filter(|article| expression.matches(article))
        .collect()
}
