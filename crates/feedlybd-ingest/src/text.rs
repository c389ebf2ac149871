//! Pure string transforms applied to feed text.
//!
//! Each rule is a standalone function so it can be tested in isolation. The
//! title rules are heuristics tuned for news aggregator titles and are not
//! lossless: a legitimate title that happens to match a rule is shortened.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of characters kept in an article summary.
pub const SUMMARY_MAX_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

static PIPE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|.*$").expect("valid pipe suffix regex"));

// Requires whitespace around the dash so hyphenated words ("COVID-19") survive.
static DASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[-–—]\s+.*$").expect("valid dash suffix regex"));

static RELATIVE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+\d+\s+(?:mins?|minutes?|hours?|days?)\s+ago\b")
        .expect("valid relative time regex")
});

static BREAKING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:BREAKING|EXCLUSIVE|JUST IN)\s*:\s*").expect("valid label regex")
});

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid img regex")
});

/// Tags that break a line when rendered. Only these leave a space behind.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre",
    "section", "table", "td", "th", "tr", "ul",
];

/// Strip HTML tags from a string and normalize whitespace.
///
/// Inline tags vanish without a trace so `Bangla<b>desh</b>` stays one word;
/// block-level tags become a single space. An unterminated `<` swallows the
/// rest of the input, matching how browsers treat a dangling tag opener.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag: Option<String> = None;
    for ch in html.chars() {
        match ch {
            '<' if tag.is_none() => tag = Some(String::new()),
            '>' if tag.is_some() => {
                if tag.as_deref().is_some_and(is_block_tag) {
                    out.push(' ');
                }
                tag = None;
            }
            _ => match tag.as_mut() {
                Some(inner) => inner.push(ch),
                None => out.push(ch),
            },
        }
    }
    decode_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_block_tag(inner: &str) -> bool {
    let name: String = inner
        .trim_start_matches('/')
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    BLOCK_TAGS.contains(&name.as_str())
}

/// Decode the handful of HTML entities that survive XML unescaping when a
/// feed double-encodes its description.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Truncate plain text to [`SUMMARY_MAX_CHARS`] characters, appending `...`
/// only when something was cut.
#[must_use]
pub fn truncate_summary(text: &str) -> String {
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.trim().to_string();
    }
    let head: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}

/// Plain-text summary of an item description: tags stripped, then truncated.
#[must_use]
pub fn summarize_description(description: &str) -> String {
    truncate_summary(&strip_html(description))
}

/// `src` of the first `<img>` tag in an HTML fragment.
#[must_use]
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
}

/// Remove a trailing `" | Source"` suffix (everything from the first pipe).
#[must_use]
pub fn strip_pipe_suffix(title: &str) -> String {
    PIPE_SUFFIX.replace(title, "").into_owned()
}

/// Remove a trailing `" - Source"` suffix (everything from the first
/// space-delimited dash). Also cuts titles like "Budget 2024 - What You Need
/// to Know", which is why it is toggled separately.
#[must_use]
pub fn strip_dash_suffix(title: &str) -> String {
    DASH_SUFFIX.replace(title, "").into_owned()
}

/// Remove the first injected `"<n> <unit> ago"` fragment.
#[must_use]
pub fn strip_relative_time(title: &str) -> String {
    RELATIVE_TIME.replace(title, "").into_owned()
}

/// Remove a leading `BREAKING:` / `EXCLUSIVE:` / `JUST IN:` label.
#[must_use]
pub fn strip_breaking_label(title: &str) -> String {
    BREAKING_LABEL.replace(title, "").into_owned()
}

/// Which title cleanup rules to run. Every rule is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TitleCleanup {
    pub pipe_suffix: bool,
    pub dash_suffix: bool,
    pub relative_time: bool,
    pub breaking_label: bool,
}

impl TitleCleanup {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            pipe_suffix: false,
            dash_suffix: false,
            relative_time: false,
            breaking_label: false,
        }
    }

    /// Pipe suffix, relative time, and label rules; the dash rule stays off.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            pipe_suffix: true,
            dash_suffix: false,
            relative_time: true,
            breaking_label: true,
        }
    }

    #[must_use]
    pub const fn with_dash_suffix(mut self, enabled: bool) -> Self {
        self.dash_suffix = enabled;
        self
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.pipe_suffix || self.dash_suffix || self.relative_time || self.breaking_label
    }

    /// Run the enabled rules in order: pipe, dash, relative time, label.
    #[must_use]
    pub fn apply(&self, title: &str) -> String {
        let mut out = title.to_string();
        if self.pipe_suffix {
            out = strip_pipe_suffix(&out);
        }
        if self.dash_suffix {
            out = strip_dash_suffix(&out);
        }
        if self.relative_time {
            out = strip_relative_time(&out);
        }
        if self.breaking_label {
            out = strip_breaking_label(&out);
        }
        out.trim().to_string()
    }
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
