//! Feed and folder registry loaded from `config/feeds.yaml`.
//!
//! The registry is read-only input to an aggregation pass: the pipeline never
//! mutates it, and folder membership is resolved into an ordered list of
//! [`FeedSource`]s before fetching starts.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One subscribable feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub id: String,
    pub url: String,
    /// Display title shown as the article's source.
    #[serde(default)]
    pub title: String,
}

/// A named, ordered group of feed references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub feed_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedsFile {
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

/// Which part of the registry an aggregation pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Folder(String),
    Feed(String),
}

impl FeedsFile {
    /// Every feed, in file order.
    #[must_use]
    pub fn all_sources(&self) -> Vec<FeedSource> {
        self.feeds.clone()
    }

    #[must_use]
    pub fn feed(&self, id: &str) -> Option<&FeedSource> {
        self.feeds.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Resolve a selection into the feeds to aggregate.
    ///
    /// Folder members keep the folder's ordering. Unknown folder or feed ids
    /// resolve to an empty list.
    #[must_use]
    pub fn sources_for(&self, selection: &Selection) -> Vec<FeedSource> {
        match selection {
            Selection::All => self.all_sources(),
            Selection::Folder(id) => self
                .folder(id)
                .map(|folder| {
                    folder
                        .feed_ids
                        .iter()
                        .filter_map(|feed_id| self.feed(feed_id).cloned())
                        .collect()
                })
                .unwrap_or_default(),
            Selection::Feed(id) => self.feed(id).cloned().into_iter().collect(),
        }
    }
}

/// Load and validate the feed registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_feeds(path: &Path) -> Result<FeedsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let feeds_file: FeedsFile = serde_yaml::from_str(&content)?;

    validate_feeds(&feeds_file)?;

    Ok(feeds_file)
}

fn validate_feeds(feeds_file: &FeedsFile) -> Result<(), ConfigError> {
    let mut seen_feed_ids = HashSet::new();

    for feed in &feeds_file.feeds {
        if feed.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "feed id must be non-empty".to_string(),
            ));
        }

        if !(feed.url.starts_with("http://") || feed.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "feed '{}' has invalid url '{}'; must be http(s)",
                feed.id, feed.url
            )));
        }

        if !seen_feed_ids.insert(feed.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed id: '{}'",
                feed.id
            )));
        }
    }

    let mut seen_folder_ids = HashSet::new();
    for folder in &feeds_file.folders {
        if !seen_folder_ids.insert(folder.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate folder id: '{}'",
                folder.id
            )));
        }

        if let Some(missing) = folder
            .feed_ids
            .iter()
            .find(|id| !seen_feed_ids.contains(id.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "folder '{}' references unknown feed '{missing}'",
                folder.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "feeds_test.rs"]
mod tests;
