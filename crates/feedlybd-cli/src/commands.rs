//! Command handlers for the CLI.

use anyhow::Context;
use chrono::Local;
use feedlybd_core::{load_feeds, AppConfig, FeedSource, FeedsFile, Selection};
use feedlybd_ingest::text::strip_html;
use feedlybd_ingest::{search, Aggregator, Article, Normalizer, RelayClient, TimeWindow};
use feedlybd_summary::{HttpSummarizer, QueueConfig, SummaryQueue, SummaryRequest, TokioTimer};

use crate::display::print_timeline;

#[derive(Debug)]
pub(crate) struct AggregateOptions {
    pub(crate) folder: Option<String>,
    pub(crate) feed: Option<String>,
    pub(crate) window: TimeWindow,
    pub(crate) query: Option<String>,
    pub(crate) limit: usize,
    pub(crate) json: bool,
}

impl AggregateOptions {
    pub(crate) fn selection(&self) -> Selection {
        match (&self.folder, &self.feed) {
            (Some(folder), _) => Selection::Folder(folder.clone()),
            (None, Some(feed)) => Selection::Feed(feed.clone()),
            (None, None) => Selection::All,
        }
    }
}

/// Fetch one feed through the relay and print its articles.
///
/// # Errors
///
/// Returns an error if the relay request fails. A document that cannot be
/// parsed prints nothing.
pub(crate) async fn run_fetch(
    config: &AppConfig,
    url: &str,
    title: &str,
    feed_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let client = RelayClient::from_config(config)?;
    let raw = client
        .try_fetch(url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?;

    let articles = Normalizer::from_config(config).parse(&raw, feed_id, title);
    if articles.is_empty() {
        tracing::warn!(url, "feed produced no articles");
    }
    print_articles(&articles, json)
}

/// Run one aggregation pass over the configured feeds and print the timeline.
///
/// # Errors
///
/// Returns an error if the feeds file cannot be loaded or the selection
/// matches no feeds. Individual feed failures are logged and skipped.
pub(crate) async fn run_aggregate(
    config: &AppConfig,
    options: &AggregateOptions,
) -> anyhow::Result<()> {
    let feeds = load_feeds(&config.feeds_path)?;
    let selection = options.selection();
    let sources = feeds.sources_for(&selection);
    if sources.is_empty() {
        anyhow::bail!("no feeds match {selection:?}");
    }

    let aggregator = Aggregator::from_config(config)?;
    let mut articles = aggregator.aggregate(&sources, options.window).await;
    if let Some(query) = options.query.as_deref() {
        articles = search(articles, query);
    }
    articles.truncate(options.limit);

    tracing::info!(
        sources = sources.len(),
        count = articles.len(),
        window = %options.window,
        "aggregation finished"
    );
    print_articles(&articles, options.json)
}

/// Fetch a configured feed and summarize the article at `index`.
///
/// # Errors
///
/// Returns an error if no summary endpoint is configured, the feed or index
/// does not exist, or the summarizer fails.
pub(crate) async fn run_summarize(
    config: &AppConfig,
    feed_id: &str,
    index: usize,
    prompt: Option<String>,
) -> anyhow::Result<()> {
    let summarizer =
        HttpSummarizer::from_config(config)?.context("FEEDLYBD_SUMMARY_URL is not set")?;

    let feeds = load_feeds(&config.feeds_path)?;
    let source = feeds
        .feed(feed_id)
        .cloned()
        .with_context(|| format!("feed '{feed_id}' not found"))?;

    let aggregator = Aggregator::from_config(config)?;
    let articles = aggregator
        .aggregate(std::slice::from_ref(&source), TimeWindow::All)
        .await;
    let article = articles.get(index).with_context(|| {
        format!(
            "feed '{feed_id}' returned {} articles; index {index} is out of range",
            articles.len()
        )
    })?;

    let queue = SummaryQueue::spawn(summarizer, TokioTimer, QueueConfig::from_config(config));
    let mut request = SummaryRequest::new(summary_input(article));
    if let Some(prompt) = prompt {
        request = request.with_prompt(prompt);
    }
    let summary = queue.enqueue(request).await?;

    println!("{}", article.title);
    println!("{}", article.link);
    println!();
    println!("{summary}");
    Ok(())
}

/// Print folders with their feeds, then feeds no folder references.
///
/// # Errors
///
/// Returns an error if the feeds file cannot be loaded.
pub(crate) fn run_feeds(config: &AppConfig) -> anyhow::Result<()> {
    let feeds = load_feeds(&config.feeds_path)?;

    for folder in &feeds.folders {
        println!("{} ({})", folder.name, folder.id);
        for source in folder.feed_ids.iter().filter_map(|id| feeds.feed(id)) {
            print_source(source);
        }
    }

    let unfiled = unfiled_sources(&feeds);
    if !unfiled.is_empty() {
        println!("(unfiled)");
        for source in unfiled {
            print_source(source);
        }
    }

    println!(
        "{} feeds in {} folders",
        feeds.feeds.len(),
        feeds.folders.len()
    );
    Ok(())
}

fn print_source(source: &FeedSource) {
    println!("  {:<20} {:<28} {}", source.id, source.title, source.url);
}

fn unfiled_sources(feeds: &FeedsFile) -> Vec<&FeedSource> {
    feeds
        .feeds
        .iter()
        .filter(|source| {
            !feeds
                .folders
                .iter()
                .any(|folder| folder.feed_ids.contains(&source.id))
        })
        .collect()
}

/// Title plus the plain-text body, falling back to the short summary.
fn summary_input(article: &Article) -> String {
    let body = strip_html(&article.raw_content);
    let body = if body.is_empty() {
        article.summary.as_str()
    } else {
        body.as_str()
    };
    format!("{}\n\n{body}", article.title)
}

fn print_articles(articles: &[Article], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
    } else {
        print_timeline(articles, &Local::now());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(folder: Option<&str>, feed: Option<&str>) -> AggregateOptions {
        AggregateOptions {
            folder: folder.map(str::to_string),
            feed: feed.map(str::to_string),
            window: TimeWindow::All,
            query: None,
            limit: 10,
            json: false,
        }
    }

    #[test]
    fn selection_prefers_folder_then_feed() {
        assert_eq!(options(None, None).selection(), Selection::All);
        assert_eq!(
            options(Some("national"), None).selection(),
            Selection::Folder("national".to_string())
        );
        assert_eq!(
            options(None, Some("prothomalo")).selection(),
            Selection::Feed("prothomalo".to_string())
        );
    }

    #[test]
    fn unfiled_sources_excludes_folder_members() {
        let source = |id: &str| FeedSource {
            id: id.to_string(),
            url: format!("https://{id}.test/rss"),
            title: id.to_string(),
        };
        let feeds = FeedsFile {
            feeds: vec![source("a"), source("b"), source("c")],
            folders: vec![feedlybd_core::Folder {
                id: "f".to_string(),
                name: "F".to_string(),
                feed_ids: vec!["b".to_string()],
            }],
        };
        let ids: Vec<&str> = unfiled_sources(&feeds)
            .into_iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn summary_input_prefers_stripped_content() {
        let mut article = Article {
            id: "f-0-1".to_string(),
            feed_id: "f".to_string(),
            source_title: "F".to_string(),
            title: "Headline".to_string(),
            link: "#".to_string(),
            summary: "Short".to_string(),
            raw_content: "<p>Full <b>body</b></p>".to_string(),
            published_at: 1,
            author: None,
            thumbnail_url: None,
        };
        assert_eq!(summary_input(&article), "Headline\n\nFull body");

        article.raw_content.clear();
        assert_eq!(summary_input(&article), "Headline\n\nShort");
    }
}
