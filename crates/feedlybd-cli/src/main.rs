mod commands;
mod display;

use clap::{Parser, Subcommand};
use feedlybd_ingest::TimeWindow;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "feedlybd")]
#[command(about = "Fetch, merge, and search Bangladeshi news feeds")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and normalize a single feed URL
    Fetch {
        /// Feed URL (RSS, Atom, or anything the relay understands)
        url: String,

        /// Source title shown on each article
        #[arg(long, default_value = "")]
        title: String,

        /// Feed id used to build article ids
        #[arg(long, default_value = "adhoc")]
        id: String,

        /// Print articles as JSON instead of a timeline
        #[arg(long)]
        json: bool,
    },
    /// Merge configured feeds into one timeline
    Aggregate {
        /// Only feeds in this folder
        #[arg(long, conflicts_with = "feed")]
        folder: Option<String>,

        /// Only this feed
        #[arg(long)]
        feed: Option<String>,

        /// all, today, 7days, 30days, or <n>d
        #[arg(long, default_value = "all")]
        window: TimeWindow,

        /// Search query: "phrase", -exclude, a OR b
        #[arg(long)]
        query: Option<String>,

        /// Maximum number of articles to print
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Print articles as JSON instead of a timeline
        #[arg(long)]
        json: bool,
    },
    /// Summarize one article of a configured feed
    Summarize {
        /// Feed id from the feeds file
        #[arg(long)]
        feed: String,

        /// Position of the article in the feed, newest first
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Instruction sent with the article text
        #[arg(long)]
        prompt: Option<String>,
    },
    /// List configured folders and feeds
    Feeds,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = feedlybd_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.env.uses_ansi_logs())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Fetch {
            url,
            title,
            id,
            json,
        }) => commands::run_fetch(&config, &url, &title, &id, json).await?,
        Some(Commands::Aggregate {
            folder,
            feed,
            window,
            query,
            limit,
            json,
        }) => {
            let options = commands::AggregateOptions {
                folder,
                feed,
                window,
                query,
                limit,
                json,
            };
            commands::run_aggregate(&config, &options).await?;
        }
        Some(Commands::Summarize {
            feed,
            index,
            prompt,
        }) => commands::run_summarize(&config, &feed, index, prompt).await?,
        Some(Commands::Feeds) => commands::run_feeds(&config)?,
        None => println!("feedlybd: run with --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
