//! Rate-limited summarization for feedlybd articles.
//!
//! [`SummaryQueue`] serializes requests to an external [`Summarizer`] with a
//! fixed minimum gap and a bounded retry on rate limiting. [`SummaryCache`]
//! keeps finished summaries by article id.

pub mod cache;
pub mod error;
pub mod queue;
pub mod summarizer;
pub mod timer;

pub use cache::SummaryCache;
pub use error::SummaryError;
pub use queue::{QueueConfig, SummaryQueue, SummaryRequest, DEFAULT_PROMPT};
pub use summarizer::{HttpSummarizer, Summarizer, FALLBACK_SUMMARY};
pub use timer::{Timer, TokioTimer};
