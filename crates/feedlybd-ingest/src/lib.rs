//! Feed ingestion for feedlybd.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`RelayClient`] fetches raw feed documents through a CORS-style relay.
//! 2. [`Normalizer`] turns RSS, Atom, or JSON-envelope documents into
//!    [`Article`]s.
//! 3. [`Aggregator`] runs both across many feeds concurrently, merges the
//!    results newest first, and applies a [`TimeWindow`].
//! 4. [`search`] filters a timeline with a small boolean query language.
//!
//! Transport and parse failures are absorbed per feed: a broken source
//! contributes nothing and the pass carries on.

pub mod aggregate;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod search;
pub mod text;
pub mod types;

pub use aggregate::{apply_window, merge_sorted, Aggregator, ParseTimeWindowError, TimeWindow};
pub use error::IngestError;
pub use fetch::RelayClient;
pub use normalize::{parse, parse_published, FeedFormat, Normalizer, DEFAULT_SOURCE_TITLE};
pub use search::{search, Combinator, QueryExpression};
pub use text::TitleCleanup;
pub use types::{Article, UNRESOLVED_LINK, UNTITLED};
