//! Feed fetching, validation and aggregation.
//!
//! - [`source`] - splitting category sources into URLs
//! - [`parser`] - feed-rs parsing into [`ParsedFeed`]
//! - [`fetcher`] - the [`FeedFetcher`] seam and its HTTP implementation
//! - [`validate`] - strict registration-time checks
//! - [`aggregator`] - lenient fetch-and-merge used for display
//!
//! # Example
//!
//! ```ignore
//! use newsdeck::feed::{fetch_and_merge, HttpFetcher, MAX_ENTRIES};
//!
//! let fetcher = HttpFetcher::new("NewsDeck/1.0", timeout)?;
//! let outcome = fetch_and_merge(&fetcher, "https://a/rss, https://b/rss", MAX_ENTRIES).await?;
//! ```

mod aggregator;
mod fetcher;
mod parser;
mod source;
mod validate;

pub use aggregator::{
    fetch_and_merge, merge_entries, AggregateError, Article, MergeOutcome, SourceFailure,
    MAX_ENTRIES, UNTITLED,
};
pub use fetcher::{FeedFetcher, FetchError, HttpFetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
pub use parser::{parse_feed, ParseError, ParseWarning, ParsedEntry, ParsedFeed};
pub use source::{display_domain, is_amalgamated, join_sources, resolve_sources, SOURCE_DELIMITER};
pub use validate::{validate_source, ValidatedSource, ValidationError, ValidationFailure};
