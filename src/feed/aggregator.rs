//! Fetch-and-merge for category sources.
//!
//! Every URL of a category is fetched on its own. Entries from all URLs that
//! succeeded are pooled, ordered newest first and truncated. A URL that fails
//! only drops its own contribution; the whole fetch fails only when nothing
//! succeeded.

use crate::feed::fetcher::{FeedFetcher, FetchError};
use crate::feed::parser::ParsedEntry;
use crate::feed::source::{display_domain, resolve_sources};
use crate::util::{html_to_text, strip_control_chars};
use chrono::Utc;
use thiserror::Error;

/// Maximum number of articles kept per category.
pub const MAX_ENTRIES: usize = 100;

/// Title used for entries without one.
pub const UNTITLED: &str = "No Title";

/// One headline ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: Option<String>,
    /// Plain-text summary (markup stripped), possibly empty.
    pub summary: String,
    /// Unix seconds used for ordering.
    pub published: i64,
    /// `published` was substituted with the fetch time.
    pub published_estimated: bool,
    /// Feed URL this article came from.
    pub source_url: String,
    /// Display label for `source_url`, e.g. `bbc.co.uk`.
    pub source_domain: String,
}

/// A URL of a source that could not be fetched.
#[derive(Debug)]
pub struct SourceFailure {
    pub url: String,
    pub error: FetchError,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url, self.error)
    }
}

/// Result of a fetch that produced at least a partial pool.
#[derive(Debug)]
pub struct MergeOutcome {
    /// Articles newest first, at most `max_entries` long.
    pub articles: Vec<Article>,
    /// URLs that failed while others succeeded.
    pub failures: Vec<SourceFailure>,
}

impl MergeOutcome {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No feed URL configured for this category")]
    NoSources,
    #[error("{}", describe_failures(.0))]
    AllFailed(Vec<SourceFailure>),
}

fn describe_failures(failures: &[SourceFailure]) -> String {
    if let [only] = failures {
        return only.error.to_string();
    }
    let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
    format!(
        "All {} sources failed:\n{}",
        failures.len(),
        details.join("\n")
    )
}

/// Fetch every URL of `source` and merge the results.
///
/// URLs are fetched strictly one after another.
///
/// # Errors
///
/// - [`AggregateError::NoSources`] if `source` names no URL
/// - [`AggregateError::AllFailed`] if every URL failed, carrying each reason
pub async fn fetch_and_merge<F: FeedFetcher>(
    fetcher: &F,
    source: &str,
    max_entries: usize,
) -> Result<MergeOutcome, AggregateError> {
    let urls = resolve_sources(source);
    if urls.is_empty() {
        return Err(AggregateError::NoSources);
    }

    let mut batches = Vec::with_capacity(urls.len());
    let mut failures = Vec::new();

    for url in &urls {
        match fetcher.fetch(url).await {
            Ok(feed) => {
                tracing::debug!(url = %url, entries = feed.entries.len(), "Fetched feed");
                batches.push(((*url).to_owned(), feed.entries));
            }
            Err(error) => {
                tracing::debug!(url = %url, error = %error, "Feed fetch failed");
                failures.push(SourceFailure {
                    url: (*url).to_owned(),
                    error,
                });
            }
        }
    }

    if batches.is_empty() {
        return Err(AggregateError::AllFailed(failures));
    }

    if !failures.is_empty() {
        tracing::debug!(
            source = %source,
            failed = failures.len(),
            succeeded = batches.len(),
            "Partial fetch, continuing with successful sources"
        );
    }

    let articles = merge_entries(batches, Utc::now().timestamp(), max_entries);
    Ok(MergeOutcome { articles, failures })
}

/// Pool, order and truncate entries from several feeds.
///
/// Entries without any time field are stamped with `now`, which places them
/// ahead of every dated entry. The sort is stable, so ties keep feed order.
pub fn merge_entries(
    batches: Vec<(String, Vec<ParsedEntry>)>,
    now: i64,
    max_entries: usize,
) -> Vec<Article> {
    let mut pool: Vec<Article> = batches
        .into_iter()
        .flat_map(|(url, entries)| {
            let domain = display_domain(&url);
            entries
                .into_iter()
                .map(move |entry| to_article(entry, &url, &domain, now))
        })
        .collect();

    pool.sort_by(|a, b| b.published.cmp(&a.published));
    pool.truncate(max_entries);
    pool
}

fn to_article(entry: ParsedEntry, url: &str, domain: &str, now: i64) -> Article {
    let (published, published_estimated) = match entry.timestamp() {
        Some(ts) => (ts, false),
        None => (now, true),
    };

    let title = entry
        .title
        .map(|t| strip_control_chars(t.trim()).into_owned())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_owned());

    let summary = entry
        .summary
        .map(|s| html_to_text(&strip_control_chars(&s)))
        .unwrap_or_default();

    Article {
        title,
        link: entry.link,
        summary,
        published,
        published_estimated,
        source_url: url.to_owned(),
        source_domain: domain.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parser::ParsedFeed;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Serves canned feeds keyed by URL; unknown URLs fail.
    struct StubFetcher {
        feeds: HashMap<String, Vec<ParsedEntry>>,
    }

    impl StubFetcher {
        fn new(feeds: &[(&str, Vec<ParsedEntry>)]) -> Self {
            Self {
                feeds: feeds
                    .iter()
                    .map(|(url, entries)| (url.to_string(), entries.clone()))
                    .collect(),
            }
        }
    }

    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError> {
            match self.feeds.get(url) {
                Some(entries) => Ok(ParsedFeed {
                    title: Some("Stub".into()),
                    has_channel_metadata: true,
                    entries: entries.clone(),
                    warnings: Vec::new(),
                }),
                None => Err(FetchError::Malformed(format!("Malformed feed: {}", url))),
            }
        }
    }

    fn dated(title: &str, ts: i64) -> ParsedEntry {
        ParsedEntry {
            title: Some(title.into()),
            link: Some(format!("https://example.com/{}", title)),
            published: Some(ts),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_partial_failure_returns_good_entries() {
        let fetcher = StubFetcher::new(&[(
            "http://good.example/rss",
            vec![dated("a", 3), dated("b", 2), dated("c", 1)],
        )]);

        let outcome = fetch_and_merge(
            &fetcher,
            "http://good.example/rss, http://bad.example/rss",
            MAX_ENTRIES,
        )
        .await
        .unwrap();

        assert_eq!(outcome.articles.len(), 3);
        assert!(outcome.is_partial());
        assert_eq!(outcome.failures[0].url, "http://bad.example/rss");
    }

    #[tokio::test]
    async fn test_all_failed_combines_reasons() {
        let fetcher = StubFetcher::new(&[]);
        let err = fetch_and_merge(
            &fetcher,
            "http://one.example/rss,http://two.example/rss",
            MAX_ENTRIES,
        )
        .await
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("All 2 sources failed"));
        assert!(msg.contains("http://one.example/rss"));
        assert!(msg.contains("http://two.example/rss"));
    }

    #[tokio::test]
    async fn test_single_failure_message_is_plain_reason() {
        let fetcher = StubFetcher::new(&[]);
        let err = fetch_and_merge(&fetcher, "http://one.example/rss", MAX_ENTRIES)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Malformed feed: http://one.example/rss");
    }

    #[tokio::test]
    async fn test_empty_source_is_error() {
        let fetcher = StubFetcher::new(&[]);
        let err = fetch_and_merge(&fetcher, " , ", MAX_ENTRIES)
            .await
            .unwrap_err();
        assert!(matches!(err, AggregateError::NoSources));
    }

    #[tokio::test]
    async fn test_successful_empty_feed_is_ok() {
        let fetcher = StubFetcher::new(&[("http://empty.example/rss", vec![])]);
        let outcome = fetch_and_merge(&fetcher, "http://empty.example/rss", MAX_ENTRIES)
            .await
            .unwrap();
        assert!(outcome.articles.is_empty());
        assert!(!outcome.is_partial());
    }

    #[test]
    fn test_merge_interleaves_by_timestamp() {
        let merged = merge_entries(
            vec![
                ("http://a.example/rss".into(), vec![dated("a1", 50), dated("a2", 10)]),
                ("http://www.b.example/rss".into(), vec![dated("b1", 40), dated("b2", 30)]),
            ],
            1_000,
            MAX_ENTRIES,
        );

        let titles: Vec<&str> = merged.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "b1", "b2", "a2"]);
        assert_eq!(merged[1].source_domain, "b.example");
        assert_eq!(merged[0].source_url, "http://a.example/rss");
    }

    #[test]
    fn test_undated_entry_sorts_first() {
        let undated = ParsedEntry {
            title: Some("undated".into()),
            ..Default::default()
        };
        let merged = merge_entries(
            vec![(
                "http://a.example/rss".into(),
                vec![dated("old", 100), undated, dated("new", 200)],
            )],
            5_000,
            MAX_ENTRIES,
        );

        assert_eq!(merged[0].title, "undated");
        assert_eq!(merged[0].published, 5_000);
        assert!(merged[0].published_estimated);
        assert!(!merged[1].published_estimated);
    }

    #[test]
    fn test_truncates_keeping_newest() {
        let entries: Vec<ParsedEntry> = (0..150).map(|i| dated(&i.to_string(), i)).collect();
        let merged = merge_entries(vec![("http://a.example/rss".into(), entries)], 0, MAX_ENTRIES);

        assert_eq!(merged.len(), MAX_ENTRIES);
        assert_eq!(merged[0].published, 149);
        assert_eq!(merged[MAX_ENTRIES - 1].published, 50);
    }

    #[test]
    fn test_merge_is_deterministic() {
        let batches = || {
            vec![
                ("http://a.example/rss".to_string(), vec![dated("x", 5), dated("y", 5)]),
                ("http://b.example/rss".to_string(), vec![dated("z", 7)]),
            ]
        };
        assert_eq!(merge_entries(batches(), 9, 10), merge_entries(batches(), 9, 10));
    }

    #[test]
    fn test_missing_title_and_markup_summary() {
        let entry = ParsedEntry {
            summary: Some("<p>Hello <b>world</b>. More.</p>".into()),
            published: Some(1),
            ..Default::default()
        };
        let merged = merge_entries(vec![("http://a.example/rss".into(), vec![entry])], 0, 10);
        assert_eq!(merged[0].title, UNTITLED);
        assert_eq!(merged[0].summary, "Hello world. More.");
        assert_eq!(merged[0].link, None);
    }
}
