//! Registration-time feed validation.
//!
//! Stricter than the fetch path: a source is accepted only if every URL
//! has an http(s) scheme, answers within the timeout, parses, has at least
//! one entry and carries channel metadata.

use crate::feed::fetcher::{FeedFetcher, FetchError};
use crate::feed::source::resolve_sources;
use crate::util::validate_url;
use std::time::Duration;
use thiserror::Error;

/// Why a single URL was rejected.
#[derive(Debug, Error)]
pub enum ValidationFailure {
    #[error("URL must start with http:// or https://")]
    MissingScheme,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Feed did not respond within {0}s")]
    Timeout(u64),
    #[error("Could not reach feed: {0}")]
    Unreachable(String),
    #[error("{0}")]
    Malformed(String),
    #[error("Feed contains no entries")]
    NoEntries,
    #[error("Not a valid RSS/Atom feed (no channel information)")]
    MissingFeedMetadata,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No feed URL provided")]
    Empty,
    /// First failing URL. `index` is 1-based; `total` is the number of URLs.
    #[error("{}", describe(.index, .total, .url, .failure))]
    Source {
        index: usize,
        total: usize,
        url: String,
        failure: ValidationFailure,
    },
}

impl ValidationError {
    /// Rejected before any network request was made.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Empty
                | Self::Source {
                    failure: ValidationFailure::MissingScheme | ValidationFailure::InvalidUrl(_),
                    ..
                }
        )
    }
}

fn describe(index: &usize, total: &usize, url: &str, failure: &ValidationFailure) -> String {
    if *total > 1 {
        format!("Source {} ({}): {}", index, url, failure)
    } else {
        failure.to_string()
    }
}

/// An accepted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSource {
    pub urls: Vec<String>,
    /// Entry count per URL, in order.
    pub entry_counts: Vec<usize>,
}

impl ValidatedSource {
    pub fn is_amalgamated(&self) -> bool {
        self.urls.len() > 1
    }

    /// Human-readable summary for confirmation messages.
    pub fn summary(&self) -> String {
        if self.is_amalgamated() {
            format!("{} sources", self.urls.len())
        } else {
            let n = self.entry_counts.first().copied().unwrap_or(0);
            format!("Valid feed ({} entries)", n)
        }
    }
}

/// Check the scheme of every URL without touching the network.
fn check_schemes(urls: &[&str]) -> Result<(), ValidationError> {
    let total = urls.len();
    for (i, url) in urls.iter().enumerate() {
        let lowered = url.to_ascii_lowercase();
        let failure = if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
            Some(ValidationFailure::MissingScheme)
        } else {
            validate_url(url)
                .err()
                .map(|e| ValidationFailure::InvalidUrl(e.to_string()))
        };

        if let Some(failure) = failure {
            return Err(ValidationError::Source {
                index: i + 1,
                total,
                url: (*url).to_owned(),
                failure,
            });
        }
    }
    Ok(())
}

/// Validate a candidate category source.
///
/// URLs are fetched one after another; the first failure wins.
pub async fn validate_source<F: FeedFetcher>(
    fetcher: &F,
    source: &str,
    timeout: Duration,
) -> Result<ValidatedSource, ValidationError> {
    let urls = resolve_sources(source);
    if urls.is_empty() {
        return Err(ValidationError::Empty);
    }

    check_schemes(&urls)?;

    let total = urls.len();
    let mut entry_counts = Vec::with_capacity(total);

    for (i, url) in urls.iter().enumerate() {
        let reject = |failure| ValidationError::Source {
            index: i + 1,
            total,
            url: (*url).to_owned(),
            failure,
        };

        let feed = match tokio::time::timeout(timeout, fetcher.fetch(url)).await {
            Err(_) => return Err(reject(ValidationFailure::Timeout(timeout.as_secs()))),
            Ok(Err(FetchError::Malformed(msg))) => {
                return Err(reject(ValidationFailure::Malformed(msg)))
            }
            Ok(Err(FetchError::Timeout(secs))) => {
                return Err(reject(ValidationFailure::Timeout(secs)))
            }
            Ok(Err(e)) => return Err(reject(ValidationFailure::Unreachable(e.to_string()))),
            Ok(Ok(feed)) => feed,
        };

        if feed.entries.is_empty() {
            return Err(reject(ValidationFailure::NoEntries));
        }
        if !feed.has_channel_metadata {
            return Err(reject(ValidationFailure::MissingFeedMetadata));
        }

        tracing::debug!(url = %url, entries = feed.entries.len(), "Feed validated");
        entry_counts.push(feed.entries.len());
    }

    Ok(ValidatedSource {
        urls: urls.into_iter().map(str::to_owned).collect(),
        entry_counts,
    })
}
