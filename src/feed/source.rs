//! Category source strings.
//!
//! A category's `source` is one URL, or several joined with commas. Several
//! URLs make an "amalgamated" category whose feeds are merged at fetch time.

use url::Url;

/// Separator between URLs of an amalgamated source.
pub const SOURCE_DELIMITER: char = ',';

/// Split a source string into its candidate URLs.
///
/// Segments are trimmed and empty segments dropped. Order is preserved and
/// duplicates are kept. Only empty or whitespace-only input yields an empty
/// result.
///
/// # Examples
///
/// ```
/// use newsdeck::feed::resolve_sources;
///
/// let urls = resolve_sources("http://a.example/feed, http://b.example/feed");
/// assert_eq!(urls, vec!["http://a.example/feed", "http://b.example/feed"]);
/// assert!(resolve_sources("  ,  ").is_empty());
/// ```
pub fn resolve_sources(source: &str) -> Vec<&str> {
    source
        .split(SOURCE_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// True when the source names more than one URL.
pub fn is_amalgamated(source: &str) -> bool {
    resolve_sources(source).len() > 1
}

/// Join URLs back into a source string.
pub fn join_sources<S: AsRef<str>>(urls: &[S]) -> String {
    urls.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Short domain label shown next to articles of amalgamated categories.
///
/// Scheme and a leading `www.` are stripped and the path is dropped, so
/// `https://www.bbc.co.uk/news/rss.xml` becomes `bbc.co.uk`.
pub fn display_domain(url: &str) -> String {
    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_owned(),
            None => fallback_host(url).to_owned(),
        },
        Err(_) => fallback_host(url).to_owned(),
    };

    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_owned(),
        None => host,
    }
}

fn fallback_host(url: &str) -> &str {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_url() {
        assert_eq!(
            resolve_sources("https://example.com/feed"),
            vec!["https://example.com/feed"]
        );
        assert!(!is_amalgamated("https://example.com/feed"));
    }

    #[test]
    fn test_two_urls_with_whitespace() {
        let urls = resolve_sources("http://a.example/feed, http://b.example/feed");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1], "http://b.example/feed");
        assert!(is_amalgamated("http://a.example/feed, http://b.example/feed"));
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(
            resolve_sources(",http://a.example/feed,, ,"),
            vec!["http://a.example/feed"]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        assert_eq!(resolve_sources("http://a/x,http://a/x").len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_sources("").is_empty());
        assert!(resolve_sources("   ").is_empty());
        assert!(!is_amalgamated(""));
    }

    #[test]
    fn test_join_round_trip() {
        let joined = join_sources(&["http://a/x", "http://b/y"]);
        assert_eq!(joined, "http://a/x, http://b/y");
        assert_eq!(resolve_sources(&joined), vec!["http://a/x", "http://b/y"]);
    }

    #[test]
    fn test_display_domain_strips_www_and_path() {
        assert_eq!(
            display_domain("https://www.bbc.co.uk/news/rss.xml"),
            "bbc.co.uk"
        );
        assert_eq!(display_domain("http://techcrunch.com/feed/"), "techcrunch.com");
    }

    #[test]
    fn test_display_domain_unparseable() {
        assert_eq!(display_domain("www.example.org/feed"), "example.org");
    }
}
