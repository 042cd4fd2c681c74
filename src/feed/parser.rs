use feed_rs::parser;
use thiserror::Error;

/// How many bytes of the document are scanned for an XML declaration.
const PROLOG_SCAN_BYTES: usize = 256;

/// Feed document could not be parsed as RSS or Atom.
#[derive(Debug, Error)]
#[error("Malformed feed: {0}")]
pub struct ParseError(#[from] parser::ParseFeedError);

/// Irregularities that do not make a feed unusable.
///
/// These are logged and otherwise ignored; only a failed parse counts as a
/// malformed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Server labelled the document with a non-XML content type.
    NonXmlContentType(String),
    /// HTTP charset disagrees with the encoding in the XML declaration.
    CharacterEncodingOverride { declared: String, served: String },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonXmlContentType(ct) => write!(f, "non-XML content type: {}", ct),
            Self::CharacterEncodingOverride { declared, served } => write!(
                f,
                "document declared as {} but served as {}",
                declared, served
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<i64>,
    pub updated: Option<i64>,
    pub created: Option<i64>,
}

impl ParsedEntry {
    /// First available time field: published, then updated, then created.
    pub fn timestamp(&self) -> Option<i64> {
        self.published.or(self.updated).or(self.created)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    /// Feed carries channel-level metadata (title, link or description).
    pub has_channel_metadata: bool,
    pub entries: Vec<ParsedEntry>,
    pub warnings: Vec<ParseWarning>,
}

pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, ParseError> {
    let feed = parser::parse(bytes)?;

    let has_channel_metadata =
        feed.title.is_some() || !feed.links.is_empty() || feed.description.is_some();

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));

            // feed-rs has no separate creation date; `created` stays empty here
            ParsedEntry {
                title: entry.title.map(|t| t.content),
                link: entry.links.first().map(|l| l.href.clone()),
                summary,
                published: entry.published.map(|dt| dt.timestamp()),
                updated: entry.updated.map(|dt| dt.timestamp()),
                created: None,
            }
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.content),
        has_channel_metadata,
        entries,
        warnings: Vec::new(),
    })
}

/// Inspect transport metadata for benign irregularities.
///
/// `content_type` is the raw `Content-Type` header, if any.
pub fn detect_warnings(content_type: Option<&str>, bytes: &[u8]) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();

    let Some(content_type) = content_type else {
        return warnings;
    };
    let lowered = content_type.to_ascii_lowercase();
    let mime = lowered.split(';').next().unwrap_or("").trim();

    if !mime.is_empty() && !mime.contains("xml") {
        warnings.push(ParseWarning::NonXmlContentType(mime.to_owned()));
    }

    let served = lowered
        .split(';')
        .skip(1)
        .filter_map(|param| param.trim().strip_prefix("charset="))
        .map(|cs| cs.trim_matches('"').to_owned())
        .next();

    if let (Some(served), Some(declared)) = (served, declared_encoding(bytes)) {
        if !served.eq_ignore_ascii_case(&declared) {
            warnings.push(ParseWarning::CharacterEncodingOverride {
                declared: declared.to_ascii_lowercase(),
                served,
            });
        }
    }

    warnings
}

/// Encoding named in the `<?xml ... encoding="..."?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(PROLOG_SCAN_BYTES)];
    let head = String::from_utf8_lossy(head);
    let start = head.find("<?xml")?;
    let decl_end = head[start..].find("?>")? + start;
    let decl = &head[start..decl_end];

    let after = &decl[decl.find("encoding")? + "encoding".len()..];
    let after = after.trim_start().strip_prefix('=')?.trim_start();
    let quote = after.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &after[1..];
    let end = value.find(quote)?;
    Some(value[..end].to_owned())
}
