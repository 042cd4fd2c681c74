//! Utility functions for common operations.
//!
//! - **URL validation**: scheme checks for feed sources and links to open
//! - **Text processing**: Unicode-aware width handling and feed markup cleanup
//!
//! # Examples
//!
//! ```
//! use newsdeck::util::{validate_url, display_width, first_sentence};
//!
//! let url = validate_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(display_width("Hello"), 5);
//! assert_eq!(first_sentence("One. Two."), "One...");
//! ```

mod text;
mod url_validator;

pub use text::{
    contains_ignore_case, display_width, first_sentence, html_to_text, strip_control_chars,
    truncate_to_width,
};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};

/// Maximum allowed search query length
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
