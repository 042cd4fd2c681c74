//! Per-source article cache with per-source page cursors.

use crate::feed::Article;
use crate::pagination::{clamp_page, paginate, total_pages, Page};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Entry {
    articles: Vec<Article>,
    page: usize,
}

/// Fetched articles keyed by the literal category source string.
///
/// Entries are replaced wholesale on every fetch and never evicted.
#[derive(Debug)]
pub struct ArticleCache {
    entries: HashMap<String, Entry>,
    max_entries: usize,
}

impl ArticleCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }

    /// Replace the articles for `source`, keeping the cursor on a page that
    /// still exists. Returns that page.
    pub fn replace(&mut self, source: &str, mut articles: Vec<Article>) -> usize {
        articles.truncate(self.max_entries);
        let entry = self.entries.entry(source.to_owned()).or_default();
        entry.page = clamp_page(entry.page, total_pages(articles.len()));
        entry.articles = articles;
        entry.page
    }

    pub fn get(&self, source: &str) -> Option<&[Article]> {
        self.entries.get(source).map(|e| e.articles.as_slice())
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    /// Current page for `source` (1 for unknown sources).
    pub fn current_page(&self, source: &str) -> usize {
        self.entries.get(source).map_or(1, |e| e.page.max(1))
    }

    pub fn reset_cursor(&mut self, source: &str) {
        if let Some(entry) = self.entries.get_mut(source) {
            entry.page = 1;
        }
    }

    /// Move the cursor for `source` to `page`, clamped. Returns the new page.
    pub fn goto(&mut self, source: &str, page: usize) -> usize {
        match self.entries.get_mut(source) {
            Some(entry) => {
                entry.page = clamp_page(page, total_pages(entry.articles.len()));
                entry.page
            }
            None => 1,
        }
    }

    /// Current page of `source`, or `None` if it was never fetched.
    pub fn page(&self, source: &str) -> Option<Page<'_, Article>> {
        self.entries
            .get(source)
            .map(|e| paginate(&e.articles, e.page))
    }

    /// Move an entry to a new source key after a category edit.
    pub fn rename_key(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }
        if let Some(entry) = self.entries.remove(old) {
            self.entries.insert(new.to_owned(), entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ArticleCache {
    fn default() -> Self {
        Self::new(crate::feed::MAX_ENTRIES)
    }
}
