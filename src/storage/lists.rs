//! Categories, feed lists and the saved-lists library.
//!
//! Category edits go to a working copy of the active list and only reach
//! the saved mapping on Save or Save-As. List-level operations (create,
//! delete, set default) change the saved mapping directly; the caller
//! persists afterwards.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::util::strip_control_chars;

/// Name of the list created when no default list exists.
pub const STANDARD_DEFAULT_LIST: &str = "Standard Default";

/// Built-in feeds used for the standard list and the "From Defaults" template.
pub const DEFAULT_FEEDS: [(&str, &str); 3] = [
    ("Technology", "https://techcrunch.com/feed/"),
    ("Finance", "https://www.valuewalk.com/feed"),
    ("World", "http://feeds.bbci.co.uk/news/world/rss.xml"),
];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("A category named '{0}' already exists in this list")]
    CategoryExists(String),

    #[error("A list named '{0}' already exists")]
    ListExists(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Feed URL cannot be empty")]
    EmptySource,

    #[error("No category named '{0}'")]
    CategoryNotFound(String),

    #[error("No saved list named '{0}'")]
    ListNotFound(String),

    #[error("Cannot delete '{0}' while it is the active list")]
    DeleteActiveList(String),

    #[error("Cannot delete '{0}' because it is the default list")]
    DeleteDefaultList(String),
}

/// Trim a user-supplied name and strip terminal control sequences.
fn clean_name(name: &str) -> Result<String, ListError> {
    let cleaned = strip_control_chars(name);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(ListError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn clean_source(source: &str) -> Result<String, ListError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(ListError::EmptySource);
    }
    Ok(trimmed.to_owned())
}

// ============================================================================
// Category / FeedList
// ============================================================================

/// A named feed subscription. `source` may hold several comma-joined URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub source: String,
    /// Display row, 1-based.
    pub row: u32,
}

impl Category {
    pub fn new(name: impl Into<String>, source: impl Into<String>, row: u32) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            row: row.max(1),
        }
    }
}

/// Trimmed, checked input for adding or editing a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub source: String,
    pub row: u32,
}

impl CategoryDraft {
    /// Clean raw dialog input. Row text that is blank or not a positive
    /// integer becomes 1.
    pub fn parse(name: &str, source: &str, row: &str) -> Result<Self, ListError> {
        let name = clean_name(name)?;
        let source = clean_source(source)?;
        let row = row.trim().parse::<u32>().ok().filter(|r| *r >= 1).unwrap_or(1);
        Ok(Self { name, source, row })
    }

    fn into_category(self) -> Category {
        Category::new(self.name, self.source, self.row)
    }
}

/// An ordered sequence of categories with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedList {
    categories: Vec<Category>,
}

impl FeedList {
    /// Build from stored categories. Later duplicates of a name are dropped.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut seen = BTreeSet::new();
        let categories = categories
            .into_iter()
            .filter(|c| {
                let fresh = seen.insert(c.name.clone());
                if !fresh {
                    tracing::warn!(name = %c.name, "Dropping duplicate category from stored list");
                }
                fresh
            })
            .collect();
        Self { categories }
    }

    /// The built-in Technology / Finance / World list.
    pub fn defaults() -> Self {
        Self::from_categories(
            DEFAULT_FEEDS
                .iter()
                .map(|(name, url)| Category::new(*name, *url, 1)),
        )
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// First category whose source is exactly `source`.
    pub fn find_by_source(&self, source: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.source == source)
    }

    fn position(&self, name: &str) -> Result<usize, ListError> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ListError::CategoryNotFound(name.to_owned()))
    }

    /// Reject `name` if another category (other than `except`) uses it.
    pub fn check_name_available(&self, name: &str, except: Option<&str>) -> Result<(), ListError> {
        let taken = self
            .categories
            .iter()
            .any(|c| c.name == name && Some(c.name.as_str()) != except);
        if taken {
            return Err(ListError::CategoryExists(name.to_owned()));
        }
        Ok(())
    }

    pub fn add(&mut self, draft: CategoryDraft) -> Result<&Category, ListError> {
        self.check_name_available(&draft.name, None)?;
        self.categories.push(draft.into_category());
        let last = self.categories.len() - 1;
        Ok(&self.categories[last])
    }

    /// Replace the category called `name` in place. Returns the previous value.
    pub fn edit(&mut self, name: &str, draft: CategoryDraft) -> Result<Category, ListError> {
        let index = self.position(name)?;
        self.check_name_available(&draft.name, Some(name))?;
        Ok(std::mem::replace(
            &mut self.categories[index],
            draft.into_category(),
        ))
    }

    pub fn remove(&mut self, name: &str) -> Result<Category, ListError> {
        let index = self.position(name)?;
        Ok(self.categories.remove(index))
    }

    /// Swap with the previous category. Returns false at the top.
    pub fn move_up(&mut self, name: &str) -> Result<bool, ListError> {
        let index = self.position(name)?;
        if index == 0 {
            return Ok(false);
        }
        self.categories.swap(index, index - 1);
        Ok(true)
    }

    /// Swap with the next category. Returns false at the bottom.
    pub fn move_down(&mut self, name: &str) -> Result<bool, ListError> {
        let index = self.position(name)?;
        if index + 1 >= self.categories.len() {
            return Ok(false);
        }
        self.categories.swap(index, index + 1);
        Ok(true)
    }

    /// Categories grouped by row (ascending), list order within a row.
    pub fn rows(&self) -> Vec<(u32, Vec<&Category>)> {
        let mut rows: BTreeMap<u32, Vec<&Category>> = BTreeMap::new();
        for category in &self.categories {
            rows.entry(category.row).or_default().push(category);
        }
        rows.into_iter().collect()
    }

    /// Categories in display order: by row, then list order.
    pub fn display_order(&self) -> Vec<&Category> {
        self.rows().into_iter().flat_map(|(_, row)| row).collect()
    }
}

// ============================================================================
// ListLibrary
// ============================================================================

/// Starting content for a newly created list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTemplate {
    Blank,
    FromDefaults,
}

/// All saved lists plus the working copy of the active one.
#[derive(Debug, Clone)]
pub struct ListLibrary {
    saved: BTreeMap<String, FeedList>,
    default_name: String,
    active_name: String,
    working: FeedList,
    dirty: bool,
}

impl ListLibrary {
    /// Assemble a library from stored parts.
    ///
    /// A missing default list falls back to [`STANDARD_DEFAULT_LIST`], which
    /// is created with the built-in feeds if absent; an unknown or empty active name falls back to the
    /// default. The second value is true when the stored data had to be
    /// repaired and should be written back.
    pub fn from_parts(
        mut saved: BTreeMap<String, FeedList>,
        default_name: &str,
        active_name: Option<&str>,
    ) -> (Self, bool) {
        let mut repaired = false;
        let mut default_name = default_name.trim().to_owned();

        if default_name.is_empty() || !saved.contains_key(&default_name) {
            tracing::info!(
                missing = %default_name,
                "Default list missing, creating '{}'",
                STANDARD_DEFAULT_LIST
            );
            saved
                .entry(STANDARD_DEFAULT_LIST.to_owned())
                .or_insert_with(FeedList::defaults);
            default_name = STANDARD_DEFAULT_LIST.to_owned();
            repaired = true;
        }

        let active_name = match active_name.map(str::trim) {
            Some(name) if !name.is_empty() && saved.contains_key(name) => name.to_owned(),
            _ => default_name.clone(),
        };

        let working = saved.get(&active_name).cloned().unwrap_or_default();

        (
            Self {
                saved,
                default_name,
                active_name,
                working,
                dirty: false,
            },
            repaired,
        )
    }

    pub fn saved(&self) -> &BTreeMap<String, FeedList> {
        &self.saved
    }

    /// Saved list names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.saved.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.saved.contains_key(name)
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn active_name(&self) -> &str {
        &self.active_name
    }

    pub fn working(&self) -> &FeedList {
        &self.working
    }

    /// Working copy differs from what was last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -- Working copy edits --

    pub fn add_category(&mut self, draft: CategoryDraft) -> Result<Category, ListError> {
        let added = self.working.add(draft)?.clone();
        self.dirty = true;
        Ok(added)
    }

    pub fn edit_category(&mut self, name: &str, draft: CategoryDraft) -> Result<Category, ListError> {
        let previous = self.working.edit(name, draft)?;
        self.dirty = true;
        Ok(previous)
    }

    pub fn remove_category(&mut self, name: &str) -> Result<Category, ListError> {
        let removed = self.working.remove(name)?;
        self.dirty = true;
        Ok(removed)
    }

    pub fn move_category(&mut self, name: &str, up: bool) -> Result<bool, ListError> {
        let moved = if up {
            self.working.move_up(name)?
        } else {
            self.working.move_down(name)?
        };
        self.dirty |= moved;
        Ok(moved)
    }

    // -- List operations --

    /// Create a list and switch to it.
    pub fn create(&mut self, name: &str, template: ListTemplate) -> Result<(), ListError> {
        let name = clean_name(name)?;
        if self.saved.contains_key(&name) {
            return Err(ListError::ListExists(name));
        }
        let list = match template {
            ListTemplate::Blank => FeedList::default(),
            ListTemplate::FromDefaults => FeedList::defaults(),
        };
        self.saved.insert(name.clone(), list.clone());
        self.active_name = name;
        self.working = list;
        self.dirty = false;
        Ok(())
    }

    /// Replace the working copy with a saved list, dropping unsaved edits.
    pub fn open(&mut self, name: &str) -> Result<(), ListError> {
        let list = self
            .saved
            .get(name)
            .ok_or_else(|| ListError::ListNotFound(name.to_owned()))?;
        self.working = list.clone();
        self.active_name = name.to_owned();
        self.dirty = false;
        Ok(())
    }

    /// Write the working copy into the active list.
    pub fn save(&mut self) {
        self.saved
            .insert(self.active_name.clone(), self.working.clone());
        self.dirty = false;
    }

    /// Save the working copy under `name` and make it the active list.
    ///
    /// An existing name is only replaced when `overwrite` is set.
    pub fn save_as(&mut self, name: &str, overwrite: bool) -> Result<(), ListError> {
        let name = clean_name(name)?;
        if !overwrite && self.saved.contains_key(&name) {
            return Err(ListError::ListExists(name));
        }
        self.active_name = name;
        self.save();
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<(), ListError> {
        if !self.saved.contains_key(name) {
            return Err(ListError::ListNotFound(name.to_owned()));
        }
        if name == self.active_name {
            return Err(ListError::DeleteActiveList(name.to_owned()));
        }
        if name == self.default_name {
            return Err(ListError::DeleteDefaultList(name.to_owned()));
        }
        self.saved.remove(name);
        Ok(())
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), ListError> {
        if !self.saved.contains_key(name) {
            return Err(ListError::ListNotFound(name.to_owned()));
        }
        self.default_name = name.to_owned();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn draft(name: &str, source: &str, row: u32) -> CategoryDraft {
        CategoryDraft {
            name: name.into(),
            source: source.into(),
            row,
        }
    }

    fn library() -> ListLibrary {
        let (lib, repaired) = ListLibrary::from_parts(BTreeMap::new(), "", None);
        assert!(repaired);
        lib
    }

    #[test]
    fn test_draft_parse_trims_and_defaults_row() {
        let d = CategoryDraft::parse("  Tech ", " https://a.example/rss ", "").unwrap();
        assert_eq!(d, draft("Tech", "https://a.example/rss", 1));
        assert_eq!(CategoryDraft::parse("x", "y", "0").unwrap().row, 1);
        assert_eq!(CategoryDraft::parse("x", "y", "3").unwrap().row, 3);
        assert_eq!(CategoryDraft::parse("  ", "y", "1"), Err(ListError::EmptyName));
        assert_eq!(CategoryDraft::parse("x", " ", "1"), Err(ListError::EmptySource));
    }

    #[test]
    fn test_add_rejects_duplicate_name() {
        let mut list = FeedList::defaults();
        let before = list.clone();
        let err = list
            .add(draft("Technology", "https://other.example/rss", 1))
            .unwrap_err();
        assert_eq!(err, ListError::CategoryExists("Technology".into()));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(list, before);
    }

    #[test]
    fn test_edit_allows_keeping_own_name() {
        let mut list = FeedList::defaults();
        let previous = list
            .edit("World", draft("World", "https://new.example/rss", 2))
            .unwrap();
        assert_eq!(previous.source, "http://feeds.bbci.co.uk/news/world/rss.xml");
        assert_eq!(list.get("World").unwrap().row, 2);

        let err = list
            .edit("World", draft("Finance", "https://x.example", 1))
            .unwrap_err();
        assert_eq!(err, ListError::CategoryExists("Finance".into()));
    }

    #[test]
    fn test_move_at_ends_is_noop() {
        let mut list = FeedList::defaults();
        assert!(!list.move_up("Technology").unwrap());
        assert!(!list.move_down("World").unwrap());
        assert!(list.move_up("World").unwrap());
        let names: Vec<&str> = list.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Technology", "World", "Finance"]);
    }

    #[test]
    fn test_rows_group_in_list_order() {
        let list = FeedList::from_categories([
            Category::new("a", "http://a", 2),
            Category::new("b", "http://b", 1),
            Category::new("c", "http://c", 2),
        ]);
        let names: Vec<&str> = list.display_order().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(list.rows().len(), 2);
    }

    #[test]
    fn test_from_categories_drops_duplicates() {
        let list = FeedList::from_categories([
            Category::new("a", "http://a", 1),
            Category::new("a", "http://other", 1),
        ]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.categories()[0].source, "http://a");
    }

    #[test]
    fn test_missing_default_creates_standard_list() {
        let lib = library();
        assert_eq!(lib.default_name(), STANDARD_DEFAULT_LIST);
        assert_eq!(lib.active_name(), STANDARD_DEFAULT_LIST);
        assert_eq!(lib.working(), &FeedList::defaults());
    }

    #[test]
    fn test_unknown_active_falls_back_to_default() {
        let mut saved = BTreeMap::new();
        saved.insert("Mine".to_string(), FeedList::default());
        let (lib, repaired) = ListLibrary::from_parts(saved, "Mine", Some("Gone"));
        assert!(!repaired);
        assert_eq!(lib.active_name(), "Mine");
    }

    #[test]
    fn test_edits_stay_in_working_copy_until_save() {
        let mut lib = library();
        lib.add_category(draft("Science", "https://s.example/rss", 1))
            .unwrap();
        assert!(lib.is_dirty());
        assert_eq!(lib.saved()[STANDARD_DEFAULT_LIST].len(), 3);

        lib.save();
        assert!(!lib.is_dirty());
        assert_eq!(lib.saved()[STANDARD_DEFAULT_LIST].len(), 4);
    }

    #[test]
    fn test_open_discards_unsaved_edits() {
        let mut lib = library();
        lib.create("Empty", ListTemplate::Blank).unwrap();
        lib.add_category(draft("X", "https://x.example", 1)).unwrap();
        lib.open(STANDARD_DEFAULT_LIST).unwrap();
        lib.open("Empty").unwrap();
        assert!(lib.working().is_empty());
    }

    #[test]
    fn test_create_switches_and_rejects_duplicates() {
        let mut lib = library();
        lib.create("Copy", ListTemplate::FromDefaults).unwrap();
        assert_eq!(lib.active_name(), "Copy");
        assert_eq!(lib.working().len(), 3);
        assert_eq!(
            lib.create(" Copy ", ListTemplate::Blank),
            Err(ListError::ListExists("Copy".into()))
        );
        assert_eq!(lib.create("  ", ListTemplate::Blank), Err(ListError::EmptyName));
    }

    #[test]
    fn test_save_as_requires_overwrite_for_existing() {
        let mut lib = library();
        lib.create("Other", ListTemplate::Blank).unwrap();
        lib.open(STANDARD_DEFAULT_LIST).unwrap();

        assert_eq!(
            lib.save_as("Other", false),
            Err(ListError::ListExists("Other".into()))
        );
        lib.save_as("Other", true).unwrap();
        assert_eq!(lib.active_name(), "Other");
        assert_eq!(lib.saved()["Other"].len(), 3);
    }

    #[test]
    fn test_delete_rules() {
        let mut lib = library();
        lib.create("Spare", ListTemplate::Blank).unwrap();

        assert_eq!(
            lib.delete("Spare"),
            Err(ListError::DeleteActiveList("Spare".into()))
        );
        lib.open(STANDARD_DEFAULT_LIST).unwrap();
        lib.set_default("Spare").unwrap();
        lib.open("Spare").unwrap();
        assert_eq!(
            lib.delete("Spare"),
            Err(ListError::DeleteActiveList("Spare".into()))
        );
        lib.open(STANDARD_DEFAULT_LIST).unwrap();
        assert_eq!(
            lib.delete("Spare"),
            Err(ListError::DeleteDefaultList("Spare".into()))
        );
        lib.set_default(STANDARD_DEFAULT_LIST).unwrap();
        lib.delete("Spare").unwrap();
        assert!(!lib.contains("Spare"));
        assert_eq!(lib.delete("Spare"), Err(ListError::ListNotFound("Spare".into())));
    }
}
