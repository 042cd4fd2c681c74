use crate::cache::ArticleCache;
use crate::config::Settings;
use crate::feed::{AggregateError, Article, MergeOutcome, ValidatedSource, ValidationError};
use crate::pagination::{page_of, Page, PAGE_SIZE};
use crate::storage::{
    Category, CategoryDraft, ListError, ListTemplate, PersistedState, StateStore,
};
use crate::theme::{ColorPalette, ThemeVariant};
use crate::util::{contains_ignore_case, MAX_SEARCH_QUERY_LENGTH};
use crate::weather::NO_LOCATION;
use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// Name shown when the active source no longer matches any category.
pub const REFRESHED_FEED_FALLBACK: &str = "Refreshed Feed";

const NO_ACTIVE_CATEGORY: &str = "No news category is currently displayed to refresh.";

const INFO_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(6);

// ============================================================================
// Fetch and Validation Plumbing
// ============================================================================

/// What started a fetch. Decides which messages the result produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    /// Operator selected a category.
    Select,
    /// Operator pressed refresh.
    ManualRefresh,
    /// Periodic timer.
    TimerRefresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source: String,
    pub trigger: FetchTrigger,
}

/// Whether a validated category is being added or replaces an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChange {
    Add,
    Edit { original: String },
}

/// A category waiting for its source to be validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCategory {
    pub change: CategoryChange,
    pub draft: CategoryDraft,
}

/// Work the UI layer must start on behalf of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),
    Validate(PendingCategory),
    Quit,
}

/// Events from background tasks
pub enum AppEvent {
    FetchComplete {
        source: String,
        trigger: FetchTrigger,
        result: Result<MergeOutcome, AggregateError>,
    },
    ValidationComplete {
        pending: PendingCategory,
        result: Result<ValidatedSource, ValidationError>,
    },
    /// A background task panicked.
    ///
    /// `source` is set for fetch tasks so the in-flight marker can be cleared.
    TaskPanicked {
        task: &'static str,
        source: Option<String>,
        error: String,
    },
}

// ============================================================================
// Overlays
// ============================================================================

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Articles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    AddCategory,
    EditCategory { original: String },
    NewList,
    SaveListAs,
    AddLocation,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptField {
    pub label: &'static str,
    pub value: String,
}

/// A small form of one or more text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub fields: Vec<PromptField>,
    pub focused: usize,
}

impl Prompt {
    fn new(kind: PromptKind, fields: &[(&'static str, &str)]) -> Self {
        Self {
            kind,
            fields: fields
                .iter()
                .map(|&(label, value)| PromptField {
                    label,
                    value: value.to_owned(),
                })
                .collect(),
            focused: 0,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::AddCategory => " Add Feed ",
            PromptKind::EditCategory { .. } => " Edit Feed ",
            PromptKind::NewList => " New List ",
            PromptKind::SaveListAs => " Save List As ",
            PromptKind::AddLocation => " Add Location ",
            PromptKind::Search => " Search Headlines ",
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut String> {
        self.fields.get_mut(self.focused).map(|f| &mut f.value)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    fn value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", |f| f.value.as_str())
    }
}

/// Pending confirmation for destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    RemoveCategory { name: String },
    OverwriteList { name: String },
    DeleteList { name: String },
    DiscardAndOpen { name: String },
    DiscardAndCreate { name: String, template: ListTemplate },
    QuitUnsaved,
}

impl ConfirmAction {
    pub fn question(&self) -> String {
        match self {
            Self::RemoveCategory { name } => format!("Remove the feed '{}'?", name),
            Self::OverwriteList { name } => {
                format!("A list named '{}' already exists. Overwrite it?", name)
            }
            Self::DeleteList { name } => format!("Delete the saved list '{}'?", name),
            Self::DiscardAndOpen { name } => {
                format!("Discard unsaved changes and open '{}'?", name)
            }
            Self::DiscardAndCreate { name, .. } => {
                format!("Discard unsaved changes and create '{}'?", name)
            }
            Self::QuitUnsaved => "Discard unsaved changes and quit?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help { scroll: usize },
    Prompt(Prompt),
    Confirm(ConfirmAction),
    /// Saved lists picker.
    Lists { selected: usize },
    /// Weather locations picker.
    Locations { selected: usize },
}

// ============================================================================
// Status and Search
// ============================================================================

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: Cow<'static, str>,
    pub is_error: bool,
    pub set_at: Instant,
}

/// Active headline search over the displayed category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    lowered: String,
    /// Indices into the cached articles, ascending.
    pub matches: Vec<usize>,
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub settings: Settings,
    store: StateStore,
    /// Lists, persisted theme and weather locations.
    pub state: PersistedState,

    // Theme
    /// Session theme; may differ from the persisted one after a CLI override.
    pub theme: ThemeVariant,
    pub palette: ColorPalette,

    // Data
    pub cache: ArticleCache,
    /// Source of the displayed category.
    pub active_source: Option<String>,
    /// Error from the last failed load of the displayed category.
    pub load_error: Option<String>,
    in_flight: HashSet<String>,
    validating: bool,

    // UI State
    pub focus: Focus,
    /// Index into the display order of the working list.
    pub selected_category: usize,
    /// Row on the current page.
    pub selected_article: usize,
    pub overlay: Option<Overlay>,
    pub search: Option<SearchState>,
    pub status_message: Option<StatusMessage>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(
        state: PersistedState,
        settings: Settings,
        store: StateStore,
        theme_override: Option<ThemeVariant>,
    ) -> Self {
        let theme = theme_override.unwrap_or(state.theme);
        Self {
            cache: ArticleCache::new(settings.max_entries_per_category),
            settings,
            store,
            state,
            theme,
            palette: theme.palette(),
            active_source: None,
            load_error: None,
            in_flight: HashSet::new(),
            validating: false,
            focus: Focus::Categories,
            selected_category: 0,
            selected_article: 0,
            overlay: None,
            search: None,
            status_message: None,
            needs_redraw: true,
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some(StatusMessage {
            text: msg.into(),
            is_error: false,
            set_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some(StatusMessage {
            text: msg.into(),
            is_error: true,
            set_at: Instant::now(),
        });
    }

    /// Clear the status message once it has been shown long enough.
    /// Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some(status) = &self.status_message {
            let ttl = if status.is_error { ERROR_TTL } else { INFO_TTL };
            if status.set_at.elapsed() >= ttl {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Write lists, theme and weather to disk, reporting failures in the status bar.
    pub fn persist(&mut self) -> bool {
        match self.store.save(&self.state) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save state");
                self.set_error(format!("Could not save settings: {}", e));
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Categories and navigation
    // ------------------------------------------------------------------------

    /// Categories of the working list in display order.
    pub fn categories(&self) -> Vec<&Category> {
        self.state.lists.working().display_order()
    }

    pub fn current_category(&self) -> Option<&Category> {
        self.categories().get(self.selected_category).copied()
    }

    fn clamp_category_selection(&mut self) {
        let len = self.state.lists.working().len();
        self.selected_category = self.selected_category.min(len.saturating_sub(1));
    }

    fn select_category_named(&mut self, name: &str) {
        if let Some(i) = self.categories().iter().position(|c| c.name == name) {
            self.selected_category = i;
        }
    }

    pub fn nav_category(&mut self, down: bool) {
        let len = self.state.lists.working().len();
        if len == 0 {
            return;
        }
        self.selected_category = if down {
            (self.selected_category + 1).min(len - 1)
        } else {
            self.selected_category.saturating_sub(1)
        };
    }

    /// Display name of the active category, found by its source.
    pub fn active_category_name(&self) -> &str {
        self.active_source
            .as_deref()
            .and_then(|source| self.state.lists.working().find_by_source(source))
            .map_or(REFRESHED_FEED_FALLBACK, |c| c.name.as_str())
    }

    pub fn is_fetching(&self, source: &str) -> bool {
        self.in_flight.contains(source)
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    /// Show the selected category and fetch it.
    pub fn select_current_category(&mut self) -> Option<Effect> {
        let category = self.current_category()?.clone();
        tracing::debug!(name = %category.name, source = %category.source, "Category selected");

        self.active_source = Some(category.source.clone());
        self.load_error = None;
        self.search = None;
        self.selected_article = 0;
        self.cache.reset_cursor(&category.source);
        self.set_status(format!("Loading {}...", category.name));
        self.request_fetch(category.source, FetchTrigger::Select)
    }

    /// Re-fetch the displayed category.
    pub fn refresh(&mut self, trigger: FetchTrigger) -> Option<Effect> {
        let Some(source) = self.active_source.clone() else {
            if trigger == FetchTrigger::ManualRefresh {
                self.set_status(NO_ACTIVE_CATEGORY);
            }
            return None;
        };
        if trigger == FetchTrigger::ManualRefresh {
            self.set_status(format!("Refreshing {}...", self.active_category_name()));
        }
        self.request_fetch(source, trigger)
    }

    fn request_fetch(&mut self, source: String, trigger: FetchTrigger) -> Option<Effect> {
        if self.in_flight.contains(&source) {
            tracing::debug!(source = %source, ?trigger, "Fetch already in flight, skipping");
            return None;
        }
        self.in_flight.insert(source.clone());
        Some(Effect::Fetch(FetchRequest { source, trigger }))
    }

    /// Store a finished fetch and update the display if it is still showing
    /// that source.
    pub fn apply_fetch(
        &mut self,
        source: &str,
        trigger: FetchTrigger,
        result: Result<MergeOutcome, AggregateError>,
    ) {
        self.in_flight.remove(source);
        let is_active = self.active_source.as_deref() == Some(source);

        match result {
            Ok(outcome) => {
                for failure in &outcome.failures {
                    tracing::debug!(url = %failure.url, error = %failure.error, "Source skipped during merge");
                }
                let count = outcome.articles.len();
                let page = self.cache.replace(source, outcome.articles);
                tracing::info!(source = %source, articles = count, page, ?trigger, "Feed cache updated");

                if !is_active {
                    return;
                }
                self.load_error = None;
                match trigger {
                    FetchTrigger::Select => {
                        self.cache.reset_cursor(source);
                        self.selected_article = 0;
                        self.status_message = None;
                    }
                    FetchTrigger::ManualRefresh => {
                        let msg = format!(
                            "The '{}' feed has been refreshed.",
                            self.active_category_name()
                        );
                        self.set_status(msg);
                    }
                    FetchTrigger::TimerRefresh => {}
                }
                self.refresh_search_matches();
                self.clamp_article_selection();
            }
            Err(e) => match trigger {
                FetchTrigger::ManualRefresh if is_active => {
                    tracing::warn!(source = %source, error = %e, "Manual refresh failed");
                    self.set_error(format!("Error refreshing RSS feed: {}", e));
                }
                FetchTrigger::Select if is_active => {
                    tracing::warn!(source = %source, error = %e, "Feed load failed");
                    self.load_error = Some(e.to_string());
                    self.set_error(format!("Error loading feed: {}", e));
                }
                _ => {
                    tracing::debug!(source = %source, error = %e, ?trigger, "Background fetch failed");
                }
            },
        }
    }

    /// Clear an in-flight marker after a fetch task died.
    pub fn abandon_fetch(&mut self, source: &str) {
        self.in_flight.remove(source);
    }

    fn clear_display(&mut self) {
        self.active_source = None;
        self.load_error = None;
        self.search = None;
        self.selected_article = 0;
    }

    // ------------------------------------------------------------------------
    // Pages and headlines
    // ------------------------------------------------------------------------

    /// Cached articles of the displayed category.
    pub fn active_articles(&self) -> Option<&[Article]> {
        self.active_source.as_deref().and_then(|s| self.cache.get(s))
    }

    /// Current page of the displayed category, if it has been fetched.
    pub fn current_page(&self) -> Option<Page<'_, Article>> {
        self.active_source.as_deref().and_then(|s| self.cache.page(s))
    }

    /// `--- Latest {name} Headlines ---`, with `(Page p of t)` when there
    /// is more than one page. `None` until the category has loaded.
    pub fn headline_header(&self) -> Option<String> {
        if self.load_error.is_some() {
            return None;
        }
        let page = self.current_page()?;
        let name = self.active_category_name();
        Some(if page.total_pages > 1 {
            format!(
                "--- Latest {} Headlines (Page {} of {}) ---",
                name, page.number, page.total_pages
            )
        } else {
            format!("--- Latest {} Headlines ---", name)
        })
    }

    pub fn goto_page(&mut self, page: usize) {
        if let Some(source) = self.active_source.clone() {
            self.cache.goto(&source, page);
            self.selected_article = 0;
        }
    }

    pub fn next_page(&mut self) {
        if let Some(page) = self.current_page() {
            if page.has_next() {
                let n = page.number + 1;
                self.goto_page(n);
            }
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(page) = self.current_page() {
            if page.has_prev() {
                let n = page.number - 1;
                self.goto_page(n);
            }
        }
    }

    pub fn nav_article(&mut self, down: bool) {
        let len = self.current_page().map_or(0, |p| p.items.len());
        if len == 0 {
            return;
        }
        self.selected_article = if down {
            (self.selected_article + 1).min(len - 1)
        } else {
            self.selected_article.saturating_sub(1)
        };
    }

    fn clamp_article_selection(&mut self) {
        let len = self.current_page().map_or(0, |p| p.items.len());
        self.selected_article = self.selected_article.min(len.saturating_sub(1));
    }

    pub fn current_article(&self) -> Option<&Article> {
        let page = self.current_page()?;
        page.items.get(self.selected_article)
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Highlight headlines matching `query` and jump to the first match.
    /// An empty query clears the search.
    pub fn apply_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.search = None;
            self.set_status("Search cleared");
            return;
        }
        if query.chars().count() > MAX_SEARCH_QUERY_LENGTH {
            self.set_error(format!(
                "Search query too long (max {} chars)",
                MAX_SEARCH_QUERY_LENGTH
            ));
            return;
        }
        if self.active_articles().is_none() {
            self.set_status("Select a category before searching");
            return;
        }

        let lowered = query.to_lowercase();
        self.search = Some(SearchState {
            query: query.to_owned(),
            matches: self.find_matches(&lowered),
            lowered,
        });

        let count = self.search.as_ref().map_or(0, |s| s.matches.len());
        if count == 0 {
            self.set_status(format!("No headlines match '{}'", query));
        } else {
            let first = self.search.as_ref().and_then(|s| s.matches.first().copied());
            if let Some(index) = first {
                self.jump_to_match(index);
            }
            self.set_status(format!("{} headline(s) match '{}'", count, query));
        }
    }

    fn find_matches(&self, lowered: &str) -> Vec<usize> {
        self.active_articles()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                contains_ignore_case(&a.title, lowered) || contains_ignore_case(&a.summary, lowered)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn refresh_search_matches(&mut self) {
        if let Some(lowered) = self.search.as_ref().map(|s| s.lowered.clone()) {
            let matches = self.find_matches(&lowered);
            if let Some(search) = self.search.as_mut() {
                search.matches = matches;
            }
        }
    }

    fn jump_to_match(&mut self, index: usize) {
        self.goto_page(page_of(index));
        self.selected_article = index % PAGE_SIZE;
    }

    /// Move to the next match after the selected headline, wrapping.
    pub fn next_match(&mut self) {
        let Some(search) = &self.search else {
            self.set_status("No active search");
            return;
        };
        let current = self
            .current_page()
            .map_or(0, |p| p.offset() + self.selected_article);
        let next = search
            .matches
            .iter()
            .copied()
            .find(|&i| i > current)
            .or_else(|| search.matches.first().copied());
        match next {
            Some(index) => self.jump_to_match(index),
            None => self.set_status(format!("No headlines match '{}'", search.query)),
        }
    }

    /// Article at `index` of the full cached set matches the search.
    pub fn is_match(&self, index: usize) -> bool {
        self.search
            .as_ref()
            .is_some_and(|s| s.matches.binary_search(&index).is_ok())
    }

    // ------------------------------------------------------------------------
    // Category management
    // ------------------------------------------------------------------------

    pub fn open_add_category(&mut self) {
        self.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::AddCategory,
            &[("Name", ""), ("Feed URL(s), comma separated", ""), ("Row", "1")],
        )));
    }

    pub fn open_edit_category(&mut self) {
        let Some(category) = self.current_category().cloned() else {
            self.set_status("No feed selected");
            return;
        };
        let row = category.row.to_string();
        self.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::EditCategory {
                original: category.name.clone(),
            },
            &[
                ("Name", category.name.as_str()),
                ("Feed URL(s), comma separated", category.source.as_str()),
                ("Row", row.as_str()),
            ],
        )));
    }

    pub fn confirm_remove_category(&mut self) {
        match self.current_category() {
            Some(category) => {
                let name = category.name.clone();
                self.overlay = Some(Overlay::Confirm(ConfirmAction::RemoveCategory { name }));
            }
            None => self.set_status("No feed selected"),
        }
    }

    /// Check an add/edit request and decide whether it needs validation.
    ///
    /// Empty fields and name conflicts are rejected here, before any network
    /// call. An edit that keeps the source is applied immediately.
    pub fn begin_category_change(
        &mut self,
        change: CategoryChange,
        name: &str,
        source: &str,
        row: &str,
    ) -> Option<Effect> {
        let draft = match CategoryDraft::parse(name, source, row) {
            Ok(d) => d,
            Err(e) => {
                self.set_error(e.to_string());
                return None;
            }
        };

        let except = match &change {
            CategoryChange::Add => None,
            CategoryChange::Edit { original } => Some(original.as_str()),
        };
        if let Err(e) = self
            .state
            .lists
            .working()
            .check_name_available(&draft.name, except)
        {
            self.set_error(e.to_string());
            return None;
        }

        if let CategoryChange::Edit { original } = &change {
            let unchanged = self
                .state
                .lists
                .working()
                .get(original)
                .is_some_and(|c| c.source == draft.source);
            if unchanged {
                self.finish_category_change(PendingCategory { change, draft }, None);
                return None;
            }
        }

        if self.validating {
            self.set_status("A feed is already being validated");
            return None;
        }
        self.validating = true;
        self.set_status("Validating feed...");
        Some(Effect::Validate(PendingCategory { change, draft }))
    }

    pub fn apply_validation(
        &mut self,
        pending: PendingCategory,
        result: Result<ValidatedSource, ValidationError>,
    ) {
        self.validating = false;
        match result {
            Ok(validated) => {
                let summary = validated.summary();
                tracing::info!(name = %pending.draft.name, summary = %summary, "Feed validated");
                self.finish_category_change(pending, Some(&summary));
            }
            Err(e) => {
                tracing::info!(name = %pending.draft.name, error = %e, "Feed rejected");
                let prefix = if e.is_format_error() {
                    "Invalid URL format"
                } else {
                    "Invalid feed"
                };
                self.set_error(format!("{}: {}", prefix, e));
            }
        }
    }

    /// Validation failed to report back; allow another attempt.
    pub fn abandon_validation(&mut self) {
        self.validating = false;
    }

    /// Apply a checked add or edit. `summary` describes the validated
    /// source, absent when validation was skipped.
    fn finish_category_change(&mut self, pending: PendingCategory, summary: Option<&str>) {
        let PendingCategory { change, draft } = pending;
        let checked = summary.map(|s| format!(" ({})", s)).unwrap_or_default();
        match change {
            CategoryChange::Add => match self.state.lists.add_category(draft) {
                Ok(added) => {
                    self.select_category_named(&added.name);
                    self.set_status(format!(
                        "Feed '{}' added{}. Remember to save to keep changes.",
                        added.name, checked
                    ));
                }
                Err(e) => self.set_error(e.to_string()),
            },
            CategoryChange::Edit { original } => {
                let new_name = draft.name.clone();
                let new_source = draft.source.clone();
                match self.state.lists.edit_category(&original, draft) {
                    Ok(previous) => {
                        if previous.source != new_source {
                            self.cache.rename_key(&previous.source, &new_source);
                            if self.active_source.as_deref() == Some(previous.source.as_str()) {
                                self.clear_display();
                            }
                        }
                        self.select_category_named(&new_name);
                        self.set_status(format!(
                            "Feed '{}' updated{}. Remember to save to keep changes.",
                            new_name, checked
                        ));
                    }
                    Err(e) => self.set_error(e.to_string()),
                }
            }
        }
    }

    pub fn remove_category(&mut self, name: &str) {
        match self.state.lists.remove_category(name) {
            Ok(removed) => {
                let was_active = self.active_source.as_deref() == Some(removed.source.as_str());
                if was_active || self.state.lists.working().is_empty() {
                    self.clear_display();
                }
                self.clamp_category_selection();
                self.set_status(format!(
                    "Feed '{}' removed. Remember to save to keep changes.",
                    removed.name
                ));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn move_selected_category(&mut self, up: bool) {
        let Some(name) = self.current_category().map(|c| c.name.clone()) else {
            return;
        };
        match self.state.lists.move_category(&name, up) {
            Ok(true) => self.select_category_named(&name),
            Ok(false) => {}
            Err(e) => self.set_error(e.to_string()),
        }
    }

    // ------------------------------------------------------------------------
    // List management
    // ------------------------------------------------------------------------

    pub fn list_names(&self) -> Vec<String> {
        self.state.lists.names().map(str::to_owned).collect()
    }

    pub fn open_lists(&mut self) {
        let active = self.state.lists.active_name().to_owned();
        let selected = self
            .list_names()
            .iter()
            .position(|n| *n == active)
            .unwrap_or(0);
        self.overlay = Some(Overlay::Lists { selected });
    }

    pub fn open_new_list(&mut self) {
        self.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::NewList,
            &[("List name", ""), ("Template: (b)lank or (d)efaults", "b")],
        )));
    }

    pub fn open_save_as(&mut self) {
        let current = self.state.lists.active_name().to_owned();
        self.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::SaveListAs,
            &[("List name", current.as_str())],
        )));
    }

    /// Create a list, asking first if the working copy has unsaved edits.
    pub fn request_create_list(&mut self, name: &str, template: ListTemplate) {
        if self.state.lists.is_dirty() {
            self.overlay = Some(Overlay::Confirm(ConfirmAction::DiscardAndCreate {
                name: name.to_owned(),
                template,
            }));
        } else {
            self.create_list(name, template);
        }
    }

    pub fn create_list(&mut self, name: &str, template: ListTemplate) {
        match self.state.lists.create(name, template) {
            Ok(()) => {
                self.clear_display();
                self.selected_category = 0;
                if self.persist() {
                    self.set_status(format!("List '{}' created.", self.state.lists.active_name()));
                }
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Open a saved list, asking first if the working copy has unsaved edits.
    pub fn request_open_list(&mut self, name: &str) {
        if self.state.lists.is_dirty() {
            self.overlay = Some(Overlay::Confirm(ConfirmAction::DiscardAndOpen {
                name: name.to_owned(),
            }));
        } else {
            self.open_list(name);
        }
    }

    pub fn open_list(&mut self, name: &str) {
        match self.state.lists.open(name) {
            Ok(()) => {
                self.clear_display();
                self.selected_category = 0;
                if self.persist() {
                    self.set_status(format!("Opened list '{}'.", name));
                }
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn save_list(&mut self) {
        self.state.lists.save();
        if self.persist() {
            self.set_status(format!("List '{}' saved.", self.state.lists.active_name()));
        }
    }

    /// Save under a new name. A collision opens an overwrite confirmation
    /// unless `overwrite` is already set.
    pub fn save_list_as(&mut self, name: &str, overwrite: bool) {
        match self.state.lists.save_as(name, overwrite) {
            Ok(()) => {
                if self.persist() {
                    self.set_status(format!("List saved as '{}'.", self.state.lists.active_name()));
                }
            }
            Err(ListError::ListExists(name)) => {
                self.overlay = Some(Overlay::Confirm(ConfirmAction::OverwriteList { name }));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn delete_list(&mut self, name: &str) {
        match self.state.lists.delete(name) {
            Ok(()) => {
                if self.persist() {
                    self.set_status(format!("List '{}' deleted.", name));
                }
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn set_default_list(&mut self, name: &str) {
        match self.state.lists.set_default(name) {
            Ok(()) => {
                if self.persist() {
                    self.set_status(format!("'{}' is now the default list.", name));
                }
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    // ------------------------------------------------------------------------
    // Theme and weather
    // ------------------------------------------------------------------------

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        self.palette = self.theme.palette();
        self.state.theme = self.theme;
        self.persist();
        self.set_status(format!("Theme: {}", self.theme.name()));
    }

    pub fn weather_text(&self) -> String {
        self.state.locations.display()
    }

    pub fn cycle_location(&mut self, forward: bool) {
        self.state.locations.cycle(forward);
        self.persist();
    }

    pub fn open_locations(&mut self) {
        let current = self.state.locations.current();
        let selected = self
            .state
            .locations
            .all()
            .iter()
            .position(|l| l == current)
            .unwrap_or(0);
        self.overlay = Some(Overlay::Locations { selected });
    }

    pub fn open_add_location(&mut self) {
        self.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::AddLocation,
            &[("City, CC", "")],
        )));
    }

    pub fn select_location(&mut self, location: &str) {
        match self.state.locations.select(location) {
            Ok(()) => {
                self.persist();
                self.set_status(format!("Weather location set to {}", location));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn clear_location(&mut self) {
        self.select_location(NO_LOCATION);
    }

    pub fn add_location(&mut self, input: &str) {
        match self.state.locations.add(input) {
            Ok(location) => {
                self.persist();
                self.set_status(format!("'{}' added and saved.", location));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    // ------------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------------

    pub fn open_search(&mut self) {
        let query = self.search.as_ref().map_or("", |s| s.query.as_str()).to_owned();
        self.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::Search,
            &[("Search", query.as_str())],
        )));
    }

    /// Close the active prompt and act on its contents.
    pub fn submit_prompt(&mut self) -> Option<Effect> {
        let Some(Overlay::Prompt(prompt)) = self.overlay.take() else {
            return None;
        };
        match prompt.kind.clone() {
            PromptKind::AddCategory => self.begin_category_change(
                CategoryChange::Add,
                prompt.value(0),
                prompt.value(1),
                prompt.value(2),
            ),
            PromptKind::EditCategory { original } => self.begin_category_change(
                CategoryChange::Edit { original },
                prompt.value(0),
                prompt.value(1),
                prompt.value(2),
            ),
            PromptKind::NewList => {
                let template = if prompt.value(1).trim().to_ascii_lowercase().starts_with('d') {
                    ListTemplate::FromDefaults
                } else {
                    ListTemplate::Blank
                };
                self.request_create_list(prompt.value(0), template);
                None
            }
            PromptKind::SaveListAs => {
                self.save_list_as(prompt.value(0), false);
                None
            }
            PromptKind::AddLocation => {
                self.add_location(prompt.value(0));
                self.open_locations();
                None
            }
            PromptKind::Search => {
                self.apply_search(prompt.value(0));
                None
            }
        }
    }

    /// Ask to quit; unsaved list edits need confirmation first.
    pub fn request_quit(&mut self) -> Option<Effect> {
        if self.state.lists.is_dirty() {
            self.overlay = Some(Overlay::Confirm(ConfirmAction::QuitUnsaved));
            return None;
        }
        Some(Effect::Quit)
    }

    /// Resolve the pending confirmation.
    pub fn resolve_confirm(&mut self, accepted: bool) -> Option<Effect> {
        let Some(Overlay::Confirm(action)) = self.overlay.take() else {
            return None;
        };
        if !accepted {
            return None;
        }
        match action {
            ConfirmAction::RemoveCategory { name } => self.remove_category(&name),
            ConfirmAction::OverwriteList { name } => self.save_list_as(&name, true),
            ConfirmAction::DeleteList { name } => self.delete_list(&name),
            ConfirmAction::DiscardAndOpen { name } => self.open_list(&name),
            ConfirmAction::DiscardAndCreate { name, template } => {
                self.create_list(&name, template)
            }
            ConfirmAction::QuitUnsaved => return Some(Effect::Quit),
        }
        None
    }
}

// ============================================================================
// Tests
// ============================================================================
