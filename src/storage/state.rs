//! JSON state file: saved lists, theme and weather location.
//!
//! Older files stored a list either as a `{name: url}` mapping or as
//! `[name, url]` pairs. Both are accepted and normalized to
//! `[name, url, row]` triples, which is the only shape written.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::lists::{Category, FeedList, ListLibrary, STANDARD_DEFAULT_LIST};
use crate::theme::ThemeVariant;
use crate::weather::{Locations, DEFAULT_LOCATION};

/// State file name inside the config directory.
pub const STATE_FILE_NAME: &str = "state.json";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to read state file: {0}")]
    Read(#[source] std::io::Error),

    #[error("State file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to save state to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// On-disk shapes
// ============================================================================

/// One stored list in any of the accepted shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredList {
    Rows(Vec<StoredCategory>),
    /// Legacy `{name: url}` mapping; key order is preserved.
    Map(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredCategory {
    Triple(String, String, u32),
    Pair(String, String),
}

impl StoredList {
    fn into_feed_list(self) -> FeedList {
        let categories: Vec<Category> = match self {
            Self::Rows(rows) => rows
                .into_iter()
                .map(|row| match row {
                    StoredCategory::Triple(name, source, row) => Category::new(name, source, row),
                    StoredCategory::Pair(name, source) => Category::new(name, source, 1),
                })
                .collect(),
            Self::Map(map) => map
                .into_iter()
                .filter_map(|(name, value)| match value {
                    serde_json::Value::String(source) => Some(Category::new(name, source, 1)),
                    other => {
                        tracing::warn!(name = %name, value = %other, "Skipping non-string feed URL");
                        None
                    }
                })
                .collect(),
        };
        FeedList::from_categories(
            categories
                .into_iter()
                .filter(|c| !c.name.trim().is_empty() && !c.source.trim().is_empty()),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StateFileIn {
    saved_lists: BTreeMap<String, serde_json::Value>,
    default_list_name: String,
    active_list_name: Option<String>,
    theme: Option<String>,
    weather_location: Option<String>,
    default_locations: Option<Vec<String>>,
}

impl Default for StateFileIn {
    fn default() -> Self {
        Self {
            saved_lists: BTreeMap::new(),
            default_list_name: STANDARD_DEFAULT_LIST.to_owned(),
            active_list_name: None,
            theme: None,
            weather_location: None,
            default_locations: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct StateFileOut<'a> {
    saved_lists: BTreeMap<&'a str, Vec<(&'a str, &'a str, u32)>>,
    default_list_name: &'a str,
    active_list_name: &'a str,
    theme: ThemeVariant,
    weather_location: &'a str,
    default_locations: &'a [String],
}

// ============================================================================
// PersistedState
// ============================================================================

/// Everything the application keeps between runs.
#[derive(Debug, Clone)]
pub struct PersistedState {
    pub lists: ListLibrary,
    pub theme: ThemeVariant,
    pub locations: Locations,
}

impl PersistedState {
    /// Fresh state: the standard default list, light theme, built-in locations.
    pub fn initial() -> Self {
        let (lists, _) = ListLibrary::from_parts(BTreeMap::new(), STANDARD_DEFAULT_LIST, None);
        Self {
            lists,
            theme: ThemeVariant::default(),
            locations: Locations::default(),
        }
    }

    /// Decode a state document. The flag is true when defaults had to be
    /// filled in and the result should be saved back.
    pub fn from_json(json: &str) -> Result<(Self, bool), StateError> {
        let raw: StateFileIn = serde_json::from_str(json)?;

        let mut saved = BTreeMap::new();
        for (name, value) in raw.saved_lists {
            match serde_json::from_value::<StoredList>(value) {
                Ok(list) => {
                    saved.insert(name, list.into_feed_list());
                }
                Err(e) => {
                    tracing::warn!(list = %name, error = %e, "Skipping unreadable saved list");
                }
            }
        }

        let (lists, repaired) = ListLibrary::from_parts(
            saved,
            &raw.default_list_name,
            raw.active_list_name.as_deref(),
        );

        let theme = match raw.theme.as_deref() {
            None => ThemeVariant::default(),
            Some(name) => ThemeVariant::from_str_name(name).unwrap_or_else(|| {
                tracing::warn!(theme = %name, "Unknown theme in state file, using light");
                ThemeVariant::default()
            }),
        };

        let locations = Locations::from_parts(
            raw.default_locations,
            raw.weather_location
                .unwrap_or_else(|| DEFAULT_LOCATION.to_owned()),
        );

        Ok((
            Self {
                lists,
                theme,
                locations,
            },
            repaired,
        ))
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        let saved_lists = self
            .lists
            .saved()
            .iter()
            .map(|(name, list)| {
                let rows = list
                    .categories()
                    .iter()
                    .map(|c| (c.name.as_str(), c.source.as_str(), c.row))
                    .collect();
                (name.as_str(), rows)
            })
            .collect();

        let out = StateFileOut {
            saved_lists,
            default_list_name: self.lists.default_name(),
            active_list_name: self.lists.active_name(),
            theme: self.theme,
            weather_location: self.locations.current(),
            default_locations: self.locations.all(),
        };
        Ok(serde_json::to_string_pretty(&out)?)
    }
}

// ============================================================================
// StateStore
// ============================================================================

/// Reads and writes [`PersistedState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/state.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state file.
    ///
    /// A missing file yields [`PersistedState::initial`] with the repair flag
    /// set so the caller writes it out.
    pub fn load(&self) -> Result<(PersistedState, bool), StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No state file, using defaults");
                return Ok((PersistedState::initial(), true));
            }
            Err(e) => return Err(StateError::Read(e)),
        };

        if content.trim().is_empty() {
            return Ok((PersistedState::initial(), true));
        }

        let (state, repaired) = PersistedState::from_json(&content)?;
        tracing::info!(
            path = %self.path.display(),
            lists = state.lists.saved().len(),
            active = %state.lists.active_name(),
            "Loaded state"
        );
        Ok((state, repaired))
    }

    /// Load, falling back to defaults on any error.
    ///
    /// Read and parse failures are logged; the returned flag says whether
    /// the state should be written back.
    pub fn load_or_default(&self) -> (PersistedState, bool) {
        match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not load state, using defaults");
                (PersistedState::initial(), false)
            }
        }
    }

    /// Write the state atomically (temp file + rename).
    pub fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let json = state.to_json()?;
        self.write_atomic(json.as_bytes())
            .map_err(|source| StateError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), "State saved");
        Ok(())
    }

    fn write_atomic(&self, content: &[u8]) -> std::io::Result<()> {
        use std::time::{SystemTime, UNIX_EPOCH};

        // unpredictable temp name; create_new refuses to follow a planted file
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = self.path.with_extension(format!("tmp.{:016x}", suffix));

        let result = (|| {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)?;
            file.write_all(content)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, &self.path)
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
