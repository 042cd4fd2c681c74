//! Integration tests for feed lists and their persistence.
//!
//! Each test writes its state file under its own directory in the system
//! temp dir and removes it afterwards.

use newsdeck::storage::{
    CategoryDraft, ListError, ListTemplate, PersistedState, StateStore, DEFAULT_FEEDS,
    STANDARD_DEFAULT_LIST,
};
use newsdeck::theme::ThemeVariant;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("newsdeck_lists_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn draft(name: &str, source: &str, row: &str) -> CategoryDraft {
    CategoryDraft::parse(name, source, row).unwrap()
}

fn rows_of(state: &PersistedState, list: &str) -> Vec<(String, String, u32)> {
    state.lists.saved()[list]
        .categories()
        .iter()
        .map(|c| (c.name.clone(), c.source.clone(), c.row))
        .collect()
}

// ============================================================================
// Edit, save, reload
// ============================================================================

#[test]
fn test_saved_edits_survive_reload() {
    let dir = test_dir("saved_edits");
    let store = StateStore::in_dir(&dir);

    let (mut state, _) = store.load().unwrap();
    state
        .lists
        .add_category(draft("Science", "https://science.example/rss", "2"))
        .unwrap();
    state.lists.save();
    store.save(&state).unwrap();

    let (reloaded, repaired) = store.load().unwrap();
    assert!(!repaired);
    let rows = rows_of(&reloaded, STANDARD_DEFAULT_LIST);
    assert_eq!(rows.len(), DEFAULT_FEEDS.len() + 1);
    assert_eq!(
        rows.last().unwrap(),
        &(
            "Science".to_string(),
            "https://science.example/rss".to_string(),
            2
        )
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_unsaved_edits_are_not_persisted() {
    let dir = test_dir("unsaved_edits");
    let store = StateStore::in_dir(&dir);

    let (mut state, _) = store.load().unwrap();
    state.lists.remove_category("World").unwrap();
    assert!(state.lists.is_dirty());
    // Persisting without Save writes the saved mapping only
    store.save(&state).unwrap();

    let (reloaded, _) = store.load().unwrap();
    assert!(reloaded.lists.working().get("World").is_some());
    assert!(!reloaded.lists.is_dirty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_duplicate_category_leaves_list_unchanged() {
    let (mut state, _) = PersistedState::from_json("{}").unwrap();
    let before = state.lists.working().clone();

    let err = state
        .lists
        .add_category(draft("Finance", "https://other.example/rss", ""))
        .unwrap_err();

    assert_eq!(err, ListError::CategoryExists("Finance".into()));
    assert_eq!(state.lists.working(), &before);
    assert!(!state.lists.is_dirty());
}

#[test]
fn test_save_as_then_switch_lists() {
    let dir = test_dir("save_as_switch");
    let store = StateStore::in_dir(&dir);

    let (mut state, _) = store.load().unwrap();
    state.lists.remove_category("Finance").unwrap();
    state.lists.save_as("Morning", false).unwrap();
    state.lists.set_default("Morning").unwrap();
    store.save(&state).unwrap();

    let (mut reloaded, _) = store.load().unwrap();
    assert_eq!(reloaded.lists.active_name(), "Morning");
    assert_eq!(reloaded.lists.default_name(), "Morning");
    assert_eq!(reloaded.lists.working().len(), DEFAULT_FEEDS.len() - 1);

    reloaded.lists.open(STANDARD_DEFAULT_LIST).unwrap();
    assert_eq!(reloaded.lists.working().len(), DEFAULT_FEEDS.len());

    assert_eq!(
        reloaded.lists.save_as("Morning", false),
        Err(ListError::ListExists("Morning".into()))
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_delete_rules() {
    let (mut state, _) = PersistedState::from_json("{}").unwrap();
    state.lists.create("Evening", ListTemplate::Blank).unwrap();
    assert!(state.lists.working().is_empty());

    assert_eq!(
        state.lists.delete("Evening"),
        Err(ListError::DeleteActiveList("Evening".into()))
    );

    state.lists.open(STANDARD_DEFAULT_LIST).unwrap();
    assert_eq!(
        state.lists.delete(STANDARD_DEFAULT_LIST),
        Err(ListError::DeleteDefaultList(STANDARD_DEFAULT_LIST.into()))
    );

    state.lists.delete("Evening").unwrap();
    assert!(!state.lists.contains("Evening"));
}

// ============================================================================
// Legacy and damaged state files
// ============================================================================

#[test]
fn test_legacy_shapes_normalize_to_rows() {
    let json = r#"{
        "saved_lists": {
            "Mapped": {"Zeta": "https://z.example/rss", "Alpha": "https://a.example/rss"},
            "Pairs": [["News", "https://n.example/rss"]],
            "Triples": [["Sport", "https://s.example/rss", 3]]
        },
        "default_list_name": "Pairs"
    }"#;

    let (state, _) = PersistedState::from_json(json).unwrap();

    assert_eq!(
        rows_of(&state, "Mapped"),
        vec![
            ("Zeta".to_string(), "https://z.example/rss".to_string(), 1),
            ("Alpha".to_string(), "https://a.example/rss".to_string(), 1),
        ]
    );
    assert_eq!(
        rows_of(&state, "Pairs"),
        vec![("News".to_string(), "https://n.example/rss".to_string(), 1)]
    );
    assert_eq!(
        rows_of(&state, "Triples"),
        vec![("Sport".to_string(), "https://s.example/rss".to_string(), 3)]
    );
    assert_eq!(state.lists.active_name(), "Pairs");
}

#[test]
fn test_legacy_file_is_rewritten_as_rows() {
    let dir = test_dir("legacy_rewrite");
    let store = StateStore::in_dir(&dir);
    std::fs::write(
        store.path(),
        r#"{"saved_lists": {"Old": {"Tech": "https://t.example/rss"}}, "default_list_name": "Old"}"#,
    )
    .unwrap();

    let (state, _) = store.load().unwrap();
    store.save(&state).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        written["saved_lists"]["Old"],
        serde_json::json!([["Tech", "https://t.example/rss", 1]])
    );
    assert_eq!(written["active_list_name"], "Old");
    assert_eq!(written["theme"], "light");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_default_list_is_recreated() {
    let json = r#"{"saved_lists": {"Mine": []}, "default_list_name": "Gone"}"#;

    let (state, repaired) = PersistedState::from_json(json).unwrap();

    assert!(repaired);
    assert_eq!(state.lists.default_name(), STANDARD_DEFAULT_LIST);
    assert_eq!(state.lists.active_name(), STANDARD_DEFAULT_LIST);
    assert_eq!(
        state.lists.working().len(),
        DEFAULT_FEEDS.len(),
        "standard list carries the built-in feeds"
    );
    assert!(state.lists.contains("Mine"));
}

#[test]
fn test_corrupt_file_falls_back_without_overwrite() {
    let dir = test_dir("corrupt");
    let store = StateStore::in_dir(&dir);
    std::fs::write(store.path(), "{ not json").unwrap();

    assert!(store.load().is_err());
    let (state, repaired) = store.load_or_default();

    assert!(!repaired);
    assert_eq!(state.lists.active_name(), STANDARD_DEFAULT_LIST);
    assert_eq!(state.theme, ThemeVariant::Light);
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{ not json");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_theme_and_location_persist() {
    let dir = test_dir("theme_location");
    let store = StateStore::in_dir(&dir);

    let (mut state, _) = store.load().unwrap();
    state.theme = state.theme.toggle();
    let added = state.locations.add("Reykjavik, is").unwrap();
    state.locations.select(&added).unwrap();
    store.save(&state).unwrap();

    let (reloaded, _) = store.load().unwrap();
    assert_eq!(reloaded.theme, ThemeVariant::Dark);
    assert_eq!(reloaded.locations.current(), added);
    assert!(reloaded.locations.all().contains(&added));

    let _ = std::fs::remove_dir_all(&dir);
}
