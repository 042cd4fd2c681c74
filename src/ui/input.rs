//! Input handling for the TUI.
//!
//! Overlays capture all keys while open; otherwise keys are resolved through
//! the keybinding registry for the focused panel.

use crate::app::{App, ConfirmAction, FetchTrigger, Focus, Overlay, Prompt, PromptKind};
use crate::keybindings::{Action as KbAction, Context as KbContext, KeybindingRegistry};
use crossterm::event::{KeyCode, KeyModifiers};

use super::helpers::{open_selected_article, run_optional, TaskContext};
use super::Action;

/// Longest accepted value for a single prompt field.
const MAX_FIELD_LENGTH: usize = 2048;

fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Categories => KbContext::Categories,
        Focus::Articles => KbContext::Articles,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    keys: &KeybindingRegistry,
    ctx: &TaskContext,
) -> Action {
    // Ctrl+C quits from anywhere; unsaved list edits ask first, and a second
    // Ctrl+C on that question quits without saving
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        if matches!(app.overlay, Some(Overlay::Confirm(ConfirmAction::QuitUnsaved))) {
            return Action::Quit;
        }
        app.overlay = None;
        return run_optional(app.request_quit(), ctx);
    }

    match app.overlay.take() {
        Some(Overlay::Help { scroll }) => {
            handle_help_input(app, scroll, code);
            Action::Continue
        }
        Some(Overlay::Prompt(prompt)) => handle_prompt_input(app, prompt, code, ctx),
        Some(Overlay::Confirm(action)) => {
            app.overlay = Some(Overlay::Confirm(action));
            handle_confirm_input(app, code, ctx)
        }
        Some(Overlay::Lists { selected }) => {
            handle_lists_input(app, selected, code);
            Action::Continue
        }
        Some(Overlay::Locations { selected }) => {
            handle_locations_input(app, selected, code);
            Action::Continue
        }
        None => handle_main_input(app, code, modifiers, keys, ctx),
    }
}

/// j/k scroll, Esc/q/? dismiss; other keys keep the overlay open.
fn handle_help_input(app: &mut App, scroll: usize, code: KeyCode) {
    let scroll = match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => return,
        KeyCode::Char('j') | KeyCode::Down => scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => scroll.saturating_sub(1),
        _ => scroll,
    };
    app.overlay = Some(Overlay::Help { scroll });
}

fn handle_prompt_input(app: &mut App, mut prompt: Prompt, code: KeyCode, ctx: &TaskContext) -> Action {
    match code {
        KeyCode::Esc => {
            if prompt.kind == PromptKind::AddLocation {
                app.open_locations();
            }
            return Action::Continue;
        }
        KeyCode::Enter => {
            app.overlay = Some(Overlay::Prompt(prompt));
            return run_optional(app.submit_prompt(), ctx);
        }
        KeyCode::Tab | KeyCode::Down => prompt.next_field(),
        KeyCode::Backspace => {
            if let Some(input) = prompt.input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(c) if !c.is_control() => {
            if let Some(input) = prompt.input_mut() {
                if input.chars().count() < MAX_FIELD_LENGTH {
                    input.push(c);
                }
            }
        }
        _ => {}
    }
    app.overlay = Some(Overlay::Prompt(prompt));
    Action::Continue
}

/// y/Enter accepts, n/Esc declines.
fn handle_confirm_input(app: &mut App, code: KeyCode, ctx: &TaskContext) -> Action {
    let accepted = match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
        _ => return Action::Continue,
    };
    run_optional(app.resolve_confirm(accepted), ctx)
}

/// Saved lists picker: Enter opens, d deletes, D makes default, n creates.
fn handle_lists_input(app: &mut App, selected: usize, code: KeyCode) {
    let names = app.list_names();
    let selected = selected.min(names.len().saturating_sub(1));
    let name = names.get(selected).cloned();

    match code {
        KeyCode::Esc | KeyCode::Char('q') => return,
        KeyCode::Char('j') | KeyCode::Down => {
            app.overlay = Some(Overlay::Lists {
                selected: (selected + 1).min(names.len().saturating_sub(1)),
            });
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.overlay = Some(Overlay::Lists {
                selected: selected.saturating_sub(1),
            });
            return;
        }
        KeyCode::Char('n') => {
            app.open_new_list();
            return;
        }
        KeyCode::Enter => {
            if let Some(name) = name {
                app.request_open_list(&name);
            }
            return;
        }
        KeyCode::Char('d') => {
            if let Some(name) = name {
                app.overlay = Some(Overlay::Confirm(ConfirmAction::DeleteList { name }));
            }
            return;
        }
        KeyCode::Char('D') => {
            if let Some(name) = name {
                app.set_default_list(&name);
            }
        }
        _ => {}
    }
    app.overlay = Some(Overlay::Lists { selected });
}

/// Weather locations picker: Enter selects, a adds, x clears the location.
fn handle_locations_input(app: &mut App, selected: usize, code: KeyCode) {
    let len = app.state.locations.all().len();
    let selected = selected.min(len.saturating_sub(1));

    match code {
        KeyCode::Esc | KeyCode::Char('q') => {}
        KeyCode::Char('j') | KeyCode::Down => {
            app.overlay = Some(Overlay::Locations {
                selected: (selected + 1).min(len.saturating_sub(1)),
            });
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.overlay = Some(Overlay::Locations {
                selected: selected.saturating_sub(1),
            });
        }
        KeyCode::Enter => {
            if let Some(location) = app.state.locations.all().get(selected).cloned() {
                app.select_location(&location);
            }
        }
        KeyCode::Char('x') => app.clear_location(),
        KeyCode::Char('a') => app.open_add_location(),
        _ => app.overlay = Some(Overlay::Locations { selected }),
    }
}

/// Handle input on the main screen (categories + headlines panels).
fn handle_main_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    keys: &KeybindingRegistry,
    ctx: &TaskContext,
) -> Action {
    // Digits jump straight to a page
    if let KeyCode::Char(c @ '1'..='9') = code {
        if let Some(page) = c.to_digit(10) {
            app.goto_page(page as usize);
        }
        return Action::Continue;
    }

    let context = focus_to_context(app.focus);
    let Some(action) = keys.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return run_optional(app.request_quit(), ctx),
        KbAction::NavDown | KbAction::NavUp => {
            let down = action == KbAction::NavDown;
            match app.focus {
                Focus::Categories => app.nav_category(down),
                Focus::Articles => app.nav_article(down),
            }
        }
        KbAction::CycleFocus => {
            app.focus = match app.focus {
                Focus::Categories => Focus::Articles,
                Focus::Articles => Focus::Categories,
            };
        }
        KbAction::Select => match app.focus {
            Focus::Categories => return run_optional(app.select_current_category(), ctx),
            Focus::Articles => open_selected_article(app),
        },
        KbAction::NextPage => app.next_page(),
        KbAction::PrevPage => app.prev_page(),
        KbAction::Refresh => return run_optional(app.refresh(FetchTrigger::ManualRefresh), ctx),
        KbAction::AddCategory => app.open_add_category(),
        KbAction::EditCategory => app.open_edit_category(),
        KbAction::RemoveCategory => app.confirm_remove_category(),
        KbAction::MoveCategoryUp => app.move_selected_category(true),
        KbAction::MoveCategoryDown => app.move_selected_category(false),
        KbAction::NewList => app.open_new_list(),
        KbAction::ManageLists => app.open_lists(),
        KbAction::SaveList => app.save_list(),
        KbAction::SaveListAs => app.open_save_as(),
        KbAction::ToggleTheme => app.toggle_theme(),
        KbAction::Search => app.open_search(),
        KbAction::NextMatch => app.next_match(),
        KbAction::NextLocation => app.cycle_location(true),
        KbAction::PrevLocation => app.cycle_location(false),
        KbAction::ManageLocations => app.open_locations(),
        KbAction::OpenInBrowser => open_selected_article(app),
        KbAction::ShowHelp => app.overlay = Some(Overlay::Help { scroll: 0 }),
    }
    Action::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::feed::HttpFetcher;
    use crate::storage::{PersistedState, StateStore};
    use crate::weather::NO_LOCATION;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn setup(name: &str) -> (App, TaskContext, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("newsdeck_input_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let app = App::new(
            PersistedState::initial(),
            Settings::default(),
            StateStore::in_dir(&dir),
            None,
        );
        let (tx, _rx) = mpsc::channel(8);
        let ctx = TaskContext {
            fetcher: HttpFetcher::with_client(reqwest::Client::new(), Duration::from_secs(1)),
            tx,
            max_entries: 100,
            validation_timeout: Duration::from_secs(1),
        };
        (app, ctx, dir)
    }

    fn press(app: &mut App, ctx: &TaskContext, code: KeyCode) -> Action {
        let keys = KeybindingRegistry::new();
        handle_input(app, code, KeyModifiers::NONE, &keys, ctx)
    }

    fn type_text(app: &mut App, ctx: &TaskContext, text: &str) {
        for c in text.chars() {
            press(app, ctx, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_quit_with_clean_list() {
        let (mut app, ctx, dir) = setup("quit");
        assert!(matches!(press(&mut app, &ctx, KeyCode::Char('q')), Action::Quit));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_quit_with_unsaved_changes_needs_confirmation() {
        let (mut app, ctx, dir) = setup("quit_dirty");
        app.remove_category("World");

        assert!(matches!(press(&mut app, &ctx, KeyCode::Char('q')), Action::Continue));
        assert_eq!(app.overlay, Some(Overlay::Confirm(ConfirmAction::QuitUnsaved)));
        assert!(matches!(press(&mut app, &ctx, KeyCode::Char('x')), Action::Continue));
        assert!(matches!(press(&mut app, &ctx, KeyCode::Char('y')), Action::Quit));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_ctrl_c_asks_before_dropping_unsaved_changes() {
        let (mut app, ctx, dir) = setup("ctrl_c_dirty");
        let keys = KeybindingRegistry::new();
        app.remove_category("World");
        app.open_search();

        let first = handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &keys, &ctx);
        assert!(matches!(first, Action::Continue));
        assert_eq!(app.overlay, Some(Overlay::Confirm(ConfirmAction::QuitUnsaved)));

        let second = handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &keys, &ctx);
        assert!(matches!(second, Action::Quit));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_clean_list_from_overlay() {
        let (mut app, ctx, dir) = setup("ctrl_c_clean");
        let keys = KeybindingRegistry::new();
        app.open_lists();

        let action = handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &keys, &ctx);
        assert!(matches!(action, Action::Quit));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let (mut app, ctx, dir) = setup("help");
        press(&mut app, &ctx, KeyCode::Char('?'));
        assert_eq!(app.overlay, Some(Overlay::Help { scroll: 0 }));

        // 't' would toggle the theme without the overlay
        press(&mut app, &ctx, KeyCode::Char('t'));
        press(&mut app, &ctx, KeyCode::Char('j'));
        assert_eq!(app.overlay, Some(Overlay::Help { scroll: 1 }));
        assert_eq!(app.theme, crate::theme::ThemeVariant::Light);

        press(&mut app, &ctx, KeyCode::Esc);
        assert!(app.overlay.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_save_as_prompt_flow() {
        let (mut app, ctx, dir) = setup("save_as_prompt");
        press(&mut app, &ctx, KeyCode::Char('S'));
        assert!(matches!(app.overlay, Some(Overlay::Prompt(_))));

        // Prefilled with the active list name
        for _ in 0.."Standard Default".len() {
            press(&mut app, &ctx, KeyCode::Backspace);
        }
        type_text(&mut app, &ctx, "Morning");
        press(&mut app, &ctx, KeyCode::Enter);

        assert!(app.overlay.is_none());
        assert_eq!(app.state.lists.active_name(), "Morning");
        assert!(app.state.lists.contains("Morning"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_add_category_prompt_rejects_duplicate() {
        let (mut app, ctx, dir) = setup("add_dup");
        press(&mut app, &ctx, KeyCode::Char('a'));
        type_text(&mut app, &ctx, "Finance");
        press(&mut app, &ctx, KeyCode::Tab);
        type_text(&mut app, &ctx, "https://example.com/rss");
        press(&mut app, &ctx, KeyCode::Enter);

        assert!(!app.is_validating());
        let status = app.status_message.as_ref().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("already exists"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_move_keys_only_in_categories_panel() {
        let (mut app, ctx, dir) = setup("move_keys");
        app.selected_category = 1;
        press(&mut app, &ctx, KeyCode::Char('K'));
        assert_eq!(app.current_category().unwrap().name, "Finance");
        assert_eq!(app.categories()[0].name, "Finance");

        press(&mut app, &ctx, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Articles);
        press(&mut app, &ctx, KeyCode::Char('J'));
        assert_eq!(app.categories()[0].name, "Finance");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_locations_picker_select_and_clear() {
        let (mut app, ctx, dir) = setup("locations");
        press(&mut app, &ctx, KeyCode::Char('L'));
        assert!(matches!(app.overlay, Some(Overlay::Locations { .. })));

        press(&mut app, &ctx, KeyCode::Char('x'));
        assert!(app.overlay.is_none());
        assert_eq!(app.state.locations.current(), NO_LOCATION);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_lists_picker_delete_asks_for_confirmation() {
        let (mut app, ctx, dir) = setup("lists_delete");
        app.create_list("Alpha", crate::storage::ListTemplate::Blank);
        app.open_list(crate::storage::STANDARD_DEFAULT_LIST);

        press(&mut app, &ctx, KeyCode::Char('O'));
        // Names sort alphabetically; "Alpha" comes first
        assert_eq!(app.overlay, Some(Overlay::Lists { selected: 1 }));
        press(&mut app, &ctx, KeyCode::Char('k'));
        press(&mut app, &ctx, KeyCode::Char('d'));
        assert_eq!(
            app.overlay,
            Some(Overlay::Confirm(ConfirmAction::DeleteList {
                name: "Alpha".into()
            }))
        );
        press(&mut app, &ctx, KeyCode::Char('y'));
        assert!(!app.state.lists.contains("Alpha"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
