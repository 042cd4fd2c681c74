//! Keybinding registry: maps key events to actions, with config overrides.
//!
//! Defaults are registered per panel context; `[keybindings]` in
//! config.toml can rebind any action.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All operator actions reachable from the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    Select,
    NextPage,
    PrevPage,
    Refresh,
    AddCategory,
    EditCategory,
    RemoveCategory,
    MoveCategoryUp,
    MoveCategoryDown,
    NewList,
    ManageLists,
    SaveList,
    SaveListAs,
    ToggleTheme,
    Search,
    NextMatch,
    NextLocation,
    PrevLocation,
    ManageLocations,
    OpenInBrowser,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Move down",
            Self::NavUp => "Move up",
            Self::CycleFocus => "Switch panel",
            Self::Select => "Show category / open headline",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::Refresh => "Refresh displayed category",
            Self::AddCategory => "Add feed",
            Self::EditCategory => "Edit feed",
            Self::RemoveCategory => "Remove feed",
            Self::MoveCategoryUp => "Move feed up",
            Self::MoveCategoryDown => "Move feed down",
            Self::NewList => "New list",
            Self::ManageLists => "Open / delete / default list",
            Self::SaveList => "Save list",
            Self::SaveListAs => "Save list as",
            Self::ToggleTheme => "Toggle light/dark theme",
            Self::Search => "Search headlines",
            Self::NextMatch => "Next search match",
            Self::NextLocation => "Next weather location",
            Self::PrevLocation => "Previous weather location",
            Self::ManageLocations => "Choose / add weather location",
            Self::OpenInBrowser => "Open headline in browser",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: the focused panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Categories,
    Articles,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Anywhere",
            Self::Categories => "Feeds panel",
            Self::Articles => "Headlines panel",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    /// Shift is dropped for characters: terminals report `K` either way.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "K", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right", "Space"
/// - Modifier combos: "Ctrl+r"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "pageup" => return Some(KeySpec::plain(KeyCode::PageUp)),
        "pagedown" => return Some(KeySpec::plain(KeyCode::PageDown)),
        "space" => return Some(KeySpec::char(' ')),
        _ => {}
    }

    if let Some(n) = s
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u8>().ok())
    {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; the
/// focused panel's bindings win over global ones.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Action::*;
        use Context::*;

        let defaults = [
            (Global, KeySpec::char('q'), Quit),
            (Global, KeySpec::char('j'), NavDown),
            (Global, KeySpec::plain(KeyCode::Down), NavDown),
            (Global, KeySpec::char('k'), NavUp),
            (Global, KeySpec::plain(KeyCode::Up), NavUp),
            (Global, KeySpec::plain(KeyCode::Tab), CycleFocus),
            (Global, KeySpec::plain(KeyCode::Enter), Select),
            (Global, KeySpec::char(']'), NextPage),
            (Global, KeySpec::plain(KeyCode::PageDown), NextPage),
            (Global, KeySpec::char('['), PrevPage),
            (Global, KeySpec::plain(KeyCode::PageUp), PrevPage),
            (Global, KeySpec::char('r'), Refresh),
            (Global, KeySpec::char('a'), AddCategory),
            (Global, KeySpec::char('N'), NewList),
            (Global, KeySpec::char('O'), ManageLists),
            (Global, KeySpec::char('s'), SaveList),
            (Global, KeySpec::char('S'), SaveListAs),
            (Global, KeySpec::char('t'), ToggleTheme),
            (Global, KeySpec::char('/'), Search),
            (Global, KeySpec::char('n'), NextMatch),
            (Global, KeySpec::char('w'), NextLocation),
            (Global, KeySpec::char('W'), PrevLocation),
            (Global, KeySpec::char('L'), ManageLocations),
            (Global, KeySpec::char('o'), OpenInBrowser),
            (Global, KeySpec::char('?'), ShowHelp),
            (Categories, KeySpec::char('e'), EditCategory),
            (Categories, KeySpec::char('d'), RemoveCategory),
            (Categories, KeySpec::char('K'), MoveCategoryUp),
            (Categories, KeySpec::char('J'), MoveCategoryDown),
            (Articles, KeySpec::char('l'), NextPage),
            (Articles, KeySpec::plain(KeyCode::Right), NextPage),
            (Articles, KeySpec::char('h'), PrevPage),
            (Articles, KeySpec::plain(KeyCode::Left), PrevPage),
        ];

        for (context, key, action) in defaults {
            self.bind(context, key, action);
        }
    }

    /// Apply user overrides from the config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "refresh", "next_page").
    /// Values are key strings (e.g., "r", "Ctrl+r", "F5").
    ///
    /// Returns a warning for each unrecognized action name or unparseable key.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key, trying `context` first and then Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }
        if context != Context::Global {
            return self.lookup.get(&(Context::Global, key)).copied();
        }
        None
    }

    /// All bindings as (context, key label, description), for the help screen.
    pub fn all_bindings(&self) -> Vec<(Context, String, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "cycle_focus" | "tab" => Some(Action::CycleFocus),
        "select" | "enter" => Some(Action::Select),
        "next_page" => Some(Action::NextPage),
        "prev_page" => Some(Action::PrevPage),
        "refresh" => Some(Action::Refresh),
        "add_category" | "add_feed" => Some(Action::AddCategory),
        "edit_category" | "edit_feed" => Some(Action::EditCategory),
        "remove_category" | "remove_feed" => Some(Action::RemoveCategory),
        "move_up" => Some(Action::MoveCategoryUp),
        "move_down" => Some(Action::MoveCategoryDown),
        "new_list" => Some(Action::NewList),
        "manage_lists" | "lists" => Some(Action::ManageLists),
        "save_list" | "save" => Some(Action::SaveList),
        "save_list_as" | "save_as" => Some(Action::SaveListAs),
        "toggle_theme" | "theme" => Some(Action::ToggleTheme),
        "search" => Some(Action::Search),
        "next_match" => Some(Action::NextMatch),
        "next_location" => Some(Action::NextLocation),
        "prev_location" => Some(Action::PrevLocation),
        "manage_locations" | "locations" => Some(Action::ManageLocations),
        "open_in_browser" | "open" => Some(Action::OpenInBrowser),
        "show_help" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(reg: &KeybindingRegistry, code: KeyCode, context: Context) -> Option<Action> {
        reg.action_for_key(code, KeyModifiers::NONE, context)
    }

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_panel_context_falls_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char('r'), Context::Articles),
            Some(Action::Refresh)
        );
        assert_eq!(
            lookup(&reg, KeyCode::Char('e'), Context::Categories),
            Some(Action::EditCategory)
        );
        assert_eq!(lookup(&reg, KeyCode::Char('e'), Context::Articles), None);
    }

    #[test]
    fn test_shifted_chars_ignore_shift_modifier() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('K'), KeyModifiers::SHIFT, Context::Categories),
            Some(Action::MoveCategoryUp)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('S'), KeyModifiers::SHIFT, Context::Global),
            Some(Action::SaveListAs)
        );
    }

    #[test]
    fn test_article_panel_page_keys() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            lookup(&reg, KeyCode::Char('l'), Context::Articles),
            Some(Action::NextPage)
        );
        assert_eq!(lookup(&reg, KeyCode::Left, Context::Articles), Some(Action::PrevPage));
        assert_eq!(lookup(&reg, KeyCode::Char('l'), Context::Categories), None);
    }

    #[test]
    fn test_apply_overrides_rebinds_in_same_contexts() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("refresh".to_string(), "F5".to_string()),
            ("remove_feed".to_string(), "x".to_string()),
        ]);
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(lookup(&reg, KeyCode::F(5), Context::Global), Some(Action::Refresh));
        assert_eq!(lookup(&reg, KeyCode::Char('r'), Context::Global), None);
        assert_eq!(
            lookup(&reg, KeyCode::Char('x'), Context::Categories),
            Some(Action::RemoveCategory)
        );
        assert_eq!(lookup(&reg, KeyCode::Char('x'), Context::Global), None);
    }

    #[test]
    fn test_apply_overrides_warnings() {
        let mut reg = KeybindingRegistry::new();
        let overrides = HashMap::from([
            ("fly".to_string(), "f".to_string()),
            ("quit".to_string(), "Ctrl+".to_string()),
        ]);
        let mut warnings = reg.apply_overrides(&overrides);
        warnings.sort();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Cannot parse key"));
        assert!(warnings[1].contains("Unknown action 'fly'"));
        assert_eq!(lookup(&reg, KeyCode::Char('q'), Context::Global), Some(Action::Quit));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::char(' ')));
        assert_eq!(parse_key_string("F12"), Some(KeySpec::plain(KeyCode::F(12))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+r"), Some(KeySpec::ctrl('r')));
        assert_eq!(parse_key_string("f"), Some(KeySpec::char('f')));
        assert_eq!(parse_key_string("ab"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::ctrl('r')), "Ctrl+r");
        assert_eq!(format_key(&KeySpec::char(' ')), "Space");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_all_bindings_describe_every_default() {
        let reg = KeybindingRegistry::new();
        let bindings = reg.all_bindings();
        assert!(bindings
            .iter()
            .any(|(ctx, key, desc)| *ctx == Context::Categories && key == "d" && *desc == "Remove feed"));
    }
}
