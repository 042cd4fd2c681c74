//! Render functions for the TUI.
//!
//! Header (clock, weather, active list), the categories and headlines
//! panels, the status bar, and whichever overlay is open.

use crate::app::{App, Overlay, Prompt};
use crate::keybindings::KeybindingRegistry;
use crate::storage::FeedList;
use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{articles, categories, help, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

const CLOCK_FORMAT: &str = "%A, %B %d, %Y | %H:%M:%S";

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App, keys: &KeybindingRegistry) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    f.render_widget(Block::default().style(app.palette.base), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_main_panels(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    match &app.overlay {
        None => {}
        Some(Overlay::Help { scroll }) => help::render(f, app, keys, *scroll),
        Some(Overlay::Prompt(prompt)) => render_prompt(f, app, prompt),
        Some(Overlay::Confirm(action)) => {
            let text = format!("{}\n\n(y) Confirm  (n/Esc) Cancel", action.question());
            render_dialog(f, app, " Confirm ", text, 56, 7);
        }
        Some(Overlay::Lists { selected }) => render_lists(f, app, *selected),
        Some(Overlay::Locations { selected }) => render_locations(f, app, *selected),
    }
}

/// Clock on the left, weather and list name on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let clock = Local::now().format(CLOCK_FORMAT).to_string();
    let right = format!("{}  |  List: {}", app.weather_text(), app.state.lists.active_name());

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    f.render_widget(
        Paragraph::new(format!(" {}", clock)).style(app.palette.header),
        halves[0],
    );
    f.render_widget(
        Paragraph::new(format!("{} ", right))
            .alignment(Alignment::Right)
            .style(app.palette.header),
        halves[1],
    );
}

fn render_main_panels(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
        .split(area);

    categories::render(f, app, chunks[0]);
    articles::render(f, app, chunks[1]);
}

/// Create a rectangle of at most `width` x `height` centered in `area`.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_dialog<'a>(
    f: &mut Frame,
    app: &App,
    title: &'a str,
    text: impl Into<ratatui::text::Text<'a>>,
    width: u16,
    height: u16,
) {
    let overlay = centered_fixed(width, height, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.panel_border_focused)
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .style(app.palette.base);
    f.render_widget(paragraph, overlay);
}

fn render_prompt(f: &mut Frame, app: &App, prompt: &Prompt) {
    let mut lines = Vec::with_capacity(prompt.fields.len() * 3 + 2);
    for (i, field) in prompt.fields.iter().enumerate() {
        let focused = i == prompt.focused;
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            app.palette.input.patch(app.palette.category_selected)
        } else {
            app.palette.input
        };
        lines.push(Line::from(Span::styled(field.label, app.palette.row_label)));
        lines.push(Line::from(Span::styled(format!("> {}{}", field.value, cursor), style)));
        lines.push(Line::from(""));
    }
    let hint = if prompt.fields.len() > 1 {
        "(Enter) Submit  (Tab) Next field  (Esc) Cancel"
    } else {
        "(Enter) Submit  (Esc) Cancel"
    };
    lines.push(Line::from(Span::styled(hint, app.palette.row_label)));

    let height = lines.len() as u16 + 2;
    render_dialog(f, app, prompt.title(), lines, 64, height);
}

fn list_summary(list: &FeedList) -> String {
    match list.len() {
        1 => "1 feed".to_string(),
        n => format!("{} feeds", n),
    }
}

fn render_lists(f: &mut Frame, app: &App, selected: usize) {
    let lists = &app.state.lists;
    let mut lines: Vec<Line> = lists
        .saved()
        .iter()
        .enumerate()
        .map(|(i, (name, list))| {
            let pointer = if i == selected { ">" } else { " " };
            let mut tags = Vec::new();
            if name == lists.active_name() {
                tags.push("active");
            }
            if name == lists.default_name() {
                tags.push("default");
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            };
            let style = if i == selected {
                app.palette.category_selected
            } else {
                app.palette.base
            };
            Line::from(Span::styled(
                format!("{} {} ({}){}", pointer, name, list_summary(list), tags),
                style,
            ))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(Enter) Open  (n) New  (d) Delete  (D) Set default  (Esc) Close",
        app.palette.row_label,
    )));

    let height = lines.len() as u16 + 2;
    render_dialog(f, app, " Saved Lists ", lines, 70, height);
}

fn render_locations(f: &mut Frame, app: &App, selected: usize) {
    let locations = &app.state.locations;
    let mut lines: Vec<Line> = locations
        .all()
        .iter()
        .enumerate()
        .map(|(i, location)| {
            let pointer = if i == selected { ">" } else { " " };
            let current = if location == locations.current() { " *" } else { "" };
            let style = if i == selected {
                app.palette.category_selected
            } else {
                app.palette.base
            };
            Line::from(Span::styled(format!("{} {}{}", pointer, location, current), style))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(Enter) Select  (a) Add  (x) No location  (Esc) Close",
        app.palette.row_label,
    )));

    let height = lines.len() as u16 + 2;
    render_dialog(f, app, " Weather Location ", lines, 60, height);
}
