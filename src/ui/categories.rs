use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the categories of the working list, grouped by display row.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let palette = &app.palette;
    let working = app.state.lists.working();
    let rows = working.rows();
    let show_row_labels = rows.len() > 1;

    let mut items: Vec<ListItem> = Vec::with_capacity(working.len() + rows.len());
    let mut selected_item = None;
    let mut index = 0;

    for (row, categories) in &rows {
        if show_row_labels {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("Row {}", row),
                palette.row_label,
            ))));
        }
        for category in categories {
            let is_selected = index == app.selected_category;
            let is_active = app.active_source.as_deref() == Some(category.source.as_str());

            let mut style = if is_selected {
                palette.category_selected
            } else {
                palette.category
            };
            if is_active {
                style = style.patch(palette.category_active);
            }

            let marker = if app.is_fetching(&category.source) {
                " ~"
            } else {
                ""
            };
            if is_selected {
                selected_item = Some(items.len());
            }
            items.push(ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", category.name), style),
                Span::styled(marker, palette.row_label),
            ])));
            index += 1;
        }
    }

    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "No feeds. Press 'a' to add one.",
            palette.row_label,
        )));
    }

    let border_style = if app.focus == Focus::Categories {
        palette.panel_border_focused
    } else {
        palette.panel_border
    };
    let dirty = if app.state.lists.is_dirty() { " *" } else { "" };
    let title = format!(" {}{} ", app.state.lists.active_name(), dirty);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .style(palette.base)
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(selected_item);
    f.render_stateful_widget(list, area, &mut state);
}
