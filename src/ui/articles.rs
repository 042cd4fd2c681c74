use crate::app::{App, Focus};
use crate::feed::{is_amalgamated, Article};
use crate::pagination::Page;
use crate::util::{first_sentence, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Format a timestamp relative to `now` (both Unix seconds).
pub fn format_relative_time(ts: i64, now: i64) -> String {
    let diff = now - ts;

    // Future dates (malformed feeds)
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }

    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%b %d").to_string())
        .unwrap_or_default()
}

/// Render the headlines panel: header, current page, page controls.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let palette = &app.palette;
    let border_style = if app.focus == Focus::Articles {
        palette.panel_border_focused
    } else {
        palette.panel_border
    };
    let title = app
        .headline_header()
        .unwrap_or_else(|| " Headlines ".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block.style(palette.base), area);

    let Some(source) = app.active_source.as_deref() else {
        render_message(f, inner, "Select a category to view headlines.", palette.row_label);
        return;
    };

    // A failed load replaces any headlines cached from an earlier fetch
    if let Some(e) = &app.load_error {
        render_message(f, inner, &format!("Error loading feed: {}", e), palette.error);
        return;
    }

    let Some(page) = app.current_page() else {
        render_message(f, inner, "Loading...", palette.row_label);
        return;
    };

    if page.total_items == 0 {
        render_message(f, inner, "No news entries found for this feed.", palette.row_label);
        return;
    }

    let (list_area, controls_area) = if page.shows_controls() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);
        (chunks[0], Some(chunks[1]))
    } else {
        (inner, None)
    };

    render_headlines(f, app, &page, is_amalgamated(source), list_area);
    if let Some(controls_area) = controls_area {
        render_page_controls(f, app, &page, controls_area);
    }
}

fn render_message(f: &mut Frame, area: Rect, text: &str, style: Style) {
    f.render_widget(
        Paragraph::new(text).style(style).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_headlines(
    f: &mut Frame,
    app: &App,
    page: &Page<'_, Article>,
    show_domain: bool,
    area: Rect,
) {
    let palette = &app.palette;
    let width = area.width.saturating_sub(2) as usize;
    let now = Utc::now().timestamp();

    let items: Vec<ListItem> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let is_selected = i == app.selected_article;
            let title_style = if app.is_match(page.offset() + i) {
                palette.search_match
            } else if is_selected {
                palette.headline_selected
            } else {
                palette.headline
            };

            let mut title_spans = Vec::with_capacity(3);
            let mut used = 0;
            if show_domain {
                let domain = format!("[{}] ", article.source_domain);
                used += domain.chars().count();
                title_spans.push(Span::styled(domain, palette.source_domain));
            }
            let time = if article.published_estimated {
                String::new()
            } else {
                format!("  {}", format_relative_time(article.published, now))
            };
            let room = width.saturating_sub(used + time.chars().count());
            title_spans.push(Span::styled(
                truncate_to_width(&article.title, room).into_owned(),
                title_style,
            ));
            title_spans.push(Span::styled(time, palette.row_label));

            let mut lines = vec![Line::from(title_spans)];
            let summary = first_sentence(&article.summary);
            if !summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    truncate_to_width(&summary, width).into_owned(),
                    palette.summary,
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).highlight_style(Style::default());
    let mut state = ListState::default().with_selected(Some(app.selected_article));
    f.render_stateful_widget(list, area, &mut state);
}

/// `< Previous  1 [2] 3 4 5  Next >`
fn render_page_controls(f: &mut Frame, app: &App, page: &Page<'_, Article>, area: Rect) {
    let palette = &app.palette;
    let mut spans = Vec::with_capacity(page.window.clone().count() * 2 + 4);

    let prev_style = if page.has_prev() {
        palette.page_button
    } else {
        palette.page_disabled
    };
    spans.push(Span::styled("< Previous", prev_style));
    spans.push(Span::raw("  "));

    for n in page.window.clone() {
        if n == page.number {
            spans.push(Span::styled(format!("[{}]", n), palette.page_current));
        } else {
            spans.push(Span::styled(format!(" {} ", n), palette.page_button));
        }
        spans.push(Span::raw(" "));
    }

    let next_style = if page.has_next() {
        palette.page_button
    } else {
        palette.page_disabled
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled("Next >", next_style));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
