use crate::app::{App, Focus};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar: the current message, or key hints.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let mut style = app.palette.status_bar;
    let text: Cow<'_, str> = if let Some(status) = &app.status_message {
        if status.is_error {
            style = style.patch(app.palette.error);
        }
        Cow::Borrowed(&status.text)
    } else if app.is_validating() {
        Cow::Borrowed("Validating feed...")
    } else {
        match app.focus {
            Focus::Categories => Cow::Borrowed(
                "[Enter]show [a]dd [e]dit [d]elete [K/J]move [s]ave [O]lists [r]efresh [?]help [q]uit",
            ),
            Focus::Articles => Cow::Borrowed(
                "[Enter/o]pen [h/l]page [1-9]page [/]search [n]ext match [t]heme [?]help [q]uit",
            ),
        }
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
