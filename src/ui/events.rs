//! Application event handling.
//!
//! Processes completions from background fetch and validation tasks.

use crate::app::{App, AppEvent};

/// Handle an event from a background task.
///
/// Updates application state only; any follow-up work is started by the
/// caller on the next input or tick.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::FetchComplete {
            source,
            trigger,
            result,
        } => {
            app.apply_fetch(&source, trigger, result);
        }
        AppEvent::ValidationComplete { pending, result } => {
            app.apply_validation(pending, result);
        }
        AppEvent::TaskPanicked {
            task,
            source,
            error,
        } => {
            tracing::error!(task, error, "Background task panicked");
            match source {
                Some(source) => app.abandon_fetch(&source),
                None => app.abandon_validation(),
            }
            app.set_error(format!("Internal error in {} task", task));
        }
    }
}
