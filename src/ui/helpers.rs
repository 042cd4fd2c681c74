//! Helper functions for UI operations.
//!
//! Background task spawning for fetches and validation, effect dispatch,
//! and opening links in the system browser.

use crate::app::{App, AppEvent, Effect, FetchRequest, PendingCategory};
use crate::feed::{fetch_and_merge, validate_source, HttpFetcher};
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::mpsc;

use super::loop_runner::Action;

/// Error message for articles without a link
pub(super) const ERR_ARTICLE_NO_URL: &str = "Article has no link";

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics inside spawned tasks would otherwise vanish into the runtime,
/// leaving in-flight markers set forever.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Everything a background task needs, cloned per spawn.
#[derive(Clone)]
pub struct TaskContext {
    pub fetcher: HttpFetcher,
    pub tx: mpsc::Sender<AppEvent>,
    pub max_entries: usize,
    pub validation_timeout: Duration,
}

/// Start the work requested by an [`Effect`].
pub(super) fn run_effect(effect: Effect, ctx: &TaskContext) -> Action {
    match effect {
        Effect::Fetch(request) => {
            spawn_fetch(request, ctx.clone());
            Action::Continue
        }
        Effect::Validate(pending) => {
            spawn_validate(pending, ctx.clone());
            Action::Continue
        }
        Effect::Quit => Action::Quit,
    }
}

/// Apply an optional effect returned by an [`App`] operation.
pub(super) fn run_optional(effect: Option<Effect>, ctx: &TaskContext) -> Action {
    effect.map_or(Action::Continue, |e| run_effect(e, ctx))
}

/// Fetch and merge every URL of a category source off the UI task.
///
/// Sends `AppEvent::FetchComplete`, or `AppEvent::TaskPanicked` carrying the
/// source so the app can clear its in-flight marker.
pub(super) fn spawn_fetch(request: FetchRequest, ctx: TaskContext) {
    tokio::spawn(async move {
        let FetchRequest { source, trigger } = request;
        tracing::debug!(source = %source, ?trigger, "Spawning fetch task");

        let result = catch_task_panic(fetch_and_merge(&ctx.fetcher, &source, ctx.max_entries)).await;
        let event = match result {
            Ok(result) => AppEvent::FetchComplete {
                source,
                trigger,
                result,
            },
            Err(panic_msg) => {
                tracing::error!(task = "fetch", source = %source, error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "fetch",
                    source: Some(source),
                    error: panic_msg,
                }
            }
        };

        if let Err(e) = ctx.tx.send(event).await {
            tracing::warn!(error = %e, event = "FetchComplete", "Channel send failed (receiver dropped)");
        }
    });
}

/// Validate the source of a category being added or edited.
pub(super) fn spawn_validate(pending: PendingCategory, ctx: TaskContext) {
    tokio::spawn(async move {
        tracing::debug!(name = %pending.draft.name, source = %pending.draft.source, "Spawning validation task");

        let result = catch_task_panic(validate_source(
            &ctx.fetcher,
            &pending.draft.source,
            ctx.validation_timeout,
        ))
        .await;
        let event = match result {
            Ok(result) => AppEvent::ValidationComplete { pending, result },
            Err(panic_msg) => {
                tracing::error!(task = "validate", error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "validate",
                    source: None,
                    error: panic_msg,
                }
            }
        };

        if let Err(e) = ctx.tx.send(event).await {
            tracing::warn!(error = %e, event = "ValidationComplete", "Channel send failed (receiver dropped)");
        }
    });
}

/// Open the selected headline's link in the system browser.
pub(super) fn open_selected_article(app: &mut App) {
    let Some(article) = app.current_article() else {
        return;
    };
    let Some(link) = article.link.clone() else {
        app.set_status(ERR_ARTICLE_NO_URL);
        return;
    };

    // Feed links are untrusted; never hand open::that() a non-http URL
    if let Err(e) = validate_url_for_open(&link) {
        app.set_error(e.to_string());
    } else if let Err(e) = open::that(&link) {
        tracing::warn!(url = %link, error = %e, "Failed to open browser");
        app.set_error(format!("Failed to open browser: {}", e));
    } else {
        app.set_status("Opening article in browser...");
    }
}
