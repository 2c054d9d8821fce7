mod invoker;
pub mod models;

pub use invoker::{FunctionInvoker, LambdaInvoker};
pub use models::{NotificationPayload, TrelloCard};

use crate::components::google_calendar::CalendarEvent;
use crate::error::ForwarderResult;
use tracing::{debug, error, info};

/// Outcome of forwarding one batch of events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardReport {
    pub forwarded: usize,
    pub skipped: usize,
}

/// Forward every timed event, in order, to the named function
///
/// All-day events are skipped. The first failed invocation stops the batch
/// and is returned; later events are not sent.
pub async fn forward(
    invoker: &dyn FunctionInvoker,
    function_name: &str,
    events: &[CalendarEvent],
) -> ForwarderResult<ForwardReport> {
    let mut report = ForwardReport::default();

    for event in events {
        let Some(payload) = NotificationPayload::from_event(event) else {
            debug!("Skipping all-day event {}", event.summary());
            report.skipped += 1;
            continue;
        };

        let body = serde_json::to_vec(&payload)?;
        if let Err(e) = invoker.invoke(function_name, body).await {
            error!("Failed to forward event {}: {}", event.id, e);
            return Err(e);
        }

        info!("{}\n{}", payload.trello.title, payload.trello.description);
        report.forwarded += 1;
    }

    Ok(report)
}
