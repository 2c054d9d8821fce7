use crate::components::google_calendar::time::format_event_start;
use crate::components::google_calendar::CalendarEvent;
use serde::{Deserialize, Serialize};

pub const EVENT_VERSION: &str = "1.0";
pub const EVENT_SOURCE: &str = "aws:lambda";

/// Card fields the downstream function creates a task from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TrelloCard {
    pub title: String,
    pub description: String,
}

/// Envelope sent to the downstream function for one event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationPayload {
    pub event_version: String,
    pub event_source: String,
    pub trello: TrelloCard,
}

impl NotificationPayload {
    /// Build the payload for a timed event; all-day events yield `None`
    ///
    /// A start that is not valid RFC 3339 is put into the title verbatim.
    pub fn from_event(event: &CalendarEvent) -> Option<Self> {
        let start = event.start_date_time()?;
        let when = format_event_start(start).unwrap_or_else(|| start.to_string());

        Some(Self {
            event_version: EVENT_VERSION.to_string(),
            event_source: EVENT_SOURCE.to_string(),
            trello: TrelloCard {
                title: format!("M: ({}) {}", when, event.summary()),
                description: event.description().to_string(),
            },
        })
    }
}
