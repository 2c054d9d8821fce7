use crate::error::{config_error, ForwarderResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Pattern used for the event start inside notification titles
pub const TITLE_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Future time range queried for upcoming events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// Window starting `lookahead_hours` after `now` and lasting `interval_minutes`
    ///
    /// Offsets that do not fit chrono's range are a configuration error.
    pub fn upcoming(
        now: DateTime<Utc>,
        lookahead_hours: i64,
        interval_minutes: i64,
    ) -> ForwarderResult<Self> {
        let start = Duration::try_hours(lookahead_hours)
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or_else(|| {
                config_error(&format!("Look-ahead of {} hours is out of range", lookahead_hours))
            })?;
        let end = Duration::try_minutes(interval_minutes)
            .and_then(|interval| start.checked_add_signed(interval))
            .ok_or_else(|| {
                config_error(&format!("Interval of {} minutes is out of range", interval_minutes))
            })?;

        Ok(Self { start, end })
    }

    /// `timeMin` query value
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `timeMax` query value
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Format an event's RFC 3339 start for a title, keeping the event's own offset
///
/// Returns `None` when the value is not valid RFC 3339.
pub fn format_event_start(date_time: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(date_time)
        .ok()
        .map(|dt| dt.format(TITLE_DATE_FORMAT).to_string())
}
