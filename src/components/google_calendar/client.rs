use super::credentials::{Credential, OAuthClientConfig};
use super::models::{CalendarEvent, EventsPage};
use super::time::QueryWindow;
use super::token::refresh_credential;
use crate::config::Config;
use crate::error::{transport_error, ForwarderResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Authorized client for the calendar events list endpoint
pub struct CalendarClient {
    client: Client,
    api_base: String,
    calendar_id: String,
    oauth: OAuthClientConfig,
    credential: Credential,
}

impl CalendarClient {
    pub fn new(
        config: &Config,
        client: Client,
        oauth: OAuthClientConfig,
        credential: Credential,
    ) -> Self {
        Self {
            client,
            api_base: config.calendar_api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            oauth,
            credential,
        }
    }

    /// List non-deleted single event instances in the window, ordered by start time
    pub async fn list_upcoming(
        &mut self,
        window: &QueryWindow,
    ) -> ForwarderResult<Vec<CalendarEvent>> {
        self.ensure_fresh(Utc::now()).await?;

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(window, page_token.as_deref()).await?;
            debug!("Fetched page with {} events", page.items.len());
            events.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(events)
    }

    /// Refresh the access token in memory when it has expired
    async fn ensure_fresh(&mut self, now: DateTime<Utc>) -> ForwarderResult<()> {
        if self.credential.is_expired(now) {
            info!("Access token expired, refreshing");
            self.credential =
                refresh_credential(&self.client, &self.oauth, &self.credential, now).await?;
        }
        Ok(())
    }

    async fn fetch_page(
        &self,
        window: &QueryWindow,
        page_token: Option<&str>,
    ) -> ForwarderResult<EventsPage> {
        let mut url = Url::parse(&format!("{}/calendars/", self.api_base))
            .map_err(|e| transport_error(&format!("Failed to parse URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| transport_error("Calendar API base cannot hold a path"))?
            .pop_if_empty()
            .push(&self.calendar_id)
            .push("events");

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("showDeleted", "false")
                .append_pair("singleEvents", "true")
                .append_pair("timeMin", &window.time_min())
                .append_pair("timeMax", &window.time_max())
                .append_pair("orderBy", "startTime");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        let response = self
            .client
            .get(url)
            .header("Authorization", self.credential.authorization_header())
            .send()
            .await
            .map_err(|e| transport_error(&format!("Unable to retrieve events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(transport_error(&format!(
                "Unable to retrieve events: HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json::<EventsPage>()
            .await
            .map_err(|e| transport_error(&format!("Failed to parse events response: {}", e)))
    }
}
