use crate::components::forwarder::{forward, FunctionInvoker};
use crate::components::google_calendar::{
    AuthorizationCodeSupplier, CalendarClient, OAuthClientConfig, QueryWindow, TokenProvider,
    CALENDAR_READONLY_SCOPE,
};
use crate::components::parameter_store::ParameterStore;
use crate::config::Config;
use crate::error::{Error, ForwarderResult, ParameterStoreError};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Scheduled timer event that triggers an invocation; only `id` is used
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduledEvent {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub detail: serde_json::Value,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default, rename = "detail-type")]
    pub detail_type: String,
}

/// Progress of one invocation
///
/// Every stage except `Done` can move to `Failed`; the failure log names the
/// stage that was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    AuthConfigured,
    ClientReady,
    EventsFetched,
    Forwarding,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::AuthConfigured => "auth_configured",
            Stage::ClientReady => "client_ready",
            Stage::EventsFetched => "events_fetched",
            Stage::Forwarding => "forwarding",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// What a successful invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationSummary {
    pub window: QueryWindow,
    pub fetched: usize,
    pub forwarded: usize,
    pub skipped: usize,
}

/// Entry point for scheduled invocations
pub struct Handler {
    config: Config,
    store: Arc<dyn ParameterStore>,
    invoker: Arc<dyn FunctionInvoker>,
    supplier: Arc<dyn AuthorizationCodeSupplier>,
    client: Client,
}

impl Handler {
    pub fn new(
        config: Config,
        store: Arc<dyn ParameterStore>,
        invoker: Arc<dyn FunctionInvoker>,
        supplier: Arc<dyn AuthorizationCodeSupplier>,
        client: Client,
    ) -> Self {
        Self {
            config,
            store,
            invoker,
            supplier,
            client,
        }
    }

    /// Handle one scheduled event
    pub async fn handle(&self, event: &ScheduledEvent) -> ForwarderResult<InvocationSummary> {
        self.handle_at(event, Utc::now()).await
    }

    /// Handle one scheduled event as if it arrived at `now`
    pub async fn handle_at(
        &self,
        event: &ScheduledEvent,
        now: DateTime<Utc>,
    ) -> ForwarderResult<InvocationSummary> {
        let mut stage = Stage::Init;
        let result = self.run(event, now, &mut stage).await;

        if let Err(e) = &result {
            error!(
                stage = %Stage::Failed,
                failed_at = %stage,
                "Request [{}] failed: {}",
                event.id,
                e
            );
        }

        result
    }

    async fn run(
        &self,
        event: &ScheduledEvent,
        now: DateTime<Utc>,
        stage: &mut Stage,
    ) -> ForwarderResult<InvocationSummary> {
        info!("Processing Lambda request [{}]", event.id);

        let window = QueryWindow::upcoming(
            now,
            self.config.lookahead_hours,
            self.config.interval_minutes,
        )?;

        let client_secret = self
            .store
            .get(&self.config.client_secret_parameter, true)
            .await
            .map_err(|e| match e {
                ParameterStoreError::NotFound(name) => {
                    Error::Configuration(format!("Client secret parameter {} not found", name))
                }
                other => Error::from(other),
            })?;
        let oauth = OAuthClientConfig::from_json(&client_secret, &[CALENDAR_READONLY_SCOPE])?;
        *stage = Stage::AuthConfigured;

        let token_provider = TokenProvider::new(
            Arc::clone(&self.store),
            Arc::clone(&self.supplier),
            self.client.clone(),
            &self.config.token_parameter,
        );
        let credential = token_provider.acquire(&oauth).await?;
        let mut calendar =
            CalendarClient::new(&self.config, self.client.clone(), oauth, credential);
        *stage = Stage::ClientReady;

        info!(
            "We will get calendar entries between {} and {}",
            window.time_min(),
            window.time_max()
        );

        let events = calendar.list_upcoming(&window).await?;
        *stage = Stage::EventsFetched;

        let mut summary = InvocationSummary {
            window,
            fetched: events.len(),
            forwarded: 0,
            skipped: 0,
        };

        if events.is_empty() {
            info!("No upcoming events found.");
            *stage = Stage::Done;
            return Ok(summary);
        }

        *stage = Stage::Forwarding;
        let report = forward(
            self.invoker.as_ref(),
            &self.config.downstream_function,
            &events,
        )
        .await?;

        summary.forwarded = report.forwarded;
        summary.skipped = report.skipped;
        *stage = Stage::Done;

        info!(
            "Forwarded {} events, skipped {} all-day events",
            summary.forwarded, summary.skipped
        );
        Ok(summary)
    }
}
