#![allow(dead_code)]

use async_trait::async_trait;
use calforward::components::forwarder::{FunctionInvoker, NotificationPayload};
use calforward::components::google_calendar::AuthorizationCodeSupplier;
use calforward::components::parameter_store::{ParameterStore, ParameterType};
use calforward::config::Config;
use calforward::error::{transport_error, ForwarderResult, ParameterStoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CLIENT_SECRET_PARAMETER: &str = "/calforward/client-secret";
pub const TOKEN_PARAMETER: &str = "/calforward/token";
pub const DOWNSTREAM_FUNCTION: &str = "arn:aws:lambda:us-west-2:123456789012:function:trello";

/// Recorded parameter write
#[derive(Debug, Clone, PartialEq)]
pub struct PutRecord {
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    pub overwrite: bool,
}

/// In-memory parameter store
#[derive(Debug, Clone, Default)]
pub struct MockParameterStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    puts: Arc<Mutex<Vec<PutRecord>>>,
}

impl MockParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, name: &str, value: &str) {
        self.data.lock().await.insert(name.to_string(), value.to_string());
    }

    pub async fn value(&self, name: &str) -> Option<String> {
        self.data.lock().await.get(name).cloned()
    }

    pub async fn puts(&self) -> Vec<PutRecord> {
        self.puts.lock().await.clone()
    }
}

#[async_trait]
impl ParameterStore for MockParameterStore {
    async fn get(&self, name: &str, _decrypt: bool) -> Result<String, ParameterStoreError> {
        self.data
            .lock()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ParameterStoreError::NotFound(name.to_string()))
    }

    async fn put(
        &self,
        name: &str,
        value: &str,
        parameter_type: ParameterType,
        overwrite: bool,
    ) -> Result<i64, ParameterStoreError> {
        let mut data = self.data.lock().await;
        if data.contains_key(name) && !overwrite {
            return Err(ParameterStoreError::Validation(format!("{} already exists", name)));
        }
        data.insert(name.to_string(), value.to_string());

        let mut puts = self.puts.lock().await;
        puts.push(PutRecord {
            name: name.to_string(),
            value: value.to_string(),
            parameter_type,
            overwrite,
        });
        Ok(puts.len() as i64)
    }
}

/// Invoker that records every payload and can fail on a chosen call
#[derive(Debug, Clone, Default)]
pub struct RecordingInvoker {
    calls: Arc<Mutex<Vec<(String, NotificationPayload)>>>,
    fail_on_call: Option<usize>,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th invocation (1-based)
    pub fn failing_on(n: usize) -> Self {
        Self {
            calls: Arc::default(),
            fail_on_call: Some(n),
        }
    }

    pub async fn calls(&self) -> Vec<(String, NotificationPayload)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl FunctionInvoker for RecordingInvoker {
    async fn invoke(&self, function_name: &str, payload: Vec<u8>) -> ForwarderResult<()> {
        let payload: NotificationPayload = serde_json::from_slice(&payload)?;
        let mut calls = self.calls.lock().await;
        calls.push((function_name.to_string(), payload));

        if Some(calls.len()) == self.fail_on_call {
            return Err(transport_error("downstream function unavailable"));
        }
        Ok(())
    }
}

/// Code supplier that counts how often it is asked
#[derive(Debug, Default)]
pub struct CountingSupplier {
    code: String,
    calls: AtomicUsize,
}

impl CountingSupplier {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorizationCodeSupplier for CountingSupplier {
    async fn supply(&self, authorization_url: &str) -> ForwarderResult<String> {
        assert!(authorization_url.contains("access_type=offline"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.code.clone())
    }
}

/// Client-secret document whose endpoints point at `base_url`
pub fn client_secret_json(base_url: &str) -> String {
    serde_json::json!({
        "installed": {
            "client_id": "client-123.apps.googleusercontent.com",
            "project_id": "calforward",
            "auth_uri": format!("{}/auth", base_url),
            "token_uri": format!("{}/token", base_url),
            "client_secret": "s3cret",
            "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob", "http://localhost"]
        }
    })
    .to_string()
}

/// Cached token that does not expire during a test run
pub fn cached_token_json(access_token: &str) -> String {
    serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "refresh_token": "1//refresh",
        "expiry": "2099-01-01T00:00:00Z"
    })
    .to_string()
}

/// Test configuration pointing the calendar API at `base_url`
pub fn test_config(base_url: &str) -> Config {
    Config {
        downstream_function: DOWNSTREAM_FUNCTION.to_string(),
        client_secret_parameter: CLIENT_SECRET_PARAMETER.to_string(),
        token_parameter: TOKEN_PARAMETER.to_string(),
        interval_minutes: 60,
        lookahead_hours: 24,
        calendar_id: "primary".to_string(),
        calendar_api_base: base_url.to_string(),
        region: "us-west-2".to_string(),
    }
}
