use super::auth::AuthorizationCodeSupplier;
use super::credentials::{Credential, OAuthClientConfig, TokenResponse};
use crate::components::parameter_store::{ParameterStore, ParameterType};
use crate::error::{auth_error, ForwarderResult};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

/// Provides a usable credential, from the parameter cache or an interactive exchange
#[derive(Clone)]
pub struct TokenProvider {
    store: Arc<dyn ParameterStore>,
    supplier: Arc<dyn AuthorizationCodeSupplier>,
    client: Client,
    token_parameter: String,
}

impl TokenProvider {
    pub fn new(
        store: Arc<dyn ParameterStore>,
        supplier: Arc<dyn AuthorizationCodeSupplier>,
        client: Client,
        token_parameter: &str,
    ) -> Self {
        Self {
            store,
            supplier,
            client,
            token_parameter: token_parameter.to_string(),
        }
    }

    /// Get a credential, either from the cache or by authorizing and caching a new one
    ///
    /// A cached credential is returned as is; expiry is dealt with by the calendar client.
    pub async fn acquire(&self, oauth: &OAuthClientConfig) -> ForwarderResult<Credential> {
        match self.cached().await {
            Ok(credential) => {
                info!("Using cached token from {}", self.token_parameter);
                Ok(credential)
            }
            Err(e) => {
                warn!("No usable cached token ({}), starting authorization", e);
                let credential = self.authorize(oauth).await?;
                self.store_credential(&credential).await?;
                Ok(credential)
            }
        }
    }

    /// Read and parse the cached credential
    pub async fn cached(&self) -> ForwarderResult<Credential> {
        let raw = self.store.get(&self.token_parameter, true).await?;
        let credential: Credential = serde_json::from_str(&raw)?;
        Ok(credential)
    }

    /// Run the authorization code flow through the configured supplier
    pub async fn authorize(&self, oauth: &OAuthClientConfig) -> ForwarderResult<Credential> {
        let oauth = match self.supplier.redirect_uri() {
            Some(redirect_uri) => oauth.clone().with_redirect_uri(&redirect_uri),
            None => oauth.clone(),
        };

        let state = uuid::Uuid::new_v4().to_string();
        let authorization_url = oauth.authorization_url(&state)?;
        let code = self.supplier.supply(&authorization_url).await?;

        exchange_code(&self.client, &oauth, &code, Utc::now()).await
    }

    /// Write a credential to the cache as a secure value, replacing any previous one
    pub async fn store_credential(&self, credential: &Credential) -> ForwarderResult<i64> {
        let token_json = serde_json::to_string(credential)?;
        let version = self
            .store
            .put(
                &self.token_parameter,
                &token_json,
                ParameterType::SecureString,
                true,
            )
            .await?;

        info!("Cached token in {} (version {})", self.token_parameter, version);
        Ok(version)
    }
}

/// Exchange an authorization code for a credential
pub async fn exchange_code(
    client: &Client,
    oauth: &OAuthClientConfig,
    code: &str,
    now: DateTime<Utc>,
) -> ForwarderResult<Credential> {
    let params = [
        ("client_id", oauth.client_id.as_str()),
        ("client_secret", oauth.client_secret.as_str()),
        ("code", code),
        ("redirect_uri", oauth.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let response = request_token(client, &oauth.token_uri, &params).await?;
    Ok(Credential::from_response(response, now))
}

/// Obtain a fresh access token for an expired credential
///
/// The refresh token is kept when the endpoint does not rotate it.
pub async fn refresh_credential(
    client: &Client,
    oauth: &OAuthClientConfig,
    credential: &Credential,
    now: DateTime<Utc>,
) -> ForwarderResult<Credential> {
    if !credential.can_refresh() {
        return Err(auth_error("Token expired and no refresh token is available"));
    }

    let params = [
        ("client_id", oauth.client_id.as_str()),
        ("client_secret", oauth.client_secret.as_str()),
        ("refresh_token", credential.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let response = request_token(client, &oauth.token_uri, &params).await?;
    let mut refreshed = Credential::from_response(response, now);
    if refreshed.refresh_token.is_empty() {
        refreshed.refresh_token = credential.refresh_token.clone();
    }

    Ok(refreshed)
}

async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> ForwarderResult<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to reach token endpoint: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!(
            "Unable to retrieve token: HTTP {} - {}",
            status, error_body
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))
}
