use crate::error::{auth_error, ForwarderResult};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Read-only access to the user's calendars
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Credentials are treated as expired this long before their real expiry
const EXPIRY_MARGIN_SECONDS: i64 = 10;

/// OAuth client registration parsed from a Google client-secret JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretSection>,
    web: Option<ClientSecretSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretSection {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl OAuthClientConfig {
    /// Parse the `installed` (or `web`) section of a client-secret document
    pub fn from_json(json: &str, scopes: &[&str]) -> ForwarderResult<Self> {
        let file: ClientSecretFile = serde_json::from_str(json)
            .map_err(|e| auth_error(&format!("Unable to parse client secret: {}", e)))?;

        let section = file
            .installed
            .or(file.web)
            .ok_or_else(|| auth_error("No credentials found in client secret"))?;

        let redirect_uri = section
            .redirect_uris
            .into_iter()
            .next()
            .ok_or_else(|| auth_error("Missing redirect URL in client secret"))?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            auth_uri: section.auth_uri,
            token_uri: section.token_uri,
            redirect_uri,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Same registration with a different redirect target
    pub fn with_redirect_uri(mut self, redirect_uri: &str) -> Self {
        self.redirect_uri = redirect_uri.to_string();
        self
    }

    /// URL the user visits to grant offline access
    pub fn authorization_url(&self, state: &str) -> ForwarderResult<String> {
        let mut url = Url::parse(&self.auth_uri)
            .map_err(|e| auth_error(&format!("Invalid authorization endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state);

        Ok(url.to_string())
    }
}

/// Cached OAuth token pair
///
/// The JSON form uses `access_token`, `token_type`, `refresh_token` and an
/// RFC 3339 `expiry`, the same layout the cached parameter has always held.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Response body of the OAuth token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl Credential {
    /// Build a credential from a token endpoint response received at `now`
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response.refresh_token.unwrap_or_default(),
            expiry: response
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| now + Duration::seconds(secs)),
        }
    }

    /// Whether the access token should no longer be presented
    ///
    /// A missing expiry, or the zero timestamp, means the token never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) if expiry.year() > 1 => {
                expiry - Duration::seconds(EXPIRY_MARGIN_SECONDS) <= now
            }
            _ => false,
        }
    }

    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        let token_type =
            if self.token_type.is_empty() || self.token_type.eq_ignore_ascii_case("bearer") {
                "Bearer"
            } else {
                self.token_type.as_str()
            };
        format!("{} {}", token_type, self.access_token)
    }
}
