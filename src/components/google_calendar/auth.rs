use crate::error::{auth_error, ForwarderResult};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use url::Url;

/// Source of an OAuth authorization code for a given authorization URL
#[async_trait]
pub trait AuthorizationCodeSupplier: Send + Sync {
    /// Redirect URI this supplier listens on, overriding the client's own
    fn redirect_uri(&self) -> Option<String> {
        None
    }

    /// Obtain the code the user received after visiting `authorization_url`
    async fn supply(&self, authorization_url: &str) -> ForwarderResult<String>;
}

/// Prints the authorization URL and reads the code from standard input
#[derive(Debug, Default, Clone)]
pub struct ConsoleCodeSupplier;

#[async_trait]
impl AuthorizationCodeSupplier for ConsoleCodeSupplier {
    async fn supply(&self, authorization_url: &str) -> ForwarderResult<String> {
        println!(
            "Go to the following link in your browser then type the authorization code: \n{}",
            authorization_url
        );

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| auth_error(&format!("Unable to read authorization code: {}", e)))?;

        let code = line.trim();
        if code.is_empty() {
            return Err(auth_error("Unable to read authorization code: no input"));
        }

        Ok(code.to_string())
    }
}

/// Returns a fixed code; for hosts that received the code out of band
#[derive(Debug, Clone)]
pub struct StaticCodeSupplier {
    code: String,
}

impl StaticCodeSupplier {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait]
impl AuthorizationCodeSupplier for StaticCodeSupplier {
    async fn supply(&self, _authorization_url: &str) -> ForwarderResult<String> {
        Ok(self.code.clone())
    }
}

/// Opens the browser and receives the redirect on a local HTTP listener
#[derive(Debug, Clone)]
pub struct LoopbackCodeSupplier {
    port: u16,
}

impl LoopbackCodeSupplier {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait]
impl AuthorizationCodeSupplier for LoopbackCodeSupplier {
    fn redirect_uri(&self) -> Option<String> {
        Some(format!("http://localhost:{}", self.port))
    }

    async fn supply(&self, authorization_url: &str) -> ForwarderResult<String> {
        let expected_state = query_value(authorization_url, "state");

        let server = tiny_http::Server::http(("127.0.0.1", self.port))
            .map_err(|e| auth_error(&format!("Failed to start callback listener: {}", e)))?;

        println!("Opening browser for Google Calendar authorization...");
        if let Err(e) = webbrowser::open(authorization_url) {
            warn!("Could not open browser: {}", e);
            println!("Open this link in your browser:\n{}", authorization_url);
        }

        info!("Waiting for authorization callback on port {}", self.port);
        let (callback_url, request) = tokio::task::spawn_blocking(move || {
            let request = server.recv()?;
            Ok::<_, std::io::Error>((request.url().to_string(), request))
        })
        .await
        .map_err(|e| auth_error(&format!("Callback listener failed: {}", e)))??;

        let callback = format!("http://localhost{}", callback_url);
        let code = query_value(&callback, "code");
        let state = query_value(&callback, "state");

        let outcome = match (code, state) {
            (Some(_), state) if state != expected_state => {
                Err(auth_error("Authorization callback state does not match"))
            }
            (Some(code), _) => Ok(code),
            (None, _) => Err(auth_error("No authorization code found in callback")),
        };

        let body = if outcome.is_ok() {
            "Authorization successful! You can close this window."
        } else {
            "Authorization failed. Check the terminal for details."
        };
        if let Err(e) = request.respond(tiny_http::Response::from_string(body)) {
            warn!("Failed to answer authorization callback: {}", e);
        }

        outcome
    }
}

fn query_value(url: &str, key: &str) -> Option<String> {
    Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    })
}
