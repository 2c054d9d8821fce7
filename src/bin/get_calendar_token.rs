use calforward::components::google_calendar::{
    AuthorizationCodeSupplier, ConsoleCodeSupplier, LoopbackCodeSupplier, OAuthClientConfig,
    TokenProvider, CALENDAR_READONLY_SCOPE,
};
use calforward::components::parameter_store::ParameterStore;
use calforward::error::{config_error, Error};
use calforward::startup;
use std::sync::Arc;

const DEFAULT_CALLBACK_PORT: u16 = 8080;

/// Authorize calendar access from a workstation and seed the cached token parameter
#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_config()?;

    // `--console` pastes the code by hand, otherwise the browser redirects to a local listener
    let mut args = std::env::args().skip(1);
    let supplier: Arc<dyn AuthorizationCodeSupplier> = match args.next().as_deref() {
        Some("--console") => Arc::new(ConsoleCodeSupplier),
        Some(port) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid callback port: {}", port)))?;
            Arc::new(LoopbackCodeSupplier::new(port))
        }
        None => Arc::new(LoopbackCodeSupplier::new(DEFAULT_CALLBACK_PORT)),
    };

    let sdk_config = startup::load_aws_config(&config).await;
    let store = Arc::new(startup::parameter_store(&sdk_config));

    // Read the OAuth client registration
    let client_secret = store
        .get(&config.client_secret_parameter, true)
        .await
        .map_err(Error::from)?;
    let oauth = OAuthClientConfig::from_json(&client_secret, &[CALENDAR_READONLY_SCOPE])?;

    let token_provider = TokenProvider::new(
        store,
        supplier,
        reqwest::Client::new(),
        &config.token_parameter,
    );

    // Always run the flow so a revoked token can be replaced
    let credential = token_provider.authorize(&oauth).await?;
    let version = token_provider.store_credential(&credential).await?;

    println!(
        "Token successfully saved to {} (version {})",
        config.token_parameter, version
    );

    Ok(())
}
