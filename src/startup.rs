use crate::components::forwarder::LambdaInvoker;
use crate::components::google_calendar::AuthorizationCodeSupplier;
use crate::components::parameter_store::SsmParameterStore;
use crate::config::Config;
use crate::error::{config_error, ForwarderResult};
use crate::handler::Handler;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> ForwarderResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,aws_config=warn,aws_smithy_runtime=warn")),
        )
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| config_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the configuration, logging why it was rejected
pub fn load_config() -> ForwarderResult<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e)
        }
    }
}

/// Shared AWS SDK configuration for the configured region
pub async fn load_aws_config(config: &Config) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await
}

/// Parameter store for the configured region
pub fn parameter_store(sdk_config: &SdkConfig) -> SsmParameterStore {
    SsmParameterStore::new(aws_sdk_ssm::Client::new(sdk_config))
}

/// Wire the handler to AWS and the calendar API
pub async fn build_handler(
    config: Config,
    supplier: Arc<dyn AuthorizationCodeSupplier>,
) -> Handler {
    let sdk_config = load_aws_config(&config).await;
    info!("Using AWS region {}", config.region);

    let store = Arc::new(parameter_store(&sdk_config));
    let invoker = Arc::new(LambdaInvoker::new(aws_sdk_lambda::Client::new(&sdk_config)));

    Handler::new(config, store, invoker, supplier, Client::new())
}
