use calforward::components::google_calendar::ConsoleCodeSupplier;
use calforward::handler::ScheduledEvent;
use calforward::startup;
use lambda_runtime::{service_fn, LambdaEvent};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar forwarder");

    // Load configuration
    let config = startup::load_config()?;

    let handler = Arc::new(startup::build_handler(config, Arc::new(ConsoleCodeSupplier)).await);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<ScheduledEvent>| {
        let handler = Arc::clone(&handler);
        async move {
            handler.handle(&event.payload).await?;
            Ok::<(), lambda_runtime::Error>(())
        }
    }))
    .await
}
