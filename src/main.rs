//! Alarm Router - Lambda entry point
//!
//! Loads configuration and builds the router once per cold start, then
//! serves SNS alarm events until the runtime shuts the process down.

use alarm_router::{
    config::Config,
    notification::{lambda::LambdaDispatcher, logging::LoggingDispatcher, Dispatcher},
    AlarmEvent, AlarmRouter,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        // CloudWatch adds the ingestion time.
        .without_time()
        .with_target(false)
        .init();

    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Notify Function: {}", config.dispatcher.function_name);
    info!("Notify Region: {}", config.dispatcher.region);
    info!("Dry Run: {}", config.dispatcher.dry_run);
    info!("Routed Namespace: {}", config.routing.namespace);
    info!("Routing Policy: {:?}", config.routing.policy);
    info!("Recipient Entries: {}", config.recipients.len());
    info!("-------------------------------------------------------");

    let dispatcher: Arc<dyn Dispatcher> = if config.dispatcher.dry_run {
        Arc::new(LoggingDispatcher::new(config.dispatcher.function_name.clone()))
    } else {
        Arc::new(LambdaDispatcher::from_config(&config.dispatcher).await)
    };
    let router = Arc::new(AlarmRouter::new(
        config.routing.namespace.clone(),
        config.route()?,
        dispatcher,
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<AlarmEvent>| {
        let router = Arc::clone(&router);
        async move {
            let response = router.process(&event.payload).await?;
            Ok::<serde_json::Value, Error>(
                response.map(|r| r.body_json()).unwrap_or_default(),
            )
        }
    }))
    .await
}
