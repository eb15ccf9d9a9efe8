mod app;
mod client;
mod conf;
mod convert;
mod trigger;

use anyhow::{anyhow, Result};
use lambda_runtime::{run, service_fn, LambdaEvent};
use serde_json::Value;

/// Handle one storage-creation event through the conversion pipeline.
/// Pipeline faults become 4xx/5xx responses rather than Lambda
/// errors, so an `Err` here only ever means a broken runtime
/// transport.
async fn function_handler(event: LambdaEvent<Value>) -> Result<app::Response> {
    Ok(app::current().handle(&event.payload).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    app::init().await?;

    run(service_fn(function_handler))
        .await
        .map_err(|e| anyhow!("{:?}", e))
}
