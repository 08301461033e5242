//! AWS Lambda entry point for the Chaban calendar sync
//!
//! Deploy with `cargo lambda build --release --features lambda`

use lambda_runtime::{Error as LambdaError, service_fn};

use chaban_sync::lambda::handler;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Chaban sync Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
