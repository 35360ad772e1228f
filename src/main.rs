use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file; a missing file is fine.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::registry()
        .with(llm_service::telemetry::env_filter_with_level("info", Level::INFO))
        .with(llm_service::telemetry::layer())
        .try_init()?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting llm gateway");
    api::start().await?;

    Ok(())
}
