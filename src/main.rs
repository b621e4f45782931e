//! Vedic Astrology API server binary.

use anyhow::Result;
use tracing::info;

use vedic_api::{run_server, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config = ServiceConfig::from_env()?;

    let _telemetry = vedic_api::utils::init_telemetry("vedic_api", config.otel_enabled)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    info!(
        "🪐 {} v{} (engine: {:?}, origins: {})",
        config.title,
        config.version,
        config.engine,
        config.allowed_origins.join(", ")
    );

    run_server(config).await
}
