// Main entry point for the audit analytics API server

use anyhow::{Context, Result};
use audit_core::{server::build_app, Config, ServerDeps};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,audit_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Audit Analytics API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        knowledge_endpoint = %config.knowledge_endpoint,
        chunk_size = config.stream.chunk_size,
        chunk_delay_ms = config.stream.chunk_delay.as_millis() as u64,
        "Configuration loaded"
    );

    // Outbound clients are built once and injected
    let deps = ServerDeps::from_config(&config).context("Failed to create service clients")?;

    // Build application
    let app = build_app(deps, config.knowledge_endpoint.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Chat stream: http://localhost:{}/api/chat?message=", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
