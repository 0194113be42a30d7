//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful during development when iterating on the HTTP surface. The workspace's main
//! `scenario-run` binary serves the same router.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use scenario_core::{CoreConfig, RawConfig};

/// Main entry point for the scenario explorer REST API server.
///
/// # Environment Variables
/// - `SCENARIO_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `OPENROUTER_API_KEY`, `OPENAI_API_KEY`: provider credentials
/// - `SCENARIO_*`: see `scenario_core::config`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration values are invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("scenario_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("SCENARIO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting scenario explorer REST API on {}", addr);

    let cfg = Arc::new(CoreConfig::resolve(RawConfig::from_env())?);
    let app = router(AppState::from_config(cfg)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
