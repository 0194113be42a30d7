use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use scenario_core::{CoreConfig, Provider, RawConfig};

/// Main entry point for the scenario explorer
///
/// Resolves configuration once, then serves the REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `SCENARIO_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `OPENROUTER_API_KEY`: credential for the OpenRouter provider
/// - `OPENAI_API_KEY`: credential for the OpenAI provider
/// - `SCENARIO_TAGGING_PROVIDER`, `SCENARIO_HTTP_TIMEOUT_SECS`, `SCENARIO_MAX_ATTEMPTS`,
///   `SCENARIO_TAG_FAILURE`, `SCENARIO_MITIGATION_DELAY_MS`: see `scenario_core::config`
///
/// A provider without a credential stays unavailable; requests selecting it fail with 503.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scenario_run=info".parse()?)
                .add_directive("scenario_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("SCENARIO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::resolve(RawConfig::from_env())?);
    let configured: Vec<_> = Provider::ALL
        .into_iter()
        .filter(|p| cfg.credential(*p).is_some())
        .map(|p| p.as_str())
        .collect();
    if configured.is_empty() {
        tracing::warn!("no provider credentials configured; scenario generation will fail");
    }
    tracing::info!(
        providers = ?configured,
        tagging = %cfg.tagging_provider(),
        "++ Starting scenario explorer REST on {}",
        rest_addr
    );

    let app = router(AppState::from_config(cfg)?);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
