//! # API REST
//!
//! REST API for the scenario explorer.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, error-to-status mapping)
//!
//! Uses `api-shared` for wire types and `scenario-core` for everything else.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    CreateScenarioReq, ErrorRes, HealthRes, HealthService, ListProvidersRes, ListScenariosRes,
    LossRowRes, LossTableRes, MitigationRes, OpenSessionRes, ProviderStatus, ScenarioRes,
    StrategyRowRes, SummaryRes,
};
use scenario_core::{
    simulation, CoreConfig, PortfolioStore, Provider, ScenarioError, ScenarioGateway, ScenarioId,
    ScenarioRecord, ScenarioService, SessionId, SessionRegistry,
};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    registry: SessionRegistry,
    service: ScenarioService,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, gateway: ScenarioGateway) -> Self {
        let service = ScenarioService::new(Arc::new(gateway), cfg.tag_failure());
        Self {
            cfg,
            registry: SessionRegistry::new(),
            service,
        }
    }

    /// Builds state with HTTP providers for every configured credential.
    pub fn from_config(cfg: Arc<CoreConfig>) -> scenario_core::ScenarioResult<Self> {
        let gateway = ScenarioGateway::from_config(&cfg)?;
        Ok(Self::new(cfg, gateway))
    }

    fn session_store(&self, session_id: &str) -> Result<PortfolioStore, ApiError> {
        let id = SessionId::parse(session_id).map_err(ScenarioError::from)?;
        Ok(self.registry.store(id)?)
    }
}

/// A core error rendered as a JSON error body with a matching status code.
#[derive(Debug)]
pub struct ApiError(ScenarioError);

impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ScenarioError::Validation(_) => StatusCode::BAD_REQUEST,
            ScenarioError::SessionNotFound(_) | ScenarioError::ScenarioNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ScenarioError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScenarioError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        } else {
            tracing::debug!("request rejected: {}", self.0);
        }
        (
            status,
            Json(ErrorRes {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_providers,
        open_session,
        close_session,
        create_scenario,
        list_scenarios,
        get_scenario,
        delete_scenario,
        simulated_losses,
        run_mitigation,
        summary,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        ProviderStatus,
        ListProvidersRes,
        OpenSessionRes,
        CreateScenarioReq,
        ScenarioRes,
        ListScenariosRes,
        LossRowRes,
        LossTableRes,
        StrategyRowRes,
        MitigationRes,
        SummaryRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/providers", get(list_providers))
        .route("/sessions", post(open_session))
        .route("/sessions/:session_id", delete(close_session))
        .route(
            "/sessions/:session_id/scenarios",
            post(create_scenario).get(list_scenarios),
        )
        .route(
            "/sessions/:session_id/scenarios/:scenario_id",
            get(get_scenario).delete(delete_scenario),
        )
        .route("/simulation/losses", get(simulated_losses))
        .route("/mitigation", post(run_mitigation))
        .route("/summary", get(summary))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn scenario_res(record: &ScenarioRecord) -> ScenarioRes {
    ScenarioRes {
        id: record.id().to_string(),
        prompt: record.prompt().to_string(),
        narrative: record.narrative().to_string(),
        tags: record.tags().to_vec(),
        created_at: record.created_at().to_rfc3339(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/providers",
    responses(
        (status = 200, description = "Known providers and whether each has a credential", body = ListProvidersRes)
    )
)]
#[axum::debug_handler]
async fn list_providers(State(state): State<AppState>) -> Json<ListProvidersRes> {
    let gateway = state.service.gateway();
    let providers = Provider::ALL
        .iter()
        .map(|p| ProviderStatus {
            id: p.as_str().into(),
            label: p.label().into(),
            model: p.model().into(),
            configured: gateway.is_configured(*p),
            tagging: gateway.tagging_provider() == *p,
        })
        .collect();
    Json(ListProvidersRes { providers })
}

#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session opened with an empty portfolio", body = OpenSessionRes)
    )
)]
/// Opens a session. Its portfolio lives until the session is closed or the process exits.
#[axum::debug_handler]
async fn open_session(State(state): State<AppState>) -> (StatusCode, Json<OpenSessionRes>) {
    let id = state.registry.open();
    (
        StatusCode::CREATED,
        Json(OpenSessionRes {
            session_id: id.to_string(),
        }),
    )
}

#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session closed and its portfolio discarded"),
        (status = 400, description = "Malformed identifier", body = ErrorRes),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::parse(&session_id).map_err(ScenarioError::from)?;
    state.registry.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/sessions/{session_id}/scenarios",
    params(("session_id" = String, Path, description = "Session identifier")),
    request_body = CreateScenarioReq,
    responses(
        (status = 201, description = "Scenario generated, tagged and saved", body = ScenarioRes),
        (status = 400, description = "Malformed body, empty prompt or unknown provider", body = ErrorRes),
        (status = 404, description = "Unknown session", body = ErrorRes),
        (status = 502, description = "Provider call failed", body = ErrorRes),
        (status = 503, description = "Provider not configured", body = ErrorRes)
    )
)]
/// Generates a scenario narrative from the seed prompt, tags it and appends it to the
/// session's portfolio.
///
/// Nothing is stored unless the whole operation succeeds.
#[axum::debug_handler]
async fn create_scenario(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Result<Json<CreateScenarioReq>, JsonRejection>,
) -> Result<(StatusCode, Json<ScenarioRes>), ApiError> {
    let store = state.session_store(&session_id)?;
    let Json(req) = body.map_err(|rejection| ScenarioError::Validation(rejection.body_text()))?;
    let provider = match req.provider.as_deref() {
        Some(p) => p.parse::<Provider>()?,
        None => Provider::default(),
    };

    let record = state
        .service
        .create_scenario(&store, &req.prompt, provider)
        .await?;
    Ok((StatusCode::CREATED, Json(scenario_res(&record))))
}

#[utoipa::path(
    get,
    path = "/sessions/{session_id}/scenarios",
    params(("session_id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Portfolio, most recent first", body = ListScenariosRes),
        (status = 404, description = "Unknown session", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_scenarios(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ListScenariosRes>, ApiError> {
    let store = state.session_store(&session_id)?;
    let scenarios = store.list_newest_first().iter().map(scenario_res).collect();
    Ok(Json(ListScenariosRes { scenarios }))
}

#[utoipa::path(
    get,
    path = "/sessions/{session_id}/scenarios/{scenario_id}",
    params(
        ("session_id" = String, Path, description = "Session identifier"),
        ("scenario_id" = String, Path, description = "Scenario identifier")
    ),
    responses(
        (status = 200, description = "Stored scenario", body = ScenarioRes),
        (status = 404, description = "Unknown session or scenario", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_scenario(
    State(state): State<AppState>,
    Path((session_id, scenario_id)): Path<(String, String)>,
) -> Result<Json<ScenarioRes>, ApiError> {
    let store = state.session_store(&session_id)?;
    let id = ScenarioId::parse(&scenario_id).map_err(ScenarioError::from)?;
    let record = store.get(id).ok_or(ScenarioError::ScenarioNotFound(id))?;
    Ok(Json(scenario_res(&record)))
}

#[utoipa::path(
    delete,
    path = "/sessions/{session_id}/scenarios/{scenario_id}",
    params(
        ("session_id" = String, Path, description = "Session identifier"),
        ("scenario_id" = String, Path, description = "Scenario identifier")
    ),
    responses(
        (status = 204, description = "Scenario removed"),
        (status = 404, description = "Unknown session or scenario", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_scenario(
    State(state): State<AppState>,
    Path((session_id, scenario_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let store = state.session_store(&session_id)?;
    let id = ScenarioId::parse(&scenario_id).map_err(ScenarioError::from)?;
    store.remove(id).ok_or(ScenarioError::ScenarioNotFound(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/simulation/losses",
    responses(
        (status = 200, description = "Synthetic losses by line of business ($M)", body = LossTableRes)
    )
)]
#[axum::debug_handler]
async fn simulated_losses(State(_state): State<AppState>) -> Json<LossTableRes> {
    let rows = simulation::simulate_losses(&mut rand::thread_rng());
    let total_musd = (rows.iter().map(|r| r.loss_musd).sum::<f64>() * 10.0).round() / 10.0;
    Json(LossTableRes {
        rows: rows
            .into_iter()
            .map(|r| LossRowRes {
                line_of_business: r.line_of_business.into(),
                loss_musd: r.loss_musd,
            })
            .collect(),
        total_musd,
    })
}

#[utoipa::path(
    post,
    path = "/mitigation",
    responses(
        (status = 200, description = "Baseline versus mitigated strategy", body = MitigationRes)
    )
)]
/// Runs the mitigation agent. The comparison is fixed; the configured delay stands in for
/// optimisation time.
#[axum::debug_handler]
async fn run_mitigation(State(state): State<AppState>) -> Json<MitigationRes> {
    tokio::time::sleep(state.cfg.mitigation_delay()).await;

    let cmp = simulation::mitigation_comparison();
    let strategies = [&cmp.baseline, &cmp.mitigated]
        .into_iter()
        .map(|s| StrategyRowRes {
            strategy: s.strategy.into(),
            expected_loss_musd: s.expected_loss_musd,
            tail_loss_1_in_100_musd: s.tail_loss_1_in_100_musd,
            reinsurance_spend_musd: s.reinsurance_spend_musd,
        })
        .collect();
    Json(MitigationRes {
        strategies,
        expected_loss_reduction_pct: cmp.expected_loss_reduction_pct(),
        tail_loss_reduction_pct: cmp.tail_loss_reduction_pct(),
        spend_increase_musd: cmp.spend_increase_musd(),
    })
}

#[utoipa::path(
    get,
    path = "/summary",
    responses(
        (status = 200, description = "Management summary and key insights", body = SummaryRes)
    )
)]
#[axum::debug_handler]
async fn summary(State(_state): State<AppState>) -> Json<SummaryRes> {
    let s = simulation::management_summary();
    Json(SummaryRes {
        summary: s.summary.into(),
        insights: s.insights.into_iter().map(String::from).collect(),
    })
}
