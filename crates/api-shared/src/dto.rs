//! REST request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProviderStatus {
    /// Selector accepted by `CreateScenarioReq::provider`.
    pub id: String,
    pub label: String,
    pub model: String,
    pub configured: bool,
    pub tagging: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListProvidersRes {
    pub providers: Vec<ProviderStatus>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OpenSessionRes {
    pub session_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateScenarioReq {
    /// Free-text seed, for example "What if a hurricane hits Florida during a ransomware attack?"
    pub prompt: String,
    /// `openrouter` (default) or `openai`.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScenarioRes {
    pub id: String,
    pub prompt: String,
    pub narrative: String,
    pub tags: Vec<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListScenariosRes {
    /// Most recent first.
    pub scenarios: Vec<ScenarioRes>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LossRowRes {
    pub line_of_business: String,
    pub loss_musd: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LossTableRes {
    pub rows: Vec<LossRowRes>,
    pub total_musd: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StrategyRowRes {
    pub strategy: String,
    pub expected_loss_musd: f64,
    pub tail_loss_1_in_100_musd: f64,
    pub reinsurance_spend_musd: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MitigationRes {
    pub strategies: Vec<StrategyRowRes>,
    pub expected_loss_reduction_pct: f64,
    pub tail_loss_reduction_pct: f64,
    pub spend_increase_musd: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummaryRes {
    pub summary: String,
    pub insights: Vec<String>,
}
