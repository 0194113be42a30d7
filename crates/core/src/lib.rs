//! # Scenario Core
//!
//! Core logic for the generative scenario explorer:
//! - [`gateway`]: prompting external chat-completion providers for risk narratives and tags
//! - [`portfolio`]: the in-memory, ordered store of accepted scenarios
//! - [`session`]: one portfolio per user session
//! - [`service`]: the validate → generate → tag → store workflow
//! - [`simulation`]: synthetic loss, mitigation and summary figures for display
//!
//! **No API concerns**: HTTP servers and CLI rendering belong in `api-rest` and `scenario-cli`.

pub mod config;
pub mod constants;
mod error;
pub mod gateway;
pub mod portfolio;
pub mod prompts;
pub mod provider;
pub mod service;
pub mod session;
pub mod simulation;

pub use config::{ApiKey, CoreConfig, RawConfig};
pub use error::{ScenarioError, ScenarioResult, UpstreamFailure};
pub use gateway::{GeneratedScenario, RetryPolicy, ScenarioGateway};
pub use portfolio::{PortfolioStore, ScenarioRecord};
pub use provider::{ChatCompletion, ChatMessage, HttpChatProvider, Provider, Role};
pub use service::{ScenarioService, TagFailurePolicy};
pub use session::SessionRegistry;

pub use scenario_types::NonEmptyText;
pub use scenario_uuid::{ScenarioId, SessionId};
