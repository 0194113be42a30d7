use crate::provider::Provider;
use scenario_uuid::{ScenarioId, SessionId};

/// Why a call to an external provider failed.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamFailure {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("non-success status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Caller supplied input that cannot be processed (for example an empty seed prompt).
    #[error("invalid input: {0}")]
    Validation(String),
    /// Missing or invalid configuration, including absent provider credentials.
    #[error("configuration error: {0}")]
    Config(String),
    /// The provider could not be reached or answered with something unusable.
    #[error("upstream provider {provider} failed: {failure}")]
    Upstream {
        provider: Provider,
        #[source]
        failure: UpstreamFailure,
    },
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),
}

impl ScenarioError {
    pub fn upstream(provider: Provider, failure: UpstreamFailure) -> Self {
        Self::Upstream { provider, failure }
    }

    /// Only upstream failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

impl From<scenario_types::TextError> for ScenarioError {
    fn from(err: scenario_types::TextError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<scenario_uuid::UuidError> for ScenarioError {
    fn from(err: scenario_uuid::UuidError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type ScenarioResult<T> = std::result::Result<T, ScenarioError>;
