//! External text-generation providers.
//!
//! A [`Provider`] names one of the hosted chat-completion services. Every provider is reached
//! through the [`ChatCompletion`] capability, so the gateway never branches on which service it
//! is talking to beyond prompt composition. [`HttpChatProvider`] is the production
//! implementation; tests plug in their own.

use crate::config::ApiKey;
use crate::constants::{
    APP_REFERER, APP_TITLE, OPENAI_API_KEY_VAR, OPENAI_ENDPOINT, OPENAI_MODEL,
    OPENROUTER_API_KEY_VAR, OPENROUTER_ENDPOINT, OPENROUTER_MODEL, TEMPERATURE,
    UPSTREAM_BODY_SNIPPET_LEN,
};
use crate::{ScenarioError, ScenarioResult, UpstreamFailure};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

/// Hosted chat-completion services a scenario can be generated with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Claude 3 Haiku routed through OpenRouter.
    #[default]
    OpenRouter,
    /// GPT-4o on the OpenAI API.
    OpenAi,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenRouter, Provider::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::OpenAi => "openai",
        }
    }

    /// Human-readable name for menus and listings.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "Claude 3 (OpenRouter)",
            Provider::OpenAi => "OpenAI GPT-4o",
        }
    }

    pub fn credential_env_var(&self) -> &'static str {
        match self {
            Provider::OpenRouter => OPENROUTER_API_KEY_VAR,
            Provider::OpenAi => OPENAI_API_KEY_VAR,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::OpenRouter => OPENROUTER_ENDPOINT,
            Provider::OpenAi => OPENAI_ENDPOINT,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Provider::OpenRouter => OPENROUTER_MODEL,
            Provider::OpenAi => OPENAI_MODEL,
        }
    }

    /// Additional headers the service expects besides authorization.
    pub fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Provider::OpenRouter => &[("HTTP-Referer", APP_REFERER), ("X-Title", APP_TITLE)],
            Provider::OpenAi => &[],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Provider::OpenRouter),
            "openai" => Ok(Provider::OpenAi),
            other => Err(ScenarioError::Validation(format!(
                "unknown provider '{other}' (expected 'openrouter' or 'openai')"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of a chat-completion request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single-turn chat-completion capability.
///
/// Implementations send `messages` as one request and return the text of the top completion.
/// Failures are reported as [`ScenarioError::Upstream`]; implementations never retry.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> ScenarioResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Extracts `choices[0].message.content` from a chat-completion response body.
pub fn parse_completion_body(body: &[u8]) -> Result<String, UpstreamFailure> {
    let parsed: ChatResponse = serde_json::from_slice(body)
        .map_err(|e| UpstreamFailure::Malformed(format!("invalid completion payload: {e}")))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamFailure::Malformed("response has no choices".into()))?
        .message
        .content
        .ok_or_else(|| UpstreamFailure::Malformed("top choice has no content".into()))?;

    if content.trim().is_empty() {
        return Err(UpstreamFailure::Malformed("top choice content is empty".into()));
    }
    Ok(content)
}

fn snippet(body: &str) -> String {
    if body.len() <= UPSTREAM_BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = UPSTREAM_BODY_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Chat-completion client for one hosted provider, backed by `reqwest`.
pub struct HttpChatProvider {
    provider: Provider,
    client: Client,
    api_key: ApiKey,
    endpoint: String,
    timeout: Duration,
}

impl HttpChatProvider {
    /// Creates a client for `provider` using its default endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Config`] if the HTTP client cannot be constructed.
    pub fn new(provider: Provider, api_key: ApiKey, timeout: Duration) -> ScenarioResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ScenarioError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            provider,
            client,
            api_key,
            endpoint: provider.endpoint().to_string(),
            timeout,
        })
    }

    /// Overrides the endpoint, for compatible gateways and local proxies.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> ScenarioError {
        let failure = if err.is_timeout() {
            UpstreamFailure::Timeout
        } else {
            UpstreamFailure::Transport(err.to_string())
        };
        ScenarioError::upstream(self.provider, failure)
    }
}

#[async_trait]
impl ChatCompletion for HttpChatProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> ScenarioResult<String> {
        let body = ChatRequest {
            model: self.provider.model(),
            messages,
            temperature: TEMPERATURE,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .timeout(self.timeout)
            .json(&body);
        for (name, value) in self.provider.extra_headers() {
            request = request.header(*name, *value);
        }

        tracing::debug!(
            provider = %self.provider,
            endpoint = %self.endpoint,
            "sending completion request"
        );
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            return Err(ScenarioError::upstream(
                self.provider,
                UpstreamFailure::Status {
                    status: status.as_u16(),
                    body: snippet(&text),
                },
            ));
        }

        parse_completion_body(&bytes).map_err(|f| ScenarioError::upstream(self.provider, f))
    }
}
