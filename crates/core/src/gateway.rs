//! Scenario generation gateway.
//!
//! The gateway turns a seed prompt into a narrative and a tag list by calling external
//! providers. It owns no session state: callers decide what to do with the result and append it
//! to a [`crate::PortfolioStore`] only once both calls have succeeded.

use crate::config::CoreConfig;
use crate::constants::{DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT, RETRY_BACKOFF_MS};
use crate::prompts::{finish_narrative, narrative_messages, parse_tags, tagging_messages};
use crate::provider::{ChatCompletion, ChatMessage, HttpChatProvider, Provider};
use crate::{ScenarioError, ScenarioResult};
use scenario_types::NonEmptyText;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Bounded retry policy for upstream failures.
///
/// Configuration and validation errors are never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Returns `None` unless `1 <= max_attempts <= MAX_ATTEMPTS_LIMIT`.
    pub fn new(max_attempts: u32) -> Option<Self> {
        (1..=MAX_ATTEMPTS_LIMIT).contains(&max_attempts).then(|| Self {
            max_attempts,
            ..Self::default()
        })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// Output of a successful generation: the narrative and its tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedScenario {
    pub narrative: String,
    pub tags: Vec<String>,
}

/// Routes generation and tagging requests to configured providers.
pub struct ScenarioGateway {
    providers: HashMap<Provider, Arc<dyn ChatCompletion>>,
    tagging_provider: Provider,
    retry: RetryPolicy,
}

impl ScenarioGateway {
    /// Creates a gateway with no providers; tagging requests go to `tagging_provider`.
    pub fn new(tagging_provider: Provider) -> Self {
        Self {
            providers: HashMap::new(),
            tagging_provider,
            retry: RetryPolicy::default(),
        }
    }

    /// Builds an HTTP client for every provider that has a credential.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Config`] if an HTTP client cannot be constructed.
    pub fn from_config(cfg: &CoreConfig) -> ScenarioResult<Self> {
        let mut gateway = Self::new(cfg.tagging_provider()).with_retry(cfg.retry());
        for provider in Provider::ALL {
            match cfg.credential(provider) {
                Some(key) => {
                    let client = HttpChatProvider::new(provider, key.clone(), cfg.http_timeout())?;
                    gateway = gateway.with_provider(provider, Arc::new(client));
                }
                None => tracing::warn!(
                    "{} is not set; provider {} is unavailable",
                    provider.credential_env_var(),
                    provider
                ),
            }
        }
        Ok(gateway)
    }

    pub fn with_provider(mut self, provider: Provider, client: Arc<dyn ChatCompletion>) -> Self {
        self.providers.insert(provider, client);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        self.providers.contains_key(&provider)
    }

    pub fn tagging_provider(&self) -> Provider {
        self.tagging_provider
    }

    /// Fails with [`ScenarioError::Config`] if `provider` has no credential.
    pub fn ensure_configured(&self, provider: Provider) -> ScenarioResult<()> {
        self.client(provider).map(|_| ())
    }

    fn client(&self, provider: Provider) -> ScenarioResult<&Arc<dyn ChatCompletion>> {
        self.providers.get(&provider).ok_or_else(|| {
            ScenarioError::Config(format!(
                "provider {} has no credential configured (set {})",
                provider,
                provider.credential_env_var()
            ))
        })
    }

    async fn complete(
        &self,
        provider: Provider,
        messages: &[ChatMessage],
    ) -> ScenarioResult<String> {
        let client = self.client(provider)?;
        let mut attempt = 1;
        loop {
            match client.complete(messages).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts() => {
                    tracing::warn!(
                        %provider,
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        "provider call failed, retrying: {err}"
                    );
                    tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Asks `provider` to expand `seed` into a risk narrative.
    ///
    /// # Errors
    ///
    /// - [`ScenarioError::Config`] if `provider` has no credential.
    /// - [`ScenarioError::Upstream`] on network failure, non-success status, timeout or a
    ///   response without completion text.
    pub async fn generate_narrative(
        &self,
        seed: &NonEmptyText,
        provider: Provider,
    ) -> ScenarioResult<String> {
        let messages = narrative_messages(provider, seed);
        let raw = self.complete(provider, &messages).await?;
        let narrative = finish_narrative(provider, raw);
        tracing::info!(%provider, chars = narrative.chars().count(), "narrative generated");
        Ok(narrative)
    }

    /// Classifies `narrative` into risk-category tags using the tagging provider.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::Validation`] for a blank narrative, otherwise the same taxonomy as
    /// [`Self::generate_narrative`].
    pub async fn extract_tags(&self, narrative: &str) -> ScenarioResult<Vec<String>> {
        if narrative.trim().is_empty() {
            return Err(ScenarioError::Validation(
                "narrative to tag cannot be empty".into(),
            ));
        }
        let messages = tagging_messages(narrative);
        let reply = self.complete(self.tagging_provider, &messages).await?;
        let tags = parse_tags(&reply);
        tracing::info!(provider = %self.tagging_provider, ?tags, "tags extracted");
        Ok(tags)
    }

    /// Generates a narrative and then tags it. Fails as soon as either call fails.
    ///
    /// Both providers must be configured before the first request is sent.
    pub async fn generate(
        &self,
        seed: &NonEmptyText,
        provider: Provider,
    ) -> ScenarioResult<GeneratedScenario> {
        self.ensure_configured(self.tagging_provider)?;
        let narrative = self.generate_narrative(seed, provider).await?;
        let tags = self.extract_tags(&narrative).await?;
        Ok(GeneratedScenario { narrative, tags })
    }
}
