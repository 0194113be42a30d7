//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads process-wide environment variables; binaries call [`RawConfig::from_env`]
//! after loading `.env` and hand the result to [`CoreConfig::resolve`].

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MITIGATION_DELAY_MS,
    MAX_ATTEMPTS_LIMIT,
};
use crate::gateway::RetryPolicy;
use crate::provider::Provider;
use crate::service::TagFailurePolicy;
use crate::{ScenarioError, ScenarioResult};
use std::time::Duration;

/// A provider credential. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a credential, treating blank values as absent.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Unparsed configuration values as read from the environment.
#[derive(Clone, Debug, Default)]
pub struct RawConfig {
    pub openrouter_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub tagging_provider: Option<String>,
    pub http_timeout_secs: Option<String>,
    pub max_attempts: Option<String>,
    pub tag_failure: Option<String>,
    pub mitigation_delay_ms: Option<String>,
}

impl RawConfig {
    /// Reads every recognised variable from the process environment.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            openrouter_api_key: var(Provider::OpenRouter.credential_env_var()),
            openai_api_key: var(Provider::OpenAi.credential_env_var()),
            tagging_provider: var("SCENARIO_TAGGING_PROVIDER"),
            http_timeout_secs: var("SCENARIO_HTTP_TIMEOUT_SECS"),
            max_attempts: var("SCENARIO_MAX_ATTEMPTS"),
            tag_failure: var("SCENARIO_TAG_FAILURE"),
            mitigation_delay_ms: var("SCENARIO_MITIGATION_DELAY_MS"),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    openrouter_api_key: Option<ApiKey>,
    openai_api_key: Option<ApiKey>,
    tagging_provider: Provider,
    http_timeout: Duration,
    retry: RetryPolicy,
    tag_failure: TagFailurePolicy,
    mitigation_delay: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            openai_api_key: None,
            tagging_provider: Provider::OpenRouter,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            tag_failure: TagFailurePolicy::default(),
            mitigation_delay: Duration::from_millis(DEFAULT_MITIGATION_DELAY_MS),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(
    name: &str,
    value: Option<String>,
) -> ScenarioResult<Option<T>> {
    non_blank(value)
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                ScenarioError::Config(format!("{name} must be a non-negative integer, got '{v}'"))
            })
        })
        .transpose()
}

impl CoreConfig {
    /// Parses and validates raw values, filling in defaults for anything unset or blank.
    ///
    /// Missing credentials are not an error here: the affected provider simply becomes
    /// unusable and selecting it later yields [`ScenarioError::Config`].
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Config`] for unparsable numbers, out-of-range attempts, a zero
    /// timeout, or unknown provider/policy names.
    pub fn resolve(raw: RawConfig) -> ScenarioResult<Self> {
        let defaults = Self::default();

        let tagging_provider = non_blank(raw.tagging_provider)
            .map(|v| {
                v.parse::<Provider>()
                    .map_err(|e| ScenarioError::Config(format!("SCENARIO_TAGGING_PROVIDER: {e}")))
            })
            .transpose()?
            .unwrap_or(defaults.tagging_provider);

        let timeout_secs =
            parse_number::<u64>("SCENARIO_HTTP_TIMEOUT_SECS", raw.http_timeout_secs)?;
        let http_timeout = match timeout_secs {
            Some(0) => {
                return Err(ScenarioError::Config(
                    "SCENARIO_HTTP_TIMEOUT_SECS must be greater than zero".into(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.http_timeout,
        };

        let max_attempts = parse_number::<u32>("SCENARIO_MAX_ATTEMPTS", raw.max_attempts)?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let retry = RetryPolicy::new(max_attempts).ok_or_else(|| {
            ScenarioError::Config(format!(
                "SCENARIO_MAX_ATTEMPTS must be between 1 and {MAX_ATTEMPTS_LIMIT}, got {max_attempts}"
            ))
        })?;

        let tag_failure = non_blank(raw.tag_failure)
            .map(|v| {
                v.parse::<TagFailurePolicy>()
                    .map_err(|e| ScenarioError::Config(format!("SCENARIO_TAG_FAILURE: {e}")))
            })
            .transpose()?
            .unwrap_or_default();

        let mitigation_delay =
            parse_number::<u64>("SCENARIO_MITIGATION_DELAY_MS", raw.mitigation_delay_ms)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.mitigation_delay);

        Ok(Self {
            openrouter_api_key: raw.openrouter_api_key.and_then(ApiKey::new),
            openai_api_key: raw.openai_api_key.and_then(ApiKey::new),
            tagging_provider,
            http_timeout,
            retry,
            tag_failure,
            mitigation_delay,
        })
    }

    pub fn with_credential(mut self, provider: Provider, key: ApiKey) -> Self {
        match provider {
            Provider::OpenRouter => self.openrouter_api_key = Some(key),
            Provider::OpenAi => self.openai_api_key = Some(key),
        }
        self
    }

    pub fn with_tagging_provider(mut self, provider: Provider) -> Self {
        self.tagging_provider = provider;
        self
    }

    pub fn with_tag_failure(mut self, policy: TagFailurePolicy) -> Self {
        self.tag_failure = policy;
        self
    }

    pub fn with_mitigation_delay(mut self, delay: Duration) -> Self {
        self.mitigation_delay = delay;
        self
    }

    pub fn credential(&self, provider: Provider) -> Option<&ApiKey> {
        match provider {
            Provider::OpenRouter => self.openrouter_api_key.as_ref(),
            Provider::OpenAi => self.openai_api_key.as_ref(),
        }
    }

    pub fn tagging_provider(&self) -> Provider {
        self.tagging_provider
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn tag_failure(&self) -> TagFailurePolicy {
        self.tag_failure
    }

    pub fn mitigation_delay(&self) -> Duration {
        self.mitigation_delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = CoreConfig::resolve(RawConfig::default()).unwrap();
        assert!(cfg.credential(Provider::OpenRouter).is_none());
        assert!(cfg.credential(Provider::OpenAi).is_none());
        assert_eq!(cfg.tagging_provider(), Provider::OpenRouter);
        assert_eq!(cfg.http_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.retry().max_attempts(), 1);
        assert_eq!(cfg.tag_failure(), TagFailurePolicy::Abort);
        assert_eq!(cfg.mitigation_delay(), Duration::from_millis(2_000));
    }

    #[test]
    fn blank_credentials_count_as_missing() {
        let cfg = CoreConfig::resolve(RawConfig {
            openrouter_api_key: Some("   ".into()),
            openai_api_key: Some(" sk-test ".into()),
            ..RawConfig::default()
        })
        .unwrap();
        assert!(cfg.credential(Provider::OpenRouter).is_none());
        assert_eq!(cfg.credential(Provider::OpenAi).unwrap().expose(), "sk-test");
    }

    #[test]
    fn parses_overrides() {
        let cfg = CoreConfig::resolve(RawConfig {
            tagging_provider: Some("openai".into()),
            http_timeout_secs: Some("5".into()),
            max_attempts: Some("3".into()),
            tag_failure: Some("store-untagged".into()),
            mitigation_delay_ms: Some("0".into()),
            ..RawConfig::default()
        })
        .unwrap();
        assert_eq!(cfg.tagging_provider(), Provider::OpenAi);
        assert_eq!(cfg.http_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.retry().max_attempts(), 3);
        assert_eq!(cfg.tag_failure(), TagFailurePolicy::StoreUntagged);
        assert_eq!(cfg.mitigation_delay(), Duration::ZERO);
    }

    #[test]
    fn rejects_invalid_values() {
        let cases = [
            RawConfig {
                http_timeout_secs: Some("soon".into()),
                ..RawConfig::default()
            },
            RawConfig {
                http_timeout_secs: Some("0".into()),
                ..RawConfig::default()
            },
            RawConfig {
                max_attempts: Some("0".into()),
                ..RawConfig::default()
            },
            RawConfig {
                max_attempts: Some("99".into()),
                ..RawConfig::default()
            },
            RawConfig {
                tagging_provider: Some("mistral".into()),
                ..RawConfig::default()
            },
            RawConfig {
                tag_failure: Some("shrug".into()),
                ..RawConfig::default()
            },
        ];
        for raw in cases {
            let debug = format!("{raw:?}");
            match CoreConfig::resolve(raw) {
                Err(ScenarioError::Config(_)) => {}
                other => panic!("expected Config error for {debug}, got {other:?}"),
            }
        }
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret").unwrap();
        assert!(!format!("{key:?}").contains("sk-secret"));
    }
}
