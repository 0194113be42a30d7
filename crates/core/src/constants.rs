//! Constants used throughout the scenario core crate.
//!
//! Endpoints, model names and prompt vocabulary live here so that provider wiring and
//! prompt templates stay consistent.

/// Application title sent to providers that accept attribution headers.
pub const APP_TITLE: &str = "Generative Scenario Explorer";

/// Referer sent to OpenRouter for attribution.
pub const APP_REFERER: &str = "https://generative-scenario-explorer.local";

/// OpenRouter chat-completion endpoint.
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model requested from OpenRouter.
pub const OPENROUTER_MODEL: &str = "anthropic/claude-3-haiku";

/// Environment variable holding the OpenRouter credential.
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// OpenAI chat-completion endpoint.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Model requested from OpenAI.
pub const OPENAI_MODEL: &str = "gpt-4o";

/// Environment variable holding the OpenAI credential.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Sampling temperature used for every completion request.
pub const TEMPERATURE: f32 = 0.7;

/// Default per-request timeout for provider calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per provider call (1 means no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Upper bound accepted for the retry policy.
pub const MAX_ATTEMPTS_LIMIT: u32 = 5;

/// Delay between retry attempts, multiplied by the attempt number.
pub const RETRY_BACKOFF_MS: u64 = 500;

/// Default artificial delay before the mitigation comparison is returned, in milliseconds.
pub const DEFAULT_MITIGATION_DELAY_MS: u64 = 2_000;

/// Maximum number of bytes of an upstream error body kept in error messages.
pub const UPSTREAM_BODY_SNIPPET_LEN: usize = 512;

/// Closed risk-category vocabulary offered to the tagging prompt.
///
/// Returned labels are not checked against this list.
pub const TAG_VOCABULARY: [&str; 7] = [
    "CAT",
    "Cyber",
    "Systemic",
    "Health",
    "Supply Chain",
    "Political",
    "ESG",
];
