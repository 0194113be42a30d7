//! Scenario creation: validate, generate, tag, store.

use crate::gateway::ScenarioGateway;
use crate::portfolio::{PortfolioStore, ScenarioRecord};
use crate::provider::Provider;
use crate::{ScenarioError, ScenarioResult};
use scenario_types::NonEmptyText;
use std::sync::Arc;

/// What to do when the narrative succeeded but tagging failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TagFailurePolicy {
    /// Fail the whole operation and store nothing.
    #[default]
    Abort,
    /// Store the narrative with an empty tag list.
    StoreUntagged,
}

impl std::str::FromStr for TagFailurePolicy {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "store-untagged" => Ok(Self::StoreUntagged),
            other => Err(ScenarioError::Validation(format!(
                "unknown tag failure policy '{other}' (expected 'abort' or 'store-untagged')"
            ))),
        }
    }
}

/// Creates scenarios and appends them to a session's portfolio.
#[derive(Clone)]
pub struct ScenarioService {
    gateway: Arc<ScenarioGateway>,
    tag_failure: TagFailurePolicy,
}

impl ScenarioService {
    pub fn new(gateway: Arc<ScenarioGateway>, tag_failure: TagFailurePolicy) -> Self {
        Self {
            gateway,
            tag_failure,
        }
    }

    pub fn gateway(&self) -> &ScenarioGateway {
        &self.gateway
    }

    /// Generates a scenario from `seed` with `provider` and appends it to `store`.
    ///
    /// The seed is validated before any provider is contacted. Under [`TagFailurePolicy::Abort`]
    /// the tagging provider must also be configured before the narrative is requested. The
    /// record is appended only after the narrative (and, under `Abort`, the tags) succeeded; on
    /// any error `store` is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`ScenarioError::Validation`] for an empty or whitespace-only seed.
    /// - [`ScenarioError::Config`] / [`ScenarioError::Upstream`] from the gateway.
    pub async fn create_scenario(
        &self,
        store: &PortfolioStore,
        seed: &str,
        provider: Provider,
    ) -> ScenarioResult<ScenarioRecord> {
        let seed = NonEmptyText::new(seed)
            .map_err(|_| ScenarioError::Validation("seed prompt cannot be empty".into()))?;

        if self.tag_failure == TagFailurePolicy::Abort {
            self.gateway.ensure_configured(self.gateway.tagging_provider())?;
        }

        let narrative = self.gateway.generate_narrative(&seed, provider).await?;

        let tags = match self.gateway.extract_tags(&narrative).await {
            Ok(tags) => tags,
            Err(err) if self.tag_failure == TagFailurePolicy::StoreUntagged => {
                tracing::warn!("tagging failed, storing scenario without tags: {err}");
                Vec::new()
            }
            Err(err) => {
                tracing::error!("tagging failed, scenario discarded: {err}");
                return Err(err);
            }
        };

        let record = store.append(seed, narrative, tags);
        tracing::info!(
            scenario_id = %record.id(),
            %provider,
            tags = ?record.tags(),
            "scenario created"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::ScriptedProvider;

    fn service(
        writer: Vec<Result<&str, u16>>,
        tagger: Vec<Result<&str, u16>>,
        policy: TagFailurePolicy,
    ) -> (ScenarioService, Arc<ScriptedProvider>, Arc<ScriptedProvider>) {
        let writer = ScriptedProvider::new(Provider::OpenAi, writer);
        let tagger = ScriptedProvider::new(Provider::OpenRouter, tagger);
        let gateway = ScenarioGateway::new(Provider::OpenRouter)
            .with_provider(Provider::OpenAi, writer.clone())
            .with_provider(Provider::OpenRouter, tagger.clone());
        (ScenarioService::new(Arc::new(gateway), policy), writer, tagger)
    }

    #[tokio::test]
    async fn hurricane_ransomware_end_to_end() {
        let (svc, _, _) = service(
            vec![],
            vec![Ok("A Category 4 hurricane..."), Ok("CAT, Cyber")],
            TagFailurePolicy::Abort,
        );
        let store = PortfolioStore::new();

        let record = svc
            .create_scenario(
                &store,
                "What if a hurricane hits Florida during a ransomware attack?",
                Provider::OpenRouter,
            )
            .await
            .unwrap();

        assert_eq!(record.narrative(), "A Category 4 hurricane...");
        assert_eq!(record.tags(), ["CAT", "Cyber"]);
        assert_eq!(
            record.prompt().as_str(),
            "What if a hurricane hits Florida during a ransomware attack?"
        );
        assert_eq!(store.list(), vec![record]);
    }

    #[tokio::test]
    async fn blank_seed_is_rejected_before_any_call() {
        let (svc, writer, tagger) =
            service(vec![Ok("n")], vec![Ok("CAT")], TagFailurePolicy::Abort);
        let store = PortfolioStore::new();

        for seed in ["", "   ", "\n\t"] {
            let err = svc
                .create_scenario(&store, seed, Provider::OpenAi)
                .await
                .unwrap_err();
            assert!(matches!(err, ScenarioError::Validation(_)));
        }
        assert_eq!(writer.calls(), 0);
        assert_eq!(tagger.calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn narrative_failure_leaves_store_unchanged() {
        let (svc, _, tagger) = service(vec![Err(500)], vec![Ok("CAT")], TagFailurePolicy::Abort);
        let store = PortfolioStore::new();
        store.append(NonEmptyText::new("existing").unwrap(), "n", vec![]);

        let err = svc
            .create_scenario(&store, "pandemic", Provider::OpenAi)
            .await
            .unwrap_err();

        assert!(matches!(err, ScenarioError::Upstream { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(tagger.calls(), 0);
    }

    #[tokio::test]
    async fn tag_failure_aborts_by_default() {
        let (svc, _, _) = service(vec![Ok("narrative")], vec![Err(429)], TagFailurePolicy::Abort);
        let store = PortfolioStore::new();

        let err = svc
            .create_scenario(&store, "pandemic", Provider::OpenAi)
            .await
            .unwrap_err();

        assert!(matches!(err, ScenarioError::Upstream { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn tag_failure_can_store_untagged() {
        let (svc, _, _) = service(
            vec![Ok("narrative")],
            vec![Err(429)],
            TagFailurePolicy::StoreUntagged,
        );
        let store = PortfolioStore::new();

        let record = svc
            .create_scenario(&store, "pandemic", Provider::OpenAi)
            .await
            .unwrap();

        assert!(record.tags().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unconfigured_provider_is_config_error() {
        let tagger = ScriptedProvider::new(Provider::OpenRouter, vec![]);
        let gateway =
            ScenarioGateway::new(Provider::OpenRouter).with_provider(Provider::OpenRouter, tagger);
        let svc = ScenarioService::new(Arc::new(gateway), TagFailurePolicy::Abort);
        let store = PortfolioStore::new();

        let err = svc
            .create_scenario(&store, "drought", Provider::OpenAi)
            .await
            .unwrap_err();

        assert!(matches!(err, ScenarioError::Config(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_tagger_fails_before_narrative_under_abort() {
        let writer = ScriptedProvider::new(Provider::OpenAi, vec![Ok("narrative")]);
        let gateway = ScenarioGateway::new(Provider::OpenRouter)
            .with_provider(Provider::OpenAi, writer.clone());
        let svc = ScenarioService::new(Arc::new(gateway), TagFailurePolicy::Abort);
        let store = PortfolioStore::new();

        let err = svc
            .create_scenario(&store, "drought", Provider::OpenAi)
            .await
            .unwrap_err();

        assert!(matches!(err, ScenarioError::Config(_)));
        assert_eq!(writer.calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_tagger_stores_untagged_when_allowed() {
        let writer = ScriptedProvider::new(Provider::OpenAi, vec![Ok("narrative")]);
        let gateway = ScenarioGateway::new(Provider::OpenRouter)
            .with_provider(Provider::OpenAi, writer.clone());
        let svc = ScenarioService::new(Arc::new(gateway), TagFailurePolicy::StoreUntagged);
        let store = PortfolioStore::new();

        let record = svc
            .create_scenario(&store, "drought", Provider::OpenAi)
            .await
            .unwrap();

        assert!(record.tags().is_empty());
        assert_eq!(writer.calls(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn seed_is_stored_and_sent_as_given() {
        let (svc, writer, _) = service(
            vec![Ok("A flood...")],
            vec![Ok("CAT")],
            TagFailurePolicy::Abort,
        );
        let store = PortfolioStore::new();
        let seed = "  What if the Thames Barrier fails?\n";

        let record = svc
            .create_scenario(&store, seed, Provider::OpenAi)
            .await
            .unwrap();

        assert_eq!(record.prompt().as_str(), seed);
        let requests = writer.requests.lock();
        assert!(requests[0][1].content.ends_with(seed));
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!("abort".parse::<TagFailurePolicy>().unwrap(), TagFailurePolicy::Abort);
        assert_eq!(
            "Store-Untagged".parse::<TagFailurePolicy>().unwrap(),
            TagFailurePolicy::StoreUntagged
        );
        assert!("retry".parse::<TagFailurePolicy>().is_err());
    }
}
