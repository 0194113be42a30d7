//! Prompt templates and reply parsing.

use crate::constants::TAG_VOCABULARY;
use crate::provider::{ChatMessage, Provider};
use scenario_types::NonEmptyText;

const ANALYST_PERSONA: &str = "You are a reinsurance risk analyst.";

/// Builds the single-turn request asking `provider` to expand `seed` into a narrative.
pub fn narrative_messages(provider: Provider, seed: &NonEmptyText) -> Vec<ChatMessage> {
    match provider {
        Provider::OpenRouter => vec![ChatMessage::user(format!(
            "Write a detailed reinsurance scenario: {seed}"
        ))],
        Provider::OpenAi => vec![
            ChatMessage::system(ANALYST_PERSONA),
            ChatMessage::user(format!("Write a detailed, plausible scenario: {seed}")),
        ],
    }
}

/// Applies provider-specific cleanup to a raw narrative completion.
///
/// OpenAI completions are trimmed; OpenRouter text is passed through unmodified.
pub fn finish_narrative(provider: Provider, raw: String) -> String {
    match provider {
        Provider::OpenRouter => raw,
        Provider::OpenAi => raw.trim().to_string(),
    }
}

/// Builds the classification request for `narrative`.
pub fn tagging_messages(narrative: &str) -> Vec<ChatMessage> {
    let vocabulary = TAG_VOCABULARY.join(", ");
    vec![ChatMessage::user(format!(
        "Read the following reinsurance risk scenario and identify relevant risk categories \
         from this list:\n[{vocabulary}]\n\n\
         Respond with a comma-separated list of the most relevant 2\u{2013}4 categories.\n\n\
         Scenario:\n\"\"\"\n{narrative}\n\"\"\"\n"
    ))]
}

/// Splits a tagging reply on commas, trims each fragment and drops empty ones.
///
/// Order is preserved and labels outside the vocabulary are kept as returned.
pub fn parse_tags(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Role;

    #[test]
    fn parse_tags_drops_blank_fragments() {
        assert_eq!(
            parse_tags("CAT, Cyber,  , Systemic"),
            vec!["CAT", "Cyber", "Systemic"]
        );
    }

    #[test]
    fn parse_tags_handles_empty_and_unknown_labels() {
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
        assert_eq!(parse_tags("Supply Chain,Volcanic"), vec!["Supply Chain", "Volcanic"]);
    }

    #[test]
    fn openrouter_narrative_is_single_user_message() {
        let seed = NonEmptyText::new("What if a drought hits LATAM?").unwrap();
        let messages = narrative_messages(Provider::OpenRouter, &seed);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(
            messages[0].content,
            "Write a detailed reinsurance scenario: What if a drought hits LATAM?"
        );
    }

    #[test]
    fn openai_narrative_sets_analyst_persona() {
        let seed = NonEmptyText::new("wildfire season").unwrap();
        let messages = narrative_messages(Provider::OpenAi, &seed);
        assert_eq!(messages[0], ChatMessage::system(ANALYST_PERSONA));
        assert_eq!(
            messages[1].content,
            "Write a detailed, plausible scenario: wildfire season"
        );
    }

    #[test]
    fn tagging_prompt_lists_vocabulary_and_narrative() {
        let messages = tagging_messages("A Category 4 hurricane...");
        let content = &messages[0].content;
        assert!(content.contains("[CAT, Cyber, Systemic, Health, Supply Chain, Political, ESG]"));
        assert!(content.contains("A Category 4 hurricane..."));
        assert!(content.contains("comma-separated"));
    }

    #[test]
    fn only_openai_narratives_are_trimmed() {
        assert_eq!(finish_narrative(Provider::OpenAi, "  text \n".into()), "text");
        assert_eq!(
            finish_narrative(Provider::OpenRouter, "  text \n".into()),
            "  text \n"
        );
    }
}
