//! Property tests for chain ordering
//!
//! Uses only unconfigured entries for the async property so no network is
//! involved: the orchestrator must report every entry, once, in input order.

use garagebill::fallback::{CallOptions, FallbackClient};
use garagebill::providers::{ModelConfig, Provider};
use proptest::prelude::*;

fn provider_strategy() -> impl Strategy<Value = Provider> {
    prop_oneof![
        Just(Provider::Gemini),
        Just(Provider::OpenAi),
        Just(Provider::OpenRouter),
        Just(Provider::Grok),
    ]
}

fn entry_strategy() -> impl Strategy<Value = ModelConfig> {
    (
        provider_strategy(),
        "[a-z0-9][a-z0-9./-]{0,20}",
        prop_oneof![Just(String::new()), "[A-Za-z0-9]{1,16}"],
    )
        .prop_map(|(provider, model, credential)| ModelConfig::new(provider, model, credential))
}

proptest! {
    #[test]
    fn list_available_is_ordered_subset(chain in prop::collection::vec(entry_strategy(), 0..12)) {
        let expected: Vec<ModelConfig> = chain.iter().filter(|c| c.is_configured()).cloned().collect();
        let client = FallbackClient::new(chain).unwrap();

        let actual: Vec<ModelConfig> = client.list_available().into_iter().cloned().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn unconfigured_chain_reports_every_entry_in_order(
        entries in prop::collection::vec((provider_strategy(), "[a-z0-9-]{1,12}"), 0..10)
    ) {
        let chain: Vec<ModelConfig> = entries
            .iter()
            .map(|(p, m)| ModelConfig::new(*p, m.clone(), ""))
            .collect();
        let client = FallbackClient::new(chain.clone()).unwrap();

        let err = tokio_test::block_on(client.call_with_fallback("notes", CallOptions::default()))
            .expect_err("nothing is configured");

        prop_assert_eq!(err.attempts().len(), chain.len());
        for (attempt, config) in err.attempts().iter().zip(&chain) {
            prop_assert_eq!(&attempt.config, config);
            prop_assert_eq!(attempt.error.as_str(), "credential not configured");
        }

        let expected_message: Vec<String> = chain
            .iter()
            .map(|c| format!("{}/{}: credential not configured", c.provider(), c.model()))
            .collect();
        prop_assert_eq!(err.to_string(), expected_message.join("\n"));
    }
}
