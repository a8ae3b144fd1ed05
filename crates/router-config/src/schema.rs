//! Configuration schema and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One configured backend model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base endpoint URL, e.g. `https://api.anthropic.com`.
    pub url: String,
    /// API key for the endpoint. Empty means "use the caller's bearer token".
    #[serde(default)]
    pub api_key: String,
    /// Context window size in tokens.
    pub context_window: u64,
}

/// The full router configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Model catalog, keyed by model name.
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
    /// Agent identifier → model name.
    #[serde(default)]
    pub agent_model_map: BTreeMap<String, String>,
    /// Orchestrator tier (`haiku` | `sonnet` | `opus`) → model name.
    #[serde(default)]
    pub orchestrator_model_map: BTreeMap<String, String>,
}

impl RouterConfig {
    /// Checks the referential invariant: every routing-table value must be a
    /// key of `models`.
    ///
    /// Returns every violation, not just the first, so a broken config can be
    /// fixed in one pass.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (agent, model) in &self.agent_model_map {
            if !self.models.contains_key(model) {
                errors.push(format!(
                    "agent_model_map.{agent} references undefined model: {model}"
                ));
            }
        }

        for (tier, model) in &self.orchestrator_model_map {
            if !self.models.contains_key(model) {
                errors.push(format!(
                    "orchestrator_model_map.{tier} references undefined model: {model}"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(models: &[&str], agent: &[(&str, &str)], orch: &[(&str, &str)]) -> RouterConfig {
        RouterConfig {
            models: models
                .iter()
                .map(|m| {
                    (
                        (*m).to_string(),
                        ModelConfig {
                            url: "https://api.example.com".into(),
                            api_key: String::new(),
                            context_window: 200_000,
                        },
                    )
                })
                .collect(),
            agent_model_map: agent
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            orchestrator_model_map: orch
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn valid_config_passes() {
        let config = config_with(
            &["model-a", "model-b"],
            &[("explore", "model-a")],
            &[("haiku", "model-b")],
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dangling_references_are_all_reported() {
        let config = config_with(
            &["model-a"],
            &[("explore", "missing-1")],
            &[("haiku", "missing-2")],
        );
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("agent_model_map.explore"));
        assert!(errors[0].contains("missing-1"));
        assert!(errors[1].contains("orchestrator_model_map.haiku"));
    }

    #[test]
    fn toml_round_trip() {
        let config = config_with(&["model-a"], &[("writer", "model-a")], &[("opus", "model-a")]);
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: RouterConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
