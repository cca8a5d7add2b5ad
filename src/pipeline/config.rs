use serde::{Deserialize, Serialize};

use super::error::Error;
use crate::adapt::Adapter;
use crate::curate::SamplingConfig;

/// Settings for the ingest stage.
///
/// ```toml
/// adapter = "aizynth"
/// model = "aizynth-mcts"
/// anonymize = true
///
/// [sampling]
/// strategy = "top-k"
/// k = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Registered adapter name.
    pub adapter: Option<String>,
    /// Model name used for the output directory; defaults to the adapter name.
    pub model: Option<String>,
    pub sampling: Option<SamplingConfig>,
    /// Name the output directory after a hash of the model name.
    pub anonymize: bool,
}

impl IngestConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn resolve_adapter(&self) -> Result<Adapter, Error> {
        match &self.adapter {
            Some(name) => Ok(Adapter::by_name(name)?),
            None => Err(Error::MissingAdapter {
                available: Adapter::names().join(", "),
            }),
        }
    }

    pub fn model_name<'a>(&'a self, adapter: &'a Adapter) -> &'a str {
        self.model.as_deref().unwrap_or(adapter.name())
    }
}

/// Settings for the score stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreConfig {
    /// Key for solvability verdicts; defaults to the stock file's stem.
    pub stock_name: Option<String>,
}

impl ScoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curate::SamplingStrategy;

    #[test]
    fn parses_full_ingest_config() {
        let config = IngestConfig::from_toml_str(
            r#"
            adapter = "retrostar"
            model = "retro-star-0"
            anonymize = true

            [sampling]
            strategy = "random-k"
            k = 5
            seed = 17
            "#,
        )
        .unwrap();

        assert_eq!(config.adapter.as_deref(), Some("retrostar"));
        assert!(config.anonymize);
        let sampling = config.sampling.unwrap();
        assert_eq!(sampling.strategy, SamplingStrategy::RandomK);
        assert_eq!(sampling.k, 5);
        assert_eq!(sampling.seed, 17);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = IngestConfig::from_toml_str("").unwrap();
        assert_eq!(config, IngestConfig::default());
        assert!(matches!(config.resolve_adapter(), Err(Error::MissingAdapter { .. })));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(IngestConfig::from_toml_str("adaptor = \"aizynth\"").is_err());
        assert!(ScoreConfig::from_toml_str("stock = \"x\"").is_err());
    }

    #[test]
    fn unknown_adapter_surfaces_registry_error() {
        let config = IngestConfig {
            adapter: Some("nope".into()),
            ..IngestConfig::default()
        };
        assert!(matches!(
            config.resolve_adapter(),
            Err(Error::Adapt(crate::adapt::Error::UnknownAdapter { .. }))
        ));
    }

    #[test]
    fn model_name_defaults_to_adapter() {
        let adapter = Adapter::by_name("dms").unwrap();
        let config = IngestConfig::default();
        assert_eq!(config.model_name(&adapter), "dms");
        let named = IngestConfig {
            model: Some("dms-explorer".into()),
            ..IngestConfig::default()
        };
        assert_eq!(named.model_name(&adapter), "dms-explorer");
    }

    #[test]
    fn parses_score_config() {
        let config = ScoreConfig::from_toml_str("stock_name = \"emolecules\"").unwrap();
        assert_eq!(config.stock_name.as_deref(), Some("emolecules"));
    }
}
