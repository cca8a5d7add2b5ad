use anyhow::{Context, Result, bail};

use route_forge::{IngestConfig, SamplingConfig, SamplingStrategy};

use super::read_config_file;
use crate::cli::{IngestArgs, SamplingOptions, Strategy};

impl From<Strategy> for SamplingStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::TopK => SamplingStrategy::TopK,
            Strategy::RandomK => SamplingStrategy::RandomK,
            Strategy::ByLength => SamplingStrategy::ByLength,
        }
    }
}

pub fn build_ingest_config(args: &IngestArgs) -> Result<IngestConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = read_config_file(path)?;
            IngestConfig::from_toml_str(&text)
                .with_context(|| format!("Invalid ingest configuration: {}", path.display()))?
        }
        None => IngestConfig::default(),
    };

    if let Some(adapter) = &args.model.adapter {
        config.adapter = Some(adapter.clone());
    }
    if let Some(model) = &args.model.model {
        config.model = Some(model.clone());
    }
    if args.model.anonymize {
        config.anonymize = true;
    }
    config.sampling = merge_sampling(config.sampling, &args.sampling)?;

    Ok(config)
}

fn merge_sampling(
    file: Option<SamplingConfig>,
    opts: &SamplingOptions,
) -> Result<Option<SamplingConfig>> {
    let strategy = opts.sampling.map(SamplingStrategy::from);

    let merged = match (file, strategy, opts.k) {
        (None, None, None) => {
            if opts.seed.is_some() {
                bail!("--seed has no effect without --sampling or -k");
            }
            return Ok(None);
        }
        (None, Some(_), None) => bail!("--sampling requires -k"),
        (None, strategy, Some(k)) => {
            SamplingConfig::new(strategy.unwrap_or(SamplingStrategy::TopK), k)
        }
        (Some(mut config), strategy, k) => {
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            if let Some(k) = k {
                config.k = k;
            }
            config
        }
    };

    Ok(Some(match opts.seed {
        Some(seed) => merged.with_seed(seed),
        None => merged,
    }))
}
