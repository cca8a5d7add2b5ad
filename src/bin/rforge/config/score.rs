use std::path::PathBuf;

use anyhow::{Context, Result};

use route_forge::ScoreConfig;

use super::read_config_file;
use crate::cli::ScoreArgs;

const DEFAULT_OUTPUT: &str = "scored.json";

pub fn build_score_config(args: &ScoreArgs) -> Result<ScoreConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = read_config_file(path)?;
            ScoreConfig::from_toml_str(&text)
                .with_context(|| format!("Invalid score configuration: {}", path.display()))?
        }
        None => ScoreConfig::default(),
    };

    if let Some(name) = &args.stock_name {
        config.stock_name = Some(name.clone());
    }

    Ok(config)
}

pub fn default_score_output(args: &ScoreArgs) -> PathBuf {
    match &args.output {
        Some(path) => path.clone(),
        None => args.routes.with_file_name(DEFAULT_OUTPUT),
    }
}
