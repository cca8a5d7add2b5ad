mod ingest;
mod score;

pub use ingest::build_ingest_config;
pub use score::{build_score_config, default_score_output};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))
}
