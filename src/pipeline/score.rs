use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::config::ScoreConfig;
use super::error::Error;
use crate::chem::Chemistry;
use crate::io;
use crate::model::RouteSet;
use crate::provenance::{ArtifactStore, ContentHash, InputRef, Manifest};
use crate::score::{SolvabilityScorer, annotate_set};

pub const STAGE: &str = "score";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreStatistics {
    pub targets: usize,
    pub solved_targets: usize,
    pub routes: usize,
    pub solvable_routes: usize,
}

impl ScoreStatistics {
    fn of(set: &RouteSet, stock: &str) -> Self {
        let mut stats = Self::default();
        for (_, routes) in set.iter() {
            stats.targets += 1;
            stats.routes += routes.len();
            let solvable = routes
                .iter()
                .filter(|r| r.solvability.get(stock).copied().unwrap_or(false))
                .count();
            stats.solvable_routes += solvable;
            if solvable > 0 {
                stats.solved_targets += 1;
            }
        }
        stats
    }
}

#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub routes: RouteSet,
    pub output: PathBuf,
    pub manifest: Manifest,
    pub statistics: ScoreStatistics,
}

/// Name under which verdicts are recorded: the configured name, else the
/// stock file's stem.
pub fn stock_name(config: &ScoreConfig, stock_path: &Path) -> String {
    config.stock_name.clone().unwrap_or_else(|| {
        stock_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stock".to_string())
    })
}

/// Runs the score stage: annotates every route in `routes_path` against the
/// stock and writes the result to `output` with a manifest chaining back to
/// the routes artifact.
pub fn score<C: Chemistry + ?Sized>(
    store: &ArtifactStore,
    config: &ScoreConfig,
    routes_path: &Path,
    stock_path: &Path,
    output: &Path,
    chem: &C,
) -> Result<ScoreOutcome, Error> {
    let routes_bytes = fs::read(routes_path).map_err(|e| Error::file(routes_path, e))?;
    let routes = io::routes::read(&routes_bytes[..]).map_err(|e| Error::file(routes_path, e))?;
    let routes_hash = ContentHash::of_artifact(&routes_bytes);

    if let Some(upstream) = store.manifest_for(routes_path)? {
        if upstream.output_hash != routes_hash {
            warn!(
                routes = %routes_path.display(),
                recorded = %upstream.output_hash,
                actual = %routes_hash,
                "routes artifact no longer matches its manifest"
            );
        }
    }

    let stock_bytes = fs::read(stock_path).map_err(|e| Error::file(stock_path, e))?;
    let name = stock_name(config, stock_path);
    let stock = io::stock::read(&stock_bytes[..], &name, chem)
        .map_err(|e| Error::file(stock_path, e))?;
    if stock.is_empty() {
        warn!(stock = %name, "stock is empty; no route will be solvable");
    }

    let scored = annotate_set(routes, &stock);
    let statistics = ScoreStatistics::of(&scored, stock.name());
    let bytes = io::routes::to_bytes(&scored).map_err(|e| Error::file(output, e))?;

    let builder = Manifest::builder(STAGE)
        .input(InputRef {
            reference: store.reference_for(routes_path)?,
            hash: routes_hash,
            adapter: None,
        })
        .input(InputRef {
            reference: store.reference_for(stock_path)?,
            hash: ContentHash::of_artifact(&stock_bytes),
            adapter: None,
        })
        .parameter("stock_name", name.as_str())
        .parameter("stock_size", stock.len() as u64)
        .statistic("targets", statistics.targets as u64)
        .statistic("solved_targets", statistics.solved_targets as u64)
        .statistic("routes", statistics.routes as u64)
        .statistic("solvable_routes", statistics.solvable_routes as u64);

    let manifest = store.write_with_manifest(output, &bytes, builder)?;
    info!(
        output = %manifest.output_ref,
        solved = statistics.solved_targets,
        targets = statistics.targets,
        "score complete"
    );

    Ok(ScoreOutcome {
        routes: scored,
        output: output.to_path_buf(),
        manifest,
        statistics,
    })
}
