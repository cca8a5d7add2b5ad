use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::config::IngestConfig;
use super::error::Error;
use crate::adapt::{Adapter, BuildReport, TargetInput};
use crate::chem::Chemistry;
use crate::curate::{SamplingConfig, deduplicate, sample};
use crate::io::{self, raw::RawPredictions};
use crate::model::{Route, RouteSet};
use crate::provenance::{ArtifactStore, ContentHash, Manifest};

pub const STAGE: &str = "ingest";
pub const ROUTES_FILE: &str = "routes.json";

/// Counters reported by the ingest stage and recorded in its manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStatistics {
    /// Targets in the targets file.
    pub raw_inputs: usize,
    /// Targets for which the raw file holds a prediction.
    pub targets_with_predictions: usize,
    /// Targets whose raw blob failed schema validation.
    pub schema_failures: usize,
    /// Targets whose own structure could not be canonicalized.
    pub invalid_targets: usize,
    pub routes_generated: usize,
    pub routes_rejected: usize,
    pub routes_saved: usize,
    pub cycles: usize,
    pub discarded_reactions: usize,
}

impl IngestStatistics {
    fn record(&mut self, outcome: &TargetOutcome) {
        self.raw_inputs += 1;
        match outcome.status {
            TargetStatus::NoPrediction => return,
            TargetStatus::SchemaFailure => self.schema_failures += 1,
            TargetStatus::InvalidTarget => self.invalid_targets += 1,
            TargetStatus::Adapted => {}
        }
        self.targets_with_predictions += 1;
        self.routes_generated += outcome.generated;
        self.routes_rejected += outcome.report.rejected;
        self.routes_saved += outcome.routes.len();
        self.cycles += outcome.report.cycles;
        self.discarded_reactions += outcome.report.discarded_reactions;
    }

    /// Field name → count, for manifests and display.
    pub fn entries(&self) -> BTreeMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetStatus {
    NoPrediction,
    SchemaFailure,
    InvalidTarget,
    Adapted,
}

#[derive(Debug)]
struct TargetOutcome {
    id: String,
    status: TargetStatus,
    generated: usize,
    report: BuildReport,
    routes: Vec<Route>,
}

/// Adapts, deduplicates and samples the routes of every target.
///
/// Targets are processed in parallel; each gets an entry in the result,
/// empty when the model produced nothing usable for it. Failures never cross
/// target boundaries.
pub fn process_targets<C: Chemistry + ?Sized>(
    targets: &[TargetInput],
    raw: &RawPredictions,
    adapter: Adapter,
    sampling: Option<&SamplingConfig>,
    chem: &C,
) -> (RouteSet, IngestStatistics) {
    let outcomes: Vec<TargetOutcome> = targets
        .par_iter()
        .map(|target| process_target(target, raw.get(&target.id), adapter, sampling, chem))
        .collect();

    let mut stats = IngestStatistics::default();
    let mut set = RouteSet::new();
    for outcome in outcomes {
        stats.record(&outcome);
        set.insert(outcome.id, outcome.routes);
    }
    (set, stats)
}

fn process_target<C: Chemistry + ?Sized>(
    target: &TargetInput,
    raw: Option<&Value>,
    adapter: Adapter,
    sampling: Option<&SamplingConfig>,
    chem: &C,
) -> TargetOutcome {
    let mut outcome = TargetOutcome {
        id: target.id.clone(),
        status: TargetStatus::NoPrediction,
        generated: 0,
        report: BuildReport::default(),
        routes: Vec::new(),
    };
    let Some(raw) = raw else {
        return outcome;
    };

    match adapter.adapt(raw.clone(), target, chem) {
        Ok(adaptation) => {
            outcome.status = TargetStatus::Adapted;
            outcome.generated = adaptation.routes.len();
            outcome.report = adaptation.report;

            let mut routes = deduplicate(adaptation.routes);
            if let Some(config) = sampling {
                routes = sample(routes, config);
            }
            outcome.routes = routes;
        }
        Err(e @ crate::adapt::Error::SchemaValidation { .. }) => {
            warn!(target = %target.id, "{e}");
            outcome.status = TargetStatus::SchemaFailure;
        }
        Err(e) => {
            warn!(target = %target.id, "{e}");
            outcome.status = TargetStatus::InvalidTarget;
        }
    }
    outcome
}

/// Directory name for a model's processed output.
pub fn model_directory(model: &str, anonymize: bool) -> String {
    if anonymize {
        let hash = ContentHash::with_domain(b"model-name", &[model.as_bytes()]);
        format!("model-{}", hash.short())
    } else {
        model.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub routes: RouteSet,
    pub output: PathBuf,
    pub manifest: Manifest,
    pub statistics: IngestStatistics,
}

/// Runs the ingest stage: reads the raw predictions and targets, builds the
/// curated route set and writes it with its manifest under `output_dir`.
pub fn ingest<C: Chemistry + ?Sized>(
    store: &ArtifactStore,
    config: &IngestConfig,
    raw_path: &Path,
    targets_path: &Path,
    output_dir: &Path,
    chem: &C,
) -> Result<IngestOutcome, Error> {
    let adapter = config.resolve_adapter()?;

    let raw_bytes = fs::read(raw_path).map_err(|e| Error::file(raw_path, e))?;
    let raw = io::raw::read(&raw_bytes[..]).map_err(|e| Error::file(raw_path, e))?;
    let target_bytes = fs::read(targets_path).map_err(|e| Error::file(targets_path, e))?;
    let targets = io::targets::read(&target_bytes[..]).map_err(|e| Error::file(targets_path, e))?;

    let unknown = raw.keys().filter(|id| !targets.iter().any(|t| &t.id == *id)).count();
    if unknown > 0 {
        warn!(count = unknown, "raw predictions for targets not in the targets file are ignored");
    }

    let (routes, statistics) =
        process_targets(&targets, &raw, adapter, config.sampling.as_ref(), chem);

    let model = config.model_name(&adapter);
    let output = output_dir
        .join(model_directory(model, config.anonymize))
        .join(ROUTES_FILE);
    let bytes = io::routes::to_bytes(&routes).map_err(|e| Error::file(&output, e))?;

    let mut builder = Manifest::builder(STAGE)
        .input(crate::provenance::InputRef {
            reference: store.reference_for(raw_path)?,
            hash: ContentHash::of_raw_input(adapter.name(), &raw_bytes),
            adapter: Some(adapter.name().to_string()),
        })
        .input(crate::provenance::InputRef {
            reference: store.reference_for(targets_path)?,
            hash: ContentHash::of_artifact(&target_bytes),
            adapter: None,
        })
        .parameter("adapter", adapter.name())
        .parameter("model", model)
        .parameter("anonymize", config.anonymize)
        .parameter("route_set_hash", ContentHash::of_route_set(&routes)?.to_string())
        .statistics(statistics.entries());
    if let Some(sampling) = &config.sampling {
        builder = builder
            .parameter("sampling_strategy", sampling.strategy.to_string())
            .parameter("sampling_k", sampling.k as u64)
            .parameter("sampling_seed", sampling.seed);
    }

    let manifest = store.write_with_manifest(&output, &bytes, builder)?;
    info!(
        output = %manifest.output_ref,
        targets = routes.target_count(),
        routes = statistics.routes_saved,
        "ingest complete"
    );

    Ok(IngestOutcome {
        routes,
        output,
        manifest,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::LexicalChemistry;
    use crate::curate::SamplingStrategy;
    use serde_json::json;

    fn ethanol(first: &str, second: &str) -> Value {
        json!({
            "type": "mol", "smiles": "CCO",
            "children": [{"type": "reaction", "children": [
                {"type": "mol", "smiles": first, "in_stock": true},
                {"type": "mol", "smiles": second, "in_stock": true}
            ]}]
        })
    }

    fn targets() -> Vec<TargetInput> {
        vec![
            TargetInput::new("ethanol", "CCO"),
            TargetInput::new("missing", "CCN"),
            TargetInput::new("broken", "CC=O"),
        ]
    }

    fn raw() -> RawPredictions {
        let mut raw = RawPredictions::new();
        raw.insert(
            "ethanol".into(),
            json!([ethanol("CC", "O"), ethanol("C", "CO"), ethanol("O", "CC")]),
        );
        raw.insert("broken".into(), json!({"not": "a list"}));
        raw
    }

    #[test]
    fn every_target_gets_an_entry() {
        let adapter = Adapter::by_name("aizynth").unwrap();
        let (set, stats) = process_targets(&targets(), &raw(), adapter, None, &LexicalChemistry);

        assert_eq!(set.target_count(), 3);
        assert!(set.get("missing").unwrap().is_empty());
        assert!(set.get("broken").unwrap().is_empty());

        let ranks: Vec<_> = set.get("ethanol").unwrap().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);

        assert_eq!(stats.raw_inputs, 3);
        assert_eq!(stats.targets_with_predictions, 2);
        assert_eq!(stats.schema_failures, 1);
        assert_eq!(stats.routes_generated, 3);
        assert_eq!(stats.routes_saved, 2);
    }

    #[test]
    fn sampling_runs_after_dedup() {
        let adapter = Adapter::by_name("aizynth").unwrap();
        let sampling = SamplingConfig::new(SamplingStrategy::TopK, 1);
        let (set, stats) =
            process_targets(&targets(), &raw(), adapter, Some(&sampling), &LexicalChemistry);
        let ranks: Vec<_> = set.get("ethanol").unwrap().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1]);
        assert_eq!(stats.routes_saved, 1);
    }

    #[test]
    fn statistics_entries_are_named_counts() {
        let stats = IngestStatistics {
            routes_saved: 4,
            ..IngestStatistics::default()
        };
        let entries = stats.entries();
        assert_eq!(entries.get("routes_saved"), Some(&json!(4)));
        assert!(entries.contains_key("schema_failures"));
    }

    #[test]
    fn anonymized_directory_hides_model_name() {
        let dir = model_directory("aizynth-mcts", true);
        assert!(dir.starts_with("model-"));
        assert!(!dir.contains("aizynth"));
        assert_eq!(dir, model_directory("aizynth-mcts", true));
        assert_eq!(model_directory("aizynth-mcts", false), "aizynth-mcts");
    }
}
