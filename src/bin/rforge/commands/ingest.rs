use std::process::ExitCode;

use anyhow::{Context, Result};

use route_forge::pipeline::{IngestOutcome, ingest};
use route_forge::{Adapter, ArtifactStore, IngestConfig, LexicalChemistry};

use crate::cli::{GlobalOptions, IngestArgs};
use crate::config::build_ingest_config;
use crate::display::{Context as DisplayContext, Progress, print_ingest_summary, print_manifest_info};
use crate::util::text::count;

const TOTAL_STEPS: u8 = 2;

pub fn run_ingest(args: IngestArgs, global: &GlobalOptions, ctx: DisplayContext) -> Result<ExitCode> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Resolving configuration");
    let config = build_ingest_config(&args)?;
    let adapter = config.resolve_adapter()?;
    progress.complete_step("Resolving configuration", &config_substeps(&config, adapter));

    progress.step("Reconstructing routes");
    let store = ArtifactStore::new(global.root.clone());
    let outcome = ingest(
        &store,
        &config,
        &args.raw,
        &args.targets,
        &args.output_dir,
        &LexicalChemistry,
    )
    .context("Ingest failed")?;
    progress.complete_step("Reconstructing routes", &ingest_substeps(&outcome));

    if ctx.interactive {
        print_ingest_summary(&outcome.statistics);
        print_manifest_info(&outcome.manifest);
    }

    progress.finish("Ingest complete");

    if !ctx.quiet {
        println!("{}", outcome.output.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn config_substeps(config: &IngestConfig, adapter: Adapter) -> Vec<String> {
    let mut steps = vec![
        format!("Adapter {} ({} shape)", adapter.name(), adapter.shape()),
        format!("Model {}", config.model_name(&adapter)),
    ];

    if let Some(sampling) = &config.sampling {
        steps.push(format!(
            "Sample {} per target ({}, seed {})",
            sampling.k, sampling.strategy, sampling.seed
        ));
    }
    if config.anonymize {
        steps.push("Anonymize model directory".to_string());
    }

    steps
}

fn ingest_substeps(outcome: &IngestOutcome) -> Vec<String> {
    let stats = &outcome.statistics;
    let mut steps = vec![
        format!(
            "Adapt {} with predictions",
            count(stats.targets_with_predictions, "target")
        ),
        format!(
            "Keep {} of {} after curation",
            count(stats.routes_saved, "route"),
            stats.routes_generated
        ),
    ];

    if stats.cycles > 0 {
        steps.push(format!("Cut {} to leaves", count(stats.cycles, "cycle")));
    }
    if stats.schema_failures + stats.invalid_targets > 0 {
        steps.push(format!(
            "Skip {}",
            count(stats.schema_failures + stats.invalid_targets, "unusable target")
        ));
    }
    steps.push(format!("Write {}", outcome.manifest.output_ref));

    steps
}
