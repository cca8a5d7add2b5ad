use std::process::ExitCode;

use anyhow::{Context, Result};

use route_forge::pipeline::score;
use route_forge::pipeline::score::stock_name;
use route_forge::{ArtifactStore, LexicalChemistry};

use crate::cli::{GlobalOptions, ScoreArgs};
use crate::config::{build_score_config, default_score_output};
use crate::display::{Context as DisplayContext, Progress, print_manifest_info, print_score_summary};
use crate::util::text::count;

const TOTAL_STEPS: u8 = 1;

pub fn run_score(args: ScoreArgs, global: &GlobalOptions, ctx: DisplayContext) -> Result<ExitCode> {
    let config = build_score_config(&args)?;
    let output = default_score_output(&args);
    let name = stock_name(&config, &args.stock);

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Scoring routes against stock");
    let store = ArtifactStore::new(global.root.clone());
    let outcome = score(
        &store,
        &config,
        &args.routes,
        &args.stock,
        &output,
        &LexicalChemistry,
    )
    .context("Scoring failed")?;

    let stats = &outcome.statistics;
    progress.complete_step(
        "Scoring routes against stock",
        &[
            format!(
                "Score {} across {}",
                count(stats.routes, "route"),
                count(stats.targets, "target")
            ),
            format!("Write {}", outcome.manifest.output_ref),
        ],
    );

    if ctx.interactive {
        print_score_summary(stats, &name);
        print_manifest_info(&outcome.manifest);
    }

    progress.finish("Scoring complete");

    if !ctx.quiet {
        println!("{}", outcome.output.display());
    }

    Ok(ExitCode::SUCCESS)
}
