use std::process::ExitCode;

use anyhow::{Context, Result, bail};

use route_forge::ArtifactStore;
use route_forge::provenance::{VerificationReport, is_manifest_path, sidecar_path, verify, verify_tree};

use crate::cli::{GlobalOptions, VerifyArgs};
use crate::display::{Context as DisplayContext, print_findings, print_verification_summary};

/// Exits non-zero when any finding is a failure. Missing artifacts are
/// reported but do not fail the run.
pub fn run_verify(args: VerifyArgs, global: &GlobalOptions, ctx: DisplayContext) -> Result<ExitCode> {
    let store = ArtifactStore::new(global.root.clone());
    let report = if args.path.is_dir() {
        verify_tree(&store, &args.path, args.deep)
            .with_context(|| format!("Failed to scan {}", args.path.display()))?
    } else {
        let manifest = if is_manifest_path(&args.path) {
            args.path.clone()
        } else {
            sidecar_path(&args.path)
        };
        if !manifest.exists() {
            bail!("No manifest found at {}", manifest.display());
        }
        verify(&store, &manifest, args.deep)
    };

    if args.json {
        print_json(&report)?;
    }

    if !ctx.quiet {
        print_findings(&report);
        print_verification_summary(&report.summary(), args.deep);
    }

    if report.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_json(report: &VerificationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to encode report")?;
    println!("{json}");
    Ok(())
}
