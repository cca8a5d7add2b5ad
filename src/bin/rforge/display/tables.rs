use std::io::{self, Write};

use route_forge::Adapter;
use route_forge::pipeline::{IngestStatistics, ScoreStatistics};
use route_forge::provenance::{FindingKind, Manifest, Summary, VerificationReport};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_ingest_summary(stats: &IngestStatistics) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = vec![
        ("Raw inputs", stats.raw_inputs.to_string()),
        ("With predictions", stats.targets_with_predictions.to_string()),
        ("Schema failures", stats.schema_failures.to_string()),
        ("Invalid targets", stats.invalid_targets.to_string()),
        ("Routes built", stats.routes_generated.to_string()),
        ("Routes rejected", stats.routes_rejected.to_string()),
        ("Cycles cut", stats.cycles.to_string()),
        ("Reactions dropped", stats.discarded_reactions.to_string()),
        ("Routes saved", stats.routes_saved.to_string()),
    ];

    print_kv_table(&mut out, "Ingest Summary", &rows);
}

pub fn print_score_summary(stats: &ScoreStatistics, stock: &str) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = vec![
        ("Stock", stock.to_string()),
        (
            "Solved targets",
            format!("{} / {}", stats.solved_targets, stats.targets),
        ),
        (
            "Solvable routes",
            format!("{} / {}", stats.solvable_routes, stats.routes),
        ),
        ("Solve rate", percent(stats.solved_targets, stats.targets)),
    ];

    print_kv_table(&mut out, "Solvability", &rows);
}

pub fn print_manifest_info(manifest: &Manifest) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = vec![
        ("Stage", manifest.stage.clone()),
        ("Output", manifest.output_ref.clone()),
        ("Hash", format!("sha256:{}…", manifest.output_hash.short())),
        ("Inputs", manifest.inputs.len().to_string()),
        (
            "Timestamp",
            manifest.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
    ];

    print_kv_table(&mut out, "Manifest", &rows);
}

pub fn print_verification_summary(summary: &Summary, deep: bool) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = [
        (FindingKind::Ok, summary.ok),
        (FindingKind::HashMismatch, summary.hash_mismatch),
        (FindingKind::MissingArtifact, summary.missing),
        (FindingKind::ChainInconsistency, summary.chain_inconsistency),
        (FindingKind::UnreadableManifest, summary.unreadable),
    ];

    let title = if deep {
        "Verification (deep)"
    } else {
        "Verification (shallow)"
    };

    let kind_w = 22usize;
    let count_w = 8usize;
    let sep_overhead = 6;
    let status_w = SAFE_TABLE_WIDTH.saturating_sub(kind_w + count_w + sep_overhead + 2);

    let _ = writeln!(out, "{}┌─ {} ─┐", INDENT, title);
    let _ = writeln!(
        out,
        "{}┌{k}┬{c}┬{s}┐",
        INDENT,
        k = "─".repeat(kind_w + 2),
        c = "─".repeat(count_w + 2),
        s = "─".repeat(status_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<kind_w$} │ {:>count_w$} │ {:<status_w$} │",
        INDENT, "Check", "Count", "Status"
    );
    let _ = writeln!(
        out,
        "{}├{k}┼{c}┼{s}┤",
        INDENT,
        k = "─".repeat(kind_w + 2),
        c = "─".repeat(count_w + 2),
        s = "─".repeat(status_w + 2)
    );

    for (kind, count) in rows {
        let status = match (kind.is_failure(), count) {
            (_, 0) => "",
            (true, _) => "FAIL",
            (false, _) if kind == FindingKind::MissingArtifact => "skipped",
            (false, _) => "pass",
        };
        let _ = writeln!(
            out,
            "{}│ {:<kind_w$} │ {:>count_w$} │ {:<status_w$} │",
            INDENT,
            kind.to_string(),
            count,
            status
        );
    }

    let _ = writeln!(
        out,
        "{}└{k}┴{c}┴{s}┘",
        INDENT,
        k = "─".repeat(kind_w + 2),
        c = "─".repeat(count_w + 2),
        s = "─".repeat(status_w + 2)
    );
}

/// Lists every finding that is not a plain pass.
pub fn print_findings(report: &VerificationReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    for finding in report
        .findings
        .iter()
        .filter(|f| f.kind != FindingKind::Ok)
    {
        let marker = if finding.kind.is_failure() {
            "\x1b[31m✗\x1b[0m"
        } else {
            "\x1b[33m?\x1b[0m"
        };
        let _ = writeln!(out, "  {} {}: {}", marker, finding.kind, finding.subject);
        let _ = writeln!(
            out,
            "      \x1b[2mmanifest:\x1b[0m {}",
            finding.manifest.display()
        );
        if let (Some(expected), Some(actual)) = (&finding.expected, &finding.actual) {
            let _ = writeln!(out, "      \x1b[2mexpected:\x1b[0m {}", expected);
            let _ = writeln!(out, "      \x1b[2mactual:  \x1b[0m {}", actual);
        }
        if let Some(detail) = &finding.detail {
            let _ = writeln!(out, "      \x1b[2m{}\x1b[0m", detail);
        }
    }
}

pub fn print_adapters() {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let rows: Vec<(&str, String)> = Adapter::all()
        .iter()
        .map(|a| (a.name(), a.shape().to_string()))
        .collect();

    let _ = writeln!(out, "{:<12} SHAPE", "ADAPTER");
    for (name, shape) in rows {
        let _ = writeln!(out, "{:<12} {}", name, shape);
    }
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 18usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead) + 8;

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}

fn percent(part: usize, total: usize) -> String {
    if total == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", part as f64 / total as f64 * 100.0)
    }
}
