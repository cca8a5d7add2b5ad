use std::error::Error as StdError;
use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_pipeline_hints(err);
        collector.collect_adapt_hints(err);
        collector.collect_io_hints(err);
        collector.collect_provenance_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_pipeline_hints(&mut self, err: &Error) {
        use route_forge::pipeline::Error as PipelineError;

        let Some(pipeline_err) = find::<PipelineError>(err) else {
            return;
        };

        match pipeline_err {
            PipelineError::ConfigParse(_) => {
                self.mark_typed();
                self.add("Configuration file has invalid TOML or an unknown key");
                self.add("Ingest keys: adapter, model, anonymize, [sampling]");
                self.add("Score keys: stock_name");
            }

            PipelineError::MissingAdapter { available } => {
                self.mark_typed();
                self.add("Select an adapter with --adapter or `adapter = ...` in --config");
                self.add(format!("Available adapters: {}", available));
            }

            PipelineError::File { path, .. } => {
                self.add(format!("Problem file: {}", path.display()));
            }

            PipelineError::Adapt(_) | PipelineError::Provenance(_) => {}
        }
    }

    fn collect_adapt_hints(&mut self, err: &Error) {
        use route_forge::adapt::Error as AdaptError;

        let Some(adapt_err) = find::<AdaptError>(err) else {
            return;
        };

        self.mark_typed();

        match adapt_err {
            AdaptError::UnknownAdapter { available, .. } => {
                self.add(format!("Available adapters: {}", available));
                self.add("Run `rforge adapters` to see the raw shape each one reads");
            }

            AdaptError::SchemaValidation { adapter, .. } => {
                self.add(format!(
                    "The raw output does not match what the '{}' adapter reads",
                    adapter
                ));
                self.add("Check that --adapter matches the model that produced the file");
            }

            AdaptError::AdapterLogic { .. } | AdaptError::Chemistry { .. } => {
                self.add("A single route was malformed; other routes are unaffected");
            }
        }
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use route_forge::io::{Error as IoError, Format};

        let Some(io_err) = find::<IoError>(err) else {
            return;
        };

        self.mark_typed();

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} of the {} file",
                    line, format
                ));
                if *format == Format::Targets {
                    self.add("CSV targets need an `id,smiles` header row");
                }
            }

            IoError::Json { format, .. } => {
                self.add(format!("The {} file is not the expected JSON document", format));
                match format {
                    Format::Targets => {
                        self.add("Expected a list of {id, smiles} or an object of id -> smiles")
                    }
                    Format::RawPredictions => {
                        self.add("Expected an object keyed by target id")
                    }
                    Format::Routes => {
                        self.add("Expected a route set written by `rforge ingest`")
                    }
                }
            }

            IoError::DuplicateTarget(id) => {
                self.add(format!("Target id '{}' appears more than once", id));
                self.add("Target ids must be unique within a targets file");
            }
        }
    }

    fn collect_provenance_hints(&mut self, err: &Error) {
        use route_forge::provenance::Error as ProvenanceError;

        let Some(prov_err) = find::<ProvenanceError>(err) else {
            return;
        };

        self.mark_typed();

        match prov_err {
            ProvenanceError::Io { source, .. } => self.collect_std_io_hints(source),

            ProvenanceError::ManifestParse { .. } => {
                self.add("A manifest file is not valid JSON or misses required fields");
                self.add("Re-run the stage that wrote it to regenerate the manifest");
            }

            ProvenanceError::PathOutsideRoot { root, .. } => {
                self.add(format!(
                    "All inputs and outputs must live under the artifact root ({})",
                    root.display()
                ));
                self.add("Pass a common ancestor directory with --root");
            }

            ProvenanceError::InvalidHash(_) => {
                self.add("Content hashes are written as sha256:<64 hex digits>");
            }

            ProvenanceError::Encode(_) => {
                self.add("Serialization failed; this may indicate a bug");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid data (is it UTF-8 text?)");
            }

            ErrorKind::WriteZero | ErrorKind::StorageFull => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            return;
        }

        if msg.contains("--sampling") || msg.contains("--seed") {
            self.add("Sampling needs both a strategy and k, e.g. --sampling random-k -k 10");
        }
    }
}

/// First error of type `T` anywhere in the chain.
fn find<T: StdError + 'static>(err: &Error) -> Option<&T> {
    err.chain().find_map(|cause| cause.downcast_ref::<T>())
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
