use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "rforge",
    about = "Retrosynthesis route canonicalization with verifiable provenance",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert raw model predictions into a canonical route set
    #[command(visible_alias = "i")]
    Ingest(IngestArgs),

    /// Mark routes solvable against a stock of purchasable structures
    #[command(visible_alias = "s")]
    Score(ScoreArgs),

    /// Check artifacts against their manifests
    #[command(visible_alias = "v")]
    Verify(VerifyArgs),

    /// Print the content hash of a file
    Hash(HashArgs),

    /// List registered adapters and the raw shapes they read
    Adapters,
}

/// Options shared by all commands.
#[derive(Args)]
pub struct GlobalOptions {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory that manifest references are relative to
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub root: PathBuf,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Raw predictions (JSON object keyed by target id)
    #[arg(long, value_name = "FILE")]
    pub raw: PathBuf,

    /// Targets file (JSON list, JSON object or id,smiles CSV)
    #[arg(long, value_name = "FILE")]
    pub targets: PathBuf,

    /// Directory the model's route set is written under
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = "processed")]
    pub output_dir: PathBuf,

    /// Ingest settings (TOML file); flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelOptions,

    #[command(flatten)]
    pub sampling: SamplingOptions,
}

#[derive(Args)]
#[command(next_help_heading = "Model")]
pub struct ModelOptions {
    /// Adapter that reads the raw predictions (see `rforge adapters`)
    #[arg(short, long, value_name = "NAME")]
    pub adapter: Option<String>,

    /// Model name for the output directory (defaults to the adapter name)
    #[arg(short, long, value_name = "NAME")]
    pub model: Option<String>,

    /// Name the output directory after a hash of the model name
    #[arg(long)]
    pub anonymize: bool,
}

#[derive(Args)]
#[command(next_help_heading = "Sampling")]
pub struct SamplingOptions {
    /// Keep at most k routes per target using this strategy
    #[arg(long, value_name = "STRATEGY")]
    pub sampling: Option<Strategy>,

    /// Routes to keep per target (defaults the strategy to top-k)
    #[arg(short, value_name = "K")]
    pub k: Option<usize>,

    /// Seed for random-k sampling
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Route set written by `rforge ingest`
    #[arg(long, value_name = "FILE")]
    pub routes: PathBuf,

    /// Stock file, one structure per line
    #[arg(long, value_name = "FILE")]
    pub stock: PathBuf,

    /// Scored route set (defaults to scored.json beside the routes)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Name verdicts are recorded under (defaults to the stock file stem)
    #[arg(long, value_name = "NAME")]
    pub stock_name: Option<String>,

    /// Score settings (TOML file); flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Manifest, artifact with a sidecar manifest, or directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Follow every manifest's inputs back to the primary inputs
    #[arg(long)]
    pub deep: bool,

    /// Print every finding as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct HashArgs {
    /// File to hash
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Hash as raw predictions read by this adapter
    #[arg(short, long, value_name = "NAME")]
    pub adapter: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// The k best-ranked routes
    TopK,
    /// k routes in a seeded, content-derived order
    RandomK,
    /// Round-robin over route depth, shortest first
    ByLength,
}

pub fn parse() -> Cli {
    Cli::parse()
}
