mod hash;
mod ingest;
mod score;
mod verify;

use hash::run_hash;
use ingest::run_ingest;
use score::run_score;
use verify::run_verify;

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::{Command, GlobalOptions};
use crate::display::{Context, print_adapters};

pub fn dispatch(command: Command, global: &GlobalOptions, ctx: Context) -> Result<ExitCode> {
    match command {
        Command::Ingest(args) => run_ingest(args, global, ctx),
        Command::Score(args) => run_score(args, global, ctx),
        Command::Verify(args) => run_verify(args, global, ctx),
        Command::Hash(args) => run_hash(args),
        Command::Adapters => {
            print_adapters();
            Ok(ExitCode::SUCCESS)
        }
    }
}
