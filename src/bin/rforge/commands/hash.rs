use std::process::ExitCode;

use anyhow::{Context, Result};

use route_forge::{Adapter, ContentHash};

use crate::cli::HashArgs;

/// Prints `<hash>  <path>`, the hash a manifest would record for the file.
pub fn run_hash(args: HashArgs) -> Result<ExitCode> {
    let hash = match &args.adapter {
        Some(name) => {
            let adapter = Adapter::by_name(name)?;
            ContentHash::of_raw_file(adapter.name(), &args.file)
        }
        None => ContentHash::of_file(&args.file),
    }
    .with_context(|| format!("Failed to hash {}", args.file.display()))?;

    println!("{}  {}", hash, args.file.display());
    Ok(ExitCode::SUCCESS)
}
