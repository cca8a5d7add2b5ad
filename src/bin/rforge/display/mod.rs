mod banner;
mod error;
mod progress;
mod tables;

pub use banner::{banner_for_help, print_banner};
pub use error::print_error;
pub use progress::Progress;
pub use tables::{
    print_adapters, print_findings, print_ingest_summary, print_manifest_info,
    print_score_summary, print_verification_summary,
};

use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub interactive: bool,
    pub quiet: bool,
}

impl Context {
    pub fn detect() -> Self {
        Self {
            interactive: io::stderr().is_terminal(),
            quiet: false,
        }
    }

    pub fn with_quiet(self, quiet: bool) -> Self {
        if quiet {
            Self {
                interactive: false,
                quiet: true,
            }
        } else {
            self
        }
    }
}
