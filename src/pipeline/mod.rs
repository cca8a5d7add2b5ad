//! Pipeline stages.
//!
//! Each stage reads its inputs once, hashes the exact bytes it read, and
//! writes one artifact plus a sidecar manifest through the
//! [`ArtifactStore`](crate::provenance::ArtifactStore). Ingest turns raw
//! model output into a curated route set; score annotates a route set with
//! solvability against a stock.

mod config;
mod error;
pub mod ingest;
pub mod score;

pub use config::{IngestConfig, ScoreConfig};
pub use error::Error;
pub use ingest::{IngestOutcome, IngestStatistics, ingest, process_targets};
pub use score::{ScoreOutcome, ScoreStatistics, score};
