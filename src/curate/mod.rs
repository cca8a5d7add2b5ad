//! Route curation: structural signatures, deduplication and sampling.
//!
//! Deduplication collapses routes whose trees are identical up to the order
//! in which reactants were listed. It keeps the first occurrence and never
//! renumbers ranks, so downstream top-k evaluation still reflects the
//! model's own ordering. Sampling runs after deduplication and follows the
//! same rule.

mod dedup;
mod sampling;
mod signature;

pub use dedup::deduplicate;
pub use sampling::{ParseStrategyError, SamplingConfig, SamplingStrategy, sample};
pub use signature::signature;
