//! Canonicalization, curation and provenance for retrosynthesis route predictions.
//!
//! Single-step and multi-step retrosynthesis models emit their predicted routes
//! in incompatible shapes. This crate reconstructs every one of them as the
//! same canonical molecule/reaction tree, removes structural duplicates,
//! optionally samples a bounded subset, scores solvability against a stock,
//! and records a content-addressed manifest next to every artifact it writes
//! so that any result can be traced back to the exact bytes it came from.
//!
//! # Features
//!
//! - **Adapters** – Bipartite molecule/reaction graphs (AiZynthFinder,
//!   SynPlanner), precursor maps (Retro\*, DreamRetro) and ready-made trees
//!   (DMS and custom models) all reconstruct into [`Route`]
//! - **Cycle safety** – A molecule that reappears among its own ancestors is
//!   cut to a leaf instead of recursing
//! - **Curation** – Order-insensitive route signatures, first-wins
//!   deduplication and deterministic top-k, random-k and by-length sampling
//! - **Provenance** – SHA-256 content hashes, sidecar manifests and shallow or
//!   deep verification of the whole manifest chain
//!
//! # Quick Start
//!
//! ```
//! use route_forge::{Adapter, LexicalChemistry, TargetInput, deduplicate};
//! use serde_json::json;
//!
//! // Two predictions that differ only in reactant order
//! let raw = json!([
//!     {"type": "mol", "smiles": "CCO", "children": [{"type": "reaction", "children": [
//!         {"type": "mol", "smiles": "CC", "in_stock": true},
//!         {"type": "mol", "smiles": "O", "in_stock": true}
//!     ]}]},
//!     {"type": "mol", "smiles": "CCO", "children": [{"type": "reaction", "children": [
//!         {"type": "mol", "smiles": "O", "in_stock": true},
//!         {"type": "mol", "smiles": "CC", "in_stock": true}
//!     ]}]}
//! ]);
//!
//! let adapter = Adapter::by_name("aizynth")?;
//! let target = TargetInput::new("ethanol", "CCO");
//! let adapted = adapter.adapt(raw, &target, &LexicalChemistry)?;
//! assert_eq!(adapted.routes.len(), 2);
//!
//! let unique = deduplicate(adapted.routes);
//! assert_eq!(unique.len(), 1);
//! assert_eq!(unique[0].rank, 1);
//! # Ok::<(), route_forge::adapt::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`chem`] – The canonicalization seam and a lexical fallback backend
//! - [`model`] – Canonical [`Molecule`], [`ReactionStep`], [`Route`] and [`RouteSet`]
//! - [`adapt`] – Raw output shapes, the adapter registry and route reconstruction
//! - [`curate`] – Signatures, deduplication and sampling
//! - [`score`] – Stock-based solvability
//! - [`provenance`] – Content hashes, manifests, artifact storage and verification
//! - [`io`] – Readers and writers for targets, raw predictions, route sets and stocks
//! - [`pipeline`] – The `ingest` and `score` stages that tie everything together

pub mod adapt;
pub mod chem;
pub mod curate;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod provenance;
pub mod score;

pub use adapt::{Adaptation, Adapter, RawRoutes, RawShape, TargetInput};
pub use chem::{CanonicalForm, Chemistry, ChemistryError, LexicalChemistry};
pub use curate::{SamplingConfig, SamplingStrategy, deduplicate, sample, signature};
pub use model::{Metadata, Molecule, ReactionStep, Route, RouteSet};
pub use pipeline::{IngestConfig, ScoreConfig};
pub use provenance::{ArtifactStore, ContentHash, Manifest, VerificationReport};
pub use score::{SolvabilityScorer, Stock};
