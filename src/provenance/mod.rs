//! Content hashing, manifests and provenance verification.
//!
//! Every artifact a stage writes gets a sidecar manifest binding the SHA-256
//! hash of the artifact's bytes to the hashes of the inputs it was computed
//! from and the parameters of the run. Manifests reference their inputs by
//! root-relative path and hash, never by live handle, so the chain of
//! manifests forms a content-addressed DAG that can be re-verified at any
//! later time.

mod error;
mod hash;
mod manifest;
mod store;
mod verify;

pub use error::Error;
pub use hash::ContentHash;
pub use manifest::{
    InputRef, MANIFEST_SUFFIX, Manifest, ManifestBuilder, SCHEMA_VERSION, artifact_path,
    is_manifest_path, sidecar_path,
};
pub use store::{ArtifactStore, encode_json};
pub use verify::{
    Finding, FindingKind, Summary, VerificationReport, Verifier, verify, verify_tree,
};
