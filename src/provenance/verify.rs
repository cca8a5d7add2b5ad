//! Shallow and deep verification of manifests.
//!
//! Shallow verification re-hashes the artifact a manifest describes. Deep
//! verification additionally walks the declared inputs: an input that has its
//! own manifest is a stage boundary, and the hash the child recorded for it
//! must equal the output hash its own manifest records; an input without a
//! manifest is a primary input and is re-hashed directly. The walk visits
//! each manifest once, so ancestors shared by several stages are checked once.
//!
//! Problems are collected as [`Finding`]s rather than returned as errors, so
//! one bad artifact never hides the state of the others.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::Error;
use super::hash::ContentHash;
use super::manifest::{InputRef, Manifest, artifact_path, is_manifest_path, sidecar_path};
use super::store::{ArtifactStore, absolute};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Ok,
    HashMismatch,
    /// A referenced file is absent. Expected for partially materialized
    /// trees, so it does not fail verification.
    MissingArtifact,
    ChainInconsistency,
    UnreadableManifest,
}

impl FindingKind {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::HashMismatch | Self::ChainInconsistency | Self::UnreadableManifest
        )
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::Ok => write!(f, "ok"),
            FindingKind::HashMismatch => write!(f, "hash mismatch"),
            FindingKind::MissingArtifact => write!(f, "missing"),
            FindingKind::ChainInconsistency => write!(f, "chain inconsistency"),
            FindingKind::UnreadableManifest => write!(f, "unreadable manifest"),
        }
    }
}

/// The outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    /// Artifact reference, or `parent -> child` for a chain edge.
    pub subject: String,
    /// Manifest that recorded the expectation.
    pub manifest: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<ContentHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<ContentHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Finding {
    fn new(kind: FindingKind, subject: impl Into<String>, manifest: &Path) -> Self {
        Self {
            kind,
            subject: subject.into(),
            manifest: manifest.to_path_buf(),
            expected: None,
            actual: None,
            detail: None,
        }
    }

    fn hashes(mut self, expected: ContentHash, actual: ContentHash) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }

    fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ok: usize,
    pub hash_mismatch: usize,
    pub missing: usize,
    pub chain_inconsistency: usize,
    pub unreadable: usize,
}

impl Summary {
    pub fn failures(&self) -> usize {
        self.hash_mismatch + self.chain_inconsistency + self.unreadable
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for finding in &self.findings {
            match finding.kind {
                FindingKind::Ok => summary.ok += 1,
                FindingKind::HashMismatch => summary.hash_mismatch += 1,
                FindingKind::MissingArtifact => summary.missing += 1,
                FindingKind::ChainInconsistency => summary.chain_inconsistency += 1,
                FindingKind::UnreadableManifest => summary.unreadable += 1,
            }
        }
        summary
    }

    /// `true` iff there are no mismatches, inconsistencies or unreadable
    /// manifests. Missing artifacts do not count.
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(|f| f.kind.is_failure())
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }
}

/// Verification state shared across several starting manifests.
pub struct Verifier<'a> {
    store: &'a ArtifactStore,
    deep: bool,
    manifests: HashMap<PathBuf, Option<Manifest>>,
    walked: HashSet<PathBuf>,
    primaries: HashSet<PathBuf>,
    report: VerificationReport,
}

impl<'a> Verifier<'a> {
    pub fn new(store: &'a ArtifactStore, deep: bool) -> Self {
        Self {
            store,
            deep,
            manifests: HashMap::new(),
            walked: HashSet::new(),
            primaries: HashSet::new(),
            report: VerificationReport::default(),
        }
    }

    /// Verifies the manifest at `path` and, in deep mode, its ancestry.
    pub fn verify_manifest(&mut self, path: &Path) {
        let mut queue = VecDeque::from([path.to_path_buf()]);
        while let Some(manifest_path) = queue.pop_front() {
            if !self.walked.insert(key(&manifest_path)) {
                continue;
            }
            let Some(manifest) = self.load(&manifest_path) else {
                continue;
            };
            self.check_output(&manifest_path, &manifest);
            if !self.deep {
                continue;
            }

            for input in &manifest.inputs {
                let input_path = self.store.resolve(&input.reference);
                let parent_path = sidecar_path(&input_path);
                if parent_path.is_file() {
                    self.check_edge(&manifest_path, &manifest, input, &parent_path);
                    queue.push_back(parent_path);
                } else {
                    self.check_primary(&manifest_path, input, &input_path);
                }
            }
        }
    }

    /// Verifies every `*.manifest.json` below `dir`, in path order.
    pub fn verify_directory(&mut self, dir: &Path) -> Result<usize, Error> {
        let mut manifests = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Error::io(path, e.into())
            })?;
            if entry.file_type().is_file() && is_manifest_path(entry.path()) {
                manifests.push(entry.into_path());
            }
        }
        debug!(count = manifests.len(), dir = %dir.display(), "found manifests");
        for manifest in &manifests {
            self.verify_manifest(manifest);
        }
        Ok(manifests.len())
    }

    pub fn finish(self) -> VerificationReport {
        self.report
    }

    fn push(&mut self, finding: Finding) {
        match finding.kind {
            FindingKind::Ok => {}
            FindingKind::MissingArtifact => {
                warn!(subject = %finding.subject, "artifact missing")
            }
            kind => warn!(subject = %finding.subject, "{kind}"),
        }
        self.report.findings.push(finding);
    }

    fn load(&mut self, path: &Path) -> Option<Manifest> {
        let key = key(path);
        if let Some(cached) = self.manifests.get(&key) {
            return cached.clone();
        }
        let loaded = match self.store.load_manifest(path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                let subject = path.display().to_string();
                self.push(Finding::new(FindingKind::UnreadableManifest, subject, path).detail(e.to_string()));
                None
            }
        };
        self.manifests.insert(key, loaded.clone());
        loaded
    }

    fn check_output(&mut self, manifest_path: &Path, manifest: &Manifest) {
        let subject = manifest.output_ref.clone();
        let artifact = artifact_path(manifest_path)
            .unwrap_or_else(|| self.store.resolve(&manifest.output_ref));

        let finding = match ContentHash::of_file(&artifact) {
            Ok(actual) if actual == manifest.output_hash => {
                Finding::new(FindingKind::Ok, subject, manifest_path)
            }
            Ok(actual) => Finding::new(FindingKind::HashMismatch, subject, manifest_path)
                .hashes(manifest.output_hash, actual),
            Err(e) if e.is_not_found() => {
                Finding::new(FindingKind::MissingArtifact, subject, manifest_path)
            }
            Err(e) => Finding::new(FindingKind::HashMismatch, subject, manifest_path)
                .detail(e.to_string()),
        };
        self.push(finding);
    }

    fn check_edge(
        &mut self,
        child_path: &Path,
        child: &Manifest,
        input: &InputRef,
        parent_path: &Path,
    ) {
        let Some(parent) = self.load(parent_path) else {
            return;
        };
        let subject = format!("{} -> {}", input.reference, child.output_ref);
        let finding = if parent.output_hash == input.hash {
            Finding::new(FindingKind::Ok, subject, child_path)
        } else {
            Finding::new(FindingKind::ChainInconsistency, subject, child_path)
                .hashes(input.hash, parent.output_hash)
                .detail(format!(
                    "'{}' recorded this input before its '{}' stage was re-run",
                    child.stage, parent.stage
                ))
        };
        self.push(finding);
    }

    fn check_primary(&mut self, manifest_path: &Path, input: &InputRef, input_path: &Path) {
        if !self.primaries.insert(key(input_path)) {
            return;
        }
        let subject = input.reference.clone();
        let actual = match &input.adapter {
            Some(adapter) => ContentHash::of_raw_file(adapter, input_path),
            None => ContentHash::of_file(input_path),
        };
        let finding = match actual {
            Ok(actual) if actual == input.hash => Finding::new(FindingKind::Ok, subject, manifest_path),
            Ok(actual) => Finding::new(FindingKind::HashMismatch, subject, manifest_path)
                .hashes(input.hash, actual),
            Err(e) if e.is_not_found() => {
                Finding::new(FindingKind::MissingArtifact, subject, manifest_path)
            }
            Err(e) => Finding::new(FindingKind::HashMismatch, subject, manifest_path)
                .detail(e.to_string()),
        };
        self.push(finding);
    }
}

fn key(path: &Path) -> PathBuf {
    absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Verifies a single manifest.
pub fn verify(store: &ArtifactStore, manifest: &Path, deep: bool) -> VerificationReport {
    let mut verifier = Verifier::new(store, deep);
    verifier.verify_manifest(manifest);
    verifier.finish()
}

/// Verifies every manifest below `dir`.
pub fn verify_tree(store: &ArtifactStore, dir: &Path, deep: bool) -> Result<VerificationReport, Error> {
    let mut verifier = Verifier::new(store, deep);
    verifier.verify_directory(dir)?;
    Ok(verifier.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// raw.json → a.json (stage "a") → b.json (stage "b")
    fn build_chain(store: &ArtifactStore) -> (PathBuf, PathBuf, PathBuf) {
        let root = store.root().to_path_buf();
        let raw = root.join("raw.json");
        fs::write(&raw, b"{\"t1\": []}").unwrap();

        let a = root.join("a.json");
        let input = store.input_ref(&raw, Some("aizynth")).unwrap();
        store
            .write_with_manifest(&a, b"A1\n", Manifest::builder("a").input(input))
            .unwrap();

        let b = root.join("b.json");
        let input = store.input_ref(&a, None).unwrap();
        store
            .write_with_manifest(&b, b"B1\n", Manifest::builder("b").input(input))
            .unwrap();
        (raw, a, b)
    }

    #[test]
    fn intact_chain_passes_deep_verification() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (_, _, b) = build_chain(&store);

        let report = verify(&store, &sidecar_path(&b), true);
        assert!(report.passed());
        let summary = report.summary();
        // b output, a -> b edge, a output, raw input
        assert_eq!(summary.ok, 4);
        assert_eq!(summary.failures(), 0);
    }

    #[test]
    fn shallow_only_checks_own_output() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (_, _, b) = build_chain(&store);
        let report = verify(&store, &sidecar_path(&b), false);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].kind, FindingKind::Ok);
        assert_eq!(report.findings[0].subject, "b.json");
    }

    #[test]
    fn tampered_artifact_is_a_mismatch() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (_, _, b) = build_chain(&store);
        fs::write(&b, b"tampered\n").unwrap();

        let report = verify(&store, &sidecar_path(&b), false);
        assert!(!report.passed());
        assert_eq!(report.summary().hash_mismatch, 1);
        let finding = report.of_kind(FindingKind::HashMismatch).next().unwrap();
        assert!(finding.expected.is_some() && finding.actual.is_some());
    }

    #[test]
    fn missing_artifact_is_a_warning() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (raw, _, b) = build_chain(&store);
        fs::remove_file(&b).unwrap();
        fs::remove_file(&raw).unwrap();

        let report = verify(&store, &sidecar_path(&b), true);
        assert!(report.passed());
        assert_eq!(report.summary().missing, 2);
    }

    #[test]
    fn rerun_parent_breaks_chain_once() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (raw, a, b) = build_chain(&store);

        let input = store.input_ref(&raw, Some("aizynth")).unwrap();
        store
            .write_with_manifest(&a, b"A2\n", Manifest::builder("a").input(input))
            .unwrap();

        let shallow = verify(&store, &sidecar_path(&b), false);
        assert!(shallow.passed());

        let deep = verify(&store, &sidecar_path(&b), true);
        assert!(!deep.passed());
        let summary = deep.summary();
        assert_eq!(summary.chain_inconsistency, 1);
        assert_eq!(summary.hash_mismatch, 0);
        let edge = deep.of_kind(FindingKind::ChainInconsistency).next().unwrap();
        assert_eq!(edge.subject, "a.json -> b.json");
    }

    #[test]
    fn altered_raw_input_is_detected_with_adapter_hash() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (raw, _, b) = build_chain(&store);
        fs::write(&raw, b"{\"t1\": [{}]}").unwrap();

        let report = verify(&store, &sidecar_path(&b), true);
        assert_eq!(report.summary().hash_mismatch, 1);
        let finding = report.of_kind(FindingKind::HashMismatch).next().unwrap();
        assert_eq!(finding.subject, "raw.json");
    }

    #[test]
    fn unreadable_manifest_fails() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("x.json.manifest.json");
        fs::write(&path, b"not json").unwrap();

        let report = verify(&store, &path, true);
        assert!(!report.passed());
        assert_eq!(report.summary().unreadable, 1);
    }

    #[test]
    fn directory_mode_checks_each_manifest_once() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        build_chain(&store);

        let report = verify_tree(&store, dir.path(), true).unwrap();
        assert!(report.passed());
        // a output, raw input, b output, a -> b edge
        assert_eq!(report.summary().ok, 4);
    }
}
