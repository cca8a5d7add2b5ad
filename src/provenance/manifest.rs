use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::Error;
use super::hash::ContentHash;

/// Version of the manifest layout written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// File name suffix of the sidecar manifest written next to each artifact.
pub const MANIFEST_SUFFIX: &str = ".manifest.json";

/// One artifact a stage read, with the hash it had at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    /// `/`-separated path relative to the artifact root.
    #[serde(rename = "ref")]
    pub reference: String,
    pub hash: ContentHash,
    /// Set for raw model outputs, whose hash also covers the adapter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
}

/// Provenance record binding an artifact to the inputs and parameters that
/// produced it. Written once, next to the artifact, and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: u32,
    pub tool_version: String,
    pub stage: String,
    pub output_ref: String,
    pub output_hash: ContentHash,
    pub inputs: Vec<InputRef>,
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub statistics: BTreeMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Manifest {
    pub fn builder(stage: impl Into<String>) -> ManifestBuilder {
        ManifestBuilder {
            stage: stage.into(),
            inputs: Vec::new(),
            parameters: BTreeMap::new(),
            statistics: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// Pretty JSON with a trailing newline. Maps are sorted, so encoding a
    /// parsed manifest reproduces the original bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(super::store::encode_json(self)?)
    }

    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn input(&self, reference: &str) -> Option<&InputRef> {
        self.inputs.iter().find(|i| i.reference == reference)
    }
}

#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    stage: String,
    inputs: Vec<InputRef>,
    parameters: BTreeMap<String, Value>,
    statistics: BTreeMap<String, Value>,
    timestamp: Option<DateTime<Utc>>,
}

impl ManifestBuilder {
    pub fn input(mut self, input: InputRef) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn statistic(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statistics.insert(key.into(), value.into());
        self
    }

    pub fn statistics(mut self, statistics: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.statistics.extend(statistics);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self, output_ref: impl Into<String>, output_hash: ContentHash) -> Manifest {
        Manifest {
            schema_version: SCHEMA_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            stage: self.stage,
            output_ref: output_ref.into(),
            output_hash,
            inputs: self.inputs,
            parameters: self.parameters,
            statistics: self.statistics,
            timestamp: self.timestamp.unwrap_or_else(|| Utc::now().trunc_subsecs(0)),
        }
    }
}

/// Path of the sidecar manifest for `artifact`.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name: OsString = artifact.file_name().map(OsString::from).unwrap_or_default();
    name.push(MANIFEST_SUFFIX);
    artifact.with_file_name(name)
}

/// Path of the artifact described by the sidecar manifest at `manifest`.
pub fn artifact_path(manifest: &Path) -> Option<PathBuf> {
    let name = manifest.file_name()?.to_str()?;
    let stem = name.strip_suffix(MANIFEST_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(manifest.with_file_name(stem))
}

pub fn is_manifest_path(path: &Path) -> bool {
    artifact_path(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Manifest {
        Manifest::builder("ingest")
            .input(InputRef {
                reference: "raw/aizynth.json".into(),
                hash: ContentHash::of_raw_input("aizynth", b"{}"),
                adapter: Some("aizynth".into()),
            })
            .input(InputRef {
                reference: "targets.json".into(),
                hash: ContentHash::of_artifact(b"[]"),
                adapter: None,
            })
            .parameter("adapter", "aizynth")
            .parameter("k", 10)
            .statistic("routes_saved", 3)
            .timestamp(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
            .build("processed/aizynth.json", ContentHash::of_artifact(b"{}"))
    }

    #[test]
    fn encoding_is_byte_stable() {
        let manifest = sample();
        let bytes = manifest.to_bytes().unwrap();
        let parsed = Manifest::from_slice(&bytes, Path::new("m.json")).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
        assert!(bytes.ends_with(b"}\n"));
    }

    #[test]
    fn field_names_follow_the_persisted_format() {
        let value: Value = serde_json::from_slice(&sample().to_bytes().unwrap()).unwrap();
        for key in [
            "schema_version",
            "tool_version",
            "stage",
            "output_ref",
            "output_hash",
            "inputs",
            "parameters",
            "statistics",
            "timestamp",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["inputs"][0]["ref"], "raw/aizynth.json");
        assert_eq!(value["inputs"][0]["adapter"], "aizynth");
        assert!(value["inputs"][1].get("adapter").is_none());
        assert_eq!(value["timestamp"], "2026-03-01T12:00:00Z");
    }

    #[test]
    fn builder_defaults_timestamp_to_whole_seconds() {
        let manifest = Manifest::builder("score").build("a.json", ContentHash::of_artifact(b""));
        assert_eq!(manifest.timestamp.timestamp_subsec_nanos(), 0);
        assert_eq!(manifest.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn unparseable_manifest_names_its_path() {
        let err = Manifest::from_slice(b"{", Path::new("broken.manifest.json")).unwrap_err();
        assert!(err.to_string().contains("broken.manifest.json"));
    }

    #[test]
    fn sidecar_naming() {
        let artifact = Path::new("out/routes.json");
        let sidecar = sidecar_path(artifact);
        assert_eq!(sidecar, Path::new("out/routes.json.manifest.json"));
        assert_eq!(artifact_path(&sidecar).unwrap(), artifact);
        assert!(is_manifest_path(&sidecar));
        assert!(!is_manifest_path(artifact));
        assert!(!is_manifest_path(Path::new(".manifest.json")));
    }

    #[test]
    fn input_lookup_by_reference() {
        let manifest = sample();
        assert!(manifest.input("targets.json").is_some());
        assert!(manifest.input("missing.json").is_none());
    }
}
