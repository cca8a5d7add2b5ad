use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::Error;
use super::hash::ContentHash;
use super::manifest::{InputRef, Manifest, ManifestBuilder, sidecar_path};

/// Pretty JSON plus a trailing newline: the encoding of every artifact and
/// manifest this crate writes.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// A directory tree of artifacts addressed by root-relative references.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of a `/`-separated reference.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        reference
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// The `/`-separated reference of `path` relative to the store root.
    pub fn reference_for(&self, path: &Path) -> Result<String, Error> {
        let root = absolute(&self.root)?;
        let target = absolute(path)?;
        let relative = target
            .strip_prefix(&root)
            .map_err(|_| Error::PathOutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    /// Records `path` as a stage input. Raw model outputs are hashed
    /// together with their adapter name.
    pub fn input_ref(&self, path: &Path, adapter: Option<&str>) -> Result<InputRef, Error> {
        let hash = match adapter {
            Some(name) => ContentHash::of_raw_file(name, path)?,
            None => ContentHash::of_file(path)?,
        };
        Ok(InputRef {
            reference: self.reference_for(path)?,
            hash,
            adapter: adapter.map(str::to_string),
        })
    }

    /// Writes `bytes` to `path` through a temporary file in the same
    /// directory, renamed into place once fully synced.
    pub fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), Error> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;
        tmp.write_all(bytes).map_err(|e| Error::io(tmp.path(), e))?;
        tmp.flush().map_err(|e| Error::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
        Ok(())
    }

    /// Writes an artifact and then its sidecar manifest.
    ///
    /// The manifest binds the hash of exactly the bytes written.
    pub fn write_with_manifest(
        &self,
        path: &Path,
        bytes: &[u8],
        manifest: ManifestBuilder,
    ) -> Result<Manifest, Error> {
        let output_ref = self.reference_for(path)?;
        let output_hash = ContentHash::of_artifact(bytes);
        let manifest = manifest.build(output_ref, output_hash);

        self.write_atomic(path, bytes)?;
        self.write_atomic(&sidecar_path(path), &manifest.to_bytes()?)?;
        debug!(
            stage = %manifest.stage,
            output = %manifest.output_ref,
            hash = %manifest.output_hash,
            "wrote artifact and manifest"
        );
        Ok(manifest)
    }

    pub fn load_manifest(&self, path: &Path) -> Result<Manifest, Error> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Manifest::from_slice(&bytes, path)
    }

    /// The manifest written next to `artifact`, if there is one.
    pub fn manifest_for(&self, artifact: &Path) -> Result<Option<Manifest>, Error> {
        let sidecar = sidecar_path(artifact);
        if !sidecar.is_file() {
            return Ok(None);
        }
        self.load_manifest(&sidecar).map(Some)
    }
}

/// Absolute, lexically normalized form of `path`.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf, Error> {
    let abs = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    let mut out = PathBuf::new();
    for component in abs.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn references_are_root_relative_and_slash_separated() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("processed").join("aizynth.json");
        assert_eq!(store.reference_for(&path).unwrap(), "processed/aizynth.json");
        assert_eq!(store.resolve("processed/aizynth.json"), path);
    }

    #[test]
    fn references_normalize_dot_segments() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("a").join("..").join("b").join(".").join("c.json");
        assert_eq!(store.reference_for(&path).unwrap(), "b/c.json");
    }

    #[test]
    fn paths_outside_root_are_rejected() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("inner"));
        let err = store.reference_for(&dir.path().join("outer.json")).unwrap_err();
        assert!(matches!(err, Error::PathOutsideRoot { .. }));
    }

    #[test]
    fn write_with_manifest_binds_written_bytes() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("out").join("routes.json");

        let manifest = store
            .write_with_manifest(&path, b"{}\n", Manifest::builder("ingest"))
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"{}\n");
        assert_eq!(manifest.output_ref, "out/routes.json");
        assert_eq!(manifest.output_hash, ContentHash::of_file(&path).unwrap());

        let loaded = store.manifest_for(&path).unwrap().unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("x.json");
        store.write_atomic(&path, b"old").unwrap();
        store.write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn raw_inputs_hash_with_adapter() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = dir.path().join("raw.json");
        fs::write(&path, b"[]").unwrap();

        let raw = store.input_ref(&path, Some("aizynth")).unwrap();
        let plain = store.input_ref(&path, None).unwrap();
        assert_eq!(raw.hash, ContentHash::of_raw_input("aizynth", b"[]"));
        assert_eq!(plain.hash, ContentHash::of_artifact(b"[]"));
        assert_eq!(raw.reference, "raw.json");
    }

    #[test]
    fn missing_manifest_is_none() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(store.manifest_for(&dir.path().join("nothing.json")).unwrap().is_none());
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = tempdir().unwrap();
        let err = ContentHash::of_file(&dir.path().join("gone.json")).unwrap_err();
        assert!(err.is_not_found());
    }
}
