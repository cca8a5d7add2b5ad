use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse pipeline configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("no adapter configured (available: {available})")]
    MissingAdapter { available: String },

    #[error("failed to process '{}': {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: crate::io::Error,
    },

    #[error(transparent)]
    Adapt(#[from] crate::adapt::Error),

    #[error(transparent)]
    Provenance(#[from] crate::provenance::Error),
}

impl Error {
    pub fn file(path: impl Into<PathBuf>, source: impl Into<crate::io::Error>) -> Self {
        Self::File {
            path: path.into(),
            source: source.into(),
        }
    }
}
