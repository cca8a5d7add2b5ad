use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("invalid {format} document: {source}")]
    Json {
        format: Format,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate target id '{0}' in targets file")]
    DuplicateTarget(String),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    pub fn json(format: Format, source: serde_json::Error) -> Self {
        Self::Json { format, source }
    }
}
