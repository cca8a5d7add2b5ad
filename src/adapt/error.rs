//! Error types for route reconstruction.
//!
//! Errors are split by blast radius. [`Error::SchemaValidation`] means the raw
//! blob for a target does not have the shape the adapter expects, and fails
//! the whole adapter invocation. [`Error::AdapterLogic`] and
//! [`Error::Chemistry`] are scoped to one route: the route is skipped and the
//! remaining routes are still produced.

use thiserror::Error;

use crate::chem::ChemistryError;

#[derive(Debug, Error)]
pub enum Error {
    /// Raw output does not conform to the adapter's expected shape.
    #[error("raw output for target '{target}' failed {adapter} schema validation: {details}")]
    SchemaValidation {
        adapter: String,
        target: String,
        details: String,
    },

    /// The shape was valid but the content of one route is inconsistent.
    #[error("route for target '{target}' is inconsistent: {details}")]
    AdapterLogic { target: String, details: String },

    /// The chemistry backend rejected a structure.
    #[error("chemistry backend rejected a structure for target '{target}': {source}")]
    Chemistry {
        target: String,
        #[source]
        source: ChemistryError,
    },

    #[error("unknown adapter '{name}' (available: {available})")]
    UnknownAdapter { name: String, available: String },
}

impl Error {
    pub fn schema_validation(
        adapter: &str,
        target: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::SchemaValidation {
            adapter: adapter.to_string(),
            target: target.into(),
            details: details.into(),
        }
    }

    pub fn adapter_logic(target: impl Into<String>, details: impl Into<String>) -> Self {
        Self::AdapterLogic {
            target: target.into(),
            details: details.into(),
        }
    }

    pub fn chemistry(target: impl Into<String>, source: ChemistryError) -> Self {
        Self::Chemistry {
            target: target.into(),
            source,
        }
    }

    /// Returns `true` if the failure only invalidates a single route.
    pub fn is_route_scoped(&self) -> bool {
        matches!(self, Self::AdapterLogic { .. } | Self::Chemistry { .. })
    }
}
