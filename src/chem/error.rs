use thiserror::Error;

/// Rejection of a structural string by a [`Chemistry`](super::Chemistry) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChemistryError {
    #[error("structure string is empty")]
    Empty,

    #[error("invalid character '{ch}' in structure '{smiles}'")]
    InvalidCharacter { smiles: String, ch: char },

    #[error("unbalanced brackets in structure '{smiles}'")]
    UnbalancedBrackets { smiles: String },

    #[error("empty fragment in structure '{smiles}'")]
    EmptyFragment { smiles: String },

    /// Failure reported by an external chemistry toolkit.
    #[error("chemistry backend rejected '{smiles}': {detail}")]
    Backend { smiles: String, detail: String },
}

impl ChemistryError {
    pub fn backend(smiles: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Backend {
            smiles: smiles.into(),
            detail: detail.into(),
        }
    }
}
