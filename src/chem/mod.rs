//! The chemistry seam.
//!
//! Structure canonicalization (SMILES normalization, InChIKey generation) is
//! supplied by an external toolkit through the [`Chemistry`] trait. The crate
//! only requires the functions to be pure, total on valid input and stable
//! across textual variants of the same structure.
//!
//! [`LexicalChemistry`] is a dependency-free backend that normalizes text
//! without perceiving chemistry. It is what the tests and the CLI use when no
//! toolkit is linked.

mod error;
mod lexical;

pub use error::ChemistryError;
pub use lexical::LexicalChemistry;

use serde::{Deserialize, Serialize};

/// Result of canonicalizing one structural string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalForm {
    /// Identity used for comparison, signatures and cycle checks.
    pub canonical_id: String,
    /// Canonical structural string for display.
    pub smiles: String,
}

/// Canonicalization backend.
///
/// Implementations must be deterministic: the same input always yields the
/// same output on every machine, because content hashes are built on it.
pub trait Chemistry: Sync {
    /// Normalizes a structural string to its canonical textual form.
    fn canonical_smiles(&self, raw: &str) -> Result<String, ChemistryError>;

    /// Stable structural identity of an already canonical structure.
    fn structural_key(&self, canonical: &str) -> Result<String, ChemistryError>;

    /// Canonicalizes `raw` and derives its identity in one step.
    fn canonicalize(&self, raw: &str) -> Result<CanonicalForm, ChemistryError> {
        let smiles = self.canonical_smiles(raw)?;
        let canonical_id = self.structural_key(&smiles)?;
        Ok(CanonicalForm {
            canonical_id,
            smiles,
        })
    }
}

impl<C: Chemistry + ?Sized> Chemistry for &C {
    fn canonical_smiles(&self, raw: &str) -> Result<String, ChemistryError> {
        (**self).canonical_smiles(raw)
    }

    fn structural_key(&self, canonical: &str) -> Result<String, ChemistryError> {
        (**self).structural_key(canonical)
    }
}
