//! Checks shared by every builder: canonicalization with error scoping,
//! cycle cutting along the current path, and root validation.

use tracing::warn;

use super::error::Error;
use crate::chem::{CanonicalForm, Chemistry};
use crate::model::Molecule;

/// Counters describing what happened while reconstructing routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Routes skipped because of a route-scoped error.
    pub rejected: usize,
    /// Repeated identities on a path that were cut to leaves.
    pub cycles: usize,
    /// Alternative reactions ignored by the bipartite builder.
    pub discarded_reactions: usize,
}

impl BuildReport {
    pub fn merge(&mut self, other: BuildReport) {
        self.rejected += other.rejected;
        self.cycles += other.cycles;
        self.discarded_reactions += other.discarded_reactions;
    }
}

/// The identities on the path from the root to the node being built.
///
/// Each recursion level pushes a new link on the stack; the chain itself is
/// never mutated, so sibling subtrees never see each other's ancestors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ancestry<'a> {
    id: Option<&'a str>,
    parent: Option<&'a Ancestry<'a>>,
}

impl<'a> Ancestry<'a> {
    pub fn root() -> Self {
        Self {
            id: None,
            parent: None,
        }
    }

    pub fn child<'b>(&'b self, id: &'b str) -> Ancestry<'b> {
        Ancestry {
            id: Some(id),
            parent: Some(self),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.id == Some(id) {
                return true;
            }
            link = current.parent;
        }
        false
    }
}

/// Per-route reconstruction state.
pub(crate) struct BuildContext<'a, C: ?Sized> {
    chem: &'a C,
    target_id: &'a str,
    pub report: BuildReport,
}

impl<'a, C: Chemistry + ?Sized> BuildContext<'a, C> {
    pub fn new(chem: &'a C, target_id: &'a str) -> Self {
        Self {
            chem,
            target_id,
            report: BuildReport::default(),
        }
    }

    pub fn canonicalize(&self, raw: &str) -> Result<CanonicalForm, Error> {
        self.chem
            .canonicalize(raw)
            .map_err(|source| Error::chemistry(self.target_id, source))
    }

    pub fn logic(&self, details: impl Into<String>) -> Error {
        Error::adapter_logic(self.target_id, details)
    }

    /// Returns `true` (and records a diagnostic) if `form` already occurs on
    /// the current path. The caller then emits the node as a leaf.
    pub fn cut_cycle(&mut self, form: &CanonicalForm, ancestry: &Ancestry<'_>) -> bool {
        if !ancestry.contains(&form.canonical_id) {
            return false;
        }
        warn!(
            target_id = self.target_id,
            smiles = %form.smiles,
            "cycle detected in route graph; treating repeated molecule as a leaf"
        );
        self.report.cycles += 1;
        true
    }
}

/// Rejects a reconstructed tree whose root is not the requested target.
pub(crate) fn validate_root(
    root: &Molecule,
    expected: &CanonicalForm,
    target_id: &str,
) -> Result<(), Error> {
    if root.canonical_id == expected.canonical_id {
        return Ok(());
    }
    Err(Error::adapter_logic(
        target_id,
        format!(
            "mismatched target: expected '{}', adapter produced '{}'",
            expected.smiles, root.display_form
        ),
    ))
}
