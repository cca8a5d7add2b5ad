use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use crate::chem::CanonicalForm;

/// A molecule node in a canonical synthesis tree.
///
/// A molecule is a leaf (starting material) iff it has no [`ReactionStep`].
/// Two molecules with equal `canonical_id` are chemically identical but remain
/// independent tree nodes; nothing is shared between routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    /// Structural identity produced by the chemistry backend.
    pub canonical_id: String,
    /// Canonical structural string for humans; not used for identity.
    pub display_form: String,
    /// The single reaction that produces this molecule, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis_step: Option<Box<ReactionStep>>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// One retrosynthetic step. Its product is the owning [`Molecule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionStep {
    /// Reactants in the order the model emitted them.
    pub reactants: Vec<Molecule>,
    /// Atom-mapped reaction string, when the model supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_form: Option<String>,
    /// Unmapped `reactants>>product` string, filled in when no mapped form
    /// was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_smiles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reagents: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solvents: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Molecule {
    /// Creates a leaf molecule from a canonicalized structure.
    pub fn leaf(form: CanonicalForm) -> Self {
        Self {
            canonical_id: form.canonical_id,
            display_form: form.smiles,
            synthesis_step: None,
            metadata: Metadata::new(),
        }
    }

    /// Creates a molecule produced by `step`.
    ///
    /// A step without a mapped form gets its unmapped reaction string here,
    /// where the product is known.
    pub fn synthesized(form: CanonicalForm, mut step: ReactionStep) -> Self {
        if step.mapped_form.is_none() && step.reaction_smiles.is_none() {
            step.reaction_smiles = Some(step.unmapped_reaction(&form.smiles));
        }
        Self {
            canonical_id: form.canonical_id,
            display_form: form.smiles,
            synthesis_step: Some(Box::new(step)),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.synthesis_step.is_none()
    }

    /// Reactants of the producing step; empty for leaves.
    pub fn reactants(&self) -> &[Molecule] {
        match &self.synthesis_step {
            Some(step) => &step.reactants,
            None => &[],
        }
    }

    /// Number of reactions on the longest path from this node to a leaf.
    pub fn depth(&self) -> usize {
        match &self.synthesis_step {
            None => 0,
            Some(step) => 1 + step.reactants.iter().map(Molecule::depth).max().unwrap_or(0),
        }
    }

    /// All leaf nodes below (or at) this molecule, in depth-first order.
    pub fn leaves(&self) -> Vec<&Molecule> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Molecule>) {
        match &self.synthesis_step {
            None => out.push(self),
            Some(step) => {
                for reactant in &step.reactants {
                    reactant.collect_leaves(out);
                }
            }
        }
    }

    /// Distinct canonical ids of all leaves.
    pub fn leaf_ids(&self) -> BTreeSet<&str> {
        self.leaves()
            .into_iter()
            .map(|m| m.canonical_id.as_str())
            .collect()
    }

    /// Returns `true` if no molecule is expanded beneath an ancestor with the
    /// same `canonical_id`. A repeated identity may appear as a leaf; that is
    /// how builders cut cycles in the raw graph.
    pub fn is_acyclic(&self) -> bool {
        fn walk<'a>(node: &'a Molecule, path: &mut Vec<&'a str>) -> bool {
            if path.contains(&node.canonical_id.as_str()) {
                return node.is_leaf();
            }
            path.push(&node.canonical_id);
            let ok = node.reactants().iter().all(|r| walk(r, path));
            path.pop();
            ok
        }
        walk(self, &mut Vec::new())
    }
}

impl ReactionStep {
    pub fn new(reactants: Vec<Molecule>) -> Self {
        Self {
            reactants,
            mapped_form: None,
            reaction_smiles: None,
            reagents: None,
            solvents: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_mapped_form(mut self, mapped_form: Option<String>) -> Self {
        self.mapped_form = mapped_form;
        self
    }

    pub fn with_reagents(mut self, reagents: Option<BTreeSet<String>>) -> Self {
        self.reagents = reagents;
        self
    }

    pub fn with_solvents(mut self, solvents: Option<BTreeSet<String>>) -> Self {
        self.solvents = solvents;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Unmapped reaction string `reactants>>product`, reactants sorted so the
    /// result does not depend on emission order.
    pub fn unmapped_reaction(&self, product: &str) -> String {
        let mut reactants: Vec<&str> = self
            .reactants
            .iter()
            .map(|r| r.display_form.as_str())
            .collect();
        reactants.sort_unstable();
        format!("{}>>{}", reactants.join("."), product)
    }
}
