//! Builder for bipartite outputs: molecule nodes and reaction nodes alternate.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::error::Error;
use super::guard::{Ancestry, BuildContext};
use crate::chem::Chemistry;
use crate::model::{Metadata, Molecule, ReactionStep};

/// A node of a raw bipartite route graph, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawNode {
    Mol(RawMolNode),
    Reaction(RawReactionNode),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMolNode {
    pub smiles: String,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub children: Vec<RawNode>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawReactionNode {
    #[serde(default)]
    pub children: Vec<RawNode>,
    #[serde(default)]
    pub mapped_smiles: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RawReactionNode {
    /// The atom-mapped reaction string, from the dedicated field or from
    /// `metadata.mapped_reaction_smiles`.
    fn mapped_form(&self) -> Option<String> {
        self.mapped_smiles.clone().or_else(|| {
            self.metadata
                .get("mapped_reaction_smiles")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
    }

    /// Structures listed under `metadata[key]`, either as a `.`-joined
    /// string or as a list of strings.
    fn component_set(&self, key: &str) -> Option<BTreeSet<String>> {
        let set: BTreeSet<String> = match self.metadata.get(key)? {
            Value::String(joined) => joined
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => return None,
        };
        (!set.is_empty()).then_some(set)
    }
}

pub(crate) fn build_route<C: Chemistry + ?Sized>(
    root: &RawNode,
    ctx: &mut BuildContext<'_, C>,
) -> Result<Molecule, Error> {
    match root {
        RawNode::Mol(mol) => build_molecule(mol, ctx, &Ancestry::root()),
        RawNode::Reaction(_) => Err(ctx.logic("route root is a reaction node, expected 'mol'")),
    }
}

fn build_molecule<C: Chemistry + ?Sized>(
    node: &RawMolNode,
    ctx: &mut BuildContext<'_, C>,
    ancestry: &Ancestry<'_>,
) -> Result<Molecule, Error> {
    let form = ctx.canonicalize(&node.smiles)?;
    let metadata = node.metadata.clone();

    if node.in_stock || node.children.is_empty() || ctx.cut_cycle(&form, ancestry) {
        return Ok(Molecule::leaf(form).with_metadata(metadata));
    }

    if node.children.len() > 1 {
        let discarded = node.children.len() - 1;
        warn!(
            smiles = %form.smiles,
            discarded,
            "molecule has multiple child reactions; only the first is used"
        );
        ctx.report.discarded_reactions += discarded;
    }

    let RawNode::Reaction(reaction) = &node.children[0] else {
        return Err(ctx.logic(format!(
            "child of molecule '{}' is not a reaction node",
            form.smiles
        )));
    };
    if reaction.children.is_empty() {
        return Err(ctx.logic(format!(
            "reaction producing '{}' has no reactants",
            form.smiles
        )));
    }

    let scope = ancestry.child(&form.canonical_id);
    let mut reactants = Vec::with_capacity(reaction.children.len());
    for child in &reaction.children {
        match child {
            RawNode::Mol(mol) => reactants.push(build_molecule(mol, ctx, &scope)?),
            RawNode::Reaction(_) => {
                return Err(ctx.logic(format!(
                    "reaction producing '{}' has a reaction node as reactant",
                    form.smiles
                )));
            }
        }
    }

    let step = ReactionStep::new(reactants)
        .with_mapped_form(reaction.mapped_form())
        .with_reagents(reaction.component_set("reagents"))
        .with_solvents(reaction.component_set("solvents"))
        .with_metadata(reaction.metadata.clone());
    Ok(Molecule::synthesized(form, step).with_metadata(metadata))
}
