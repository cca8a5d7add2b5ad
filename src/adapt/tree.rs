//! Builder for outputs that are already molecule trees.

use serde::Deserialize;

use super::error::Error;
use super::guard::{Ancestry, BuildContext};
use crate::chem::Chemistry;
use crate::model::{Metadata, Molecule, ReactionStep};

/// A raw tree node: a structure and the reactants it is made from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTreeNode {
    pub smiles: String,
    #[serde(default)]
    pub children: Vec<RawTreeNode>,
    #[serde(default)]
    pub metadata: Metadata,
}

pub(crate) fn build_route<C: Chemistry + ?Sized>(
    root: &RawTreeNode,
    ctx: &mut BuildContext<'_, C>,
) -> Result<Molecule, Error> {
    build_node(root, ctx, &Ancestry::root())
}

fn build_node<C: Chemistry + ?Sized>(
    node: &RawTreeNode,
    ctx: &mut BuildContext<'_, C>,
    ancestry: &Ancestry<'_>,
) -> Result<Molecule, Error> {
    let form = ctx.canonicalize(&node.smiles)?;
    let metadata = node.metadata.clone();

    if node.children.is_empty() || ctx.cut_cycle(&form, ancestry) {
        return Ok(Molecule::leaf(form).with_metadata(metadata));
    }

    let scope = ancestry.child(&form.canonical_id);
    let mut reactants = Vec::with_capacity(node.children.len());
    for child in &node.children {
        reactants.push(build_node(child, ctx, &scope)?);
    }
    Ok(Molecule::synthesized(form, ReactionStep::new(reactants)).with_metadata(metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::LexicalChemistry;
    use serde_json::json;

    fn build(value: serde_json::Value) -> (Result<Molecule, Error>, crate::adapt::BuildReport) {
        let chem = LexicalChemistry;
        let mut ctx = BuildContext::new(&chem, "t1");
        let raw: RawTreeNode = serde_json::from_value(value).unwrap();
        let result = build_route(&raw, &mut ctx);
        (result, ctx.report)
    }

    #[test]
    fn copies_structure_with_one_step_per_child_list() {
        let (tree, _) = build(json!({
            "smiles": "CCOC(C)=O",
            "children": [
                {"smiles": "CCO"},
                {"smiles": "CC(=O)O", "children": [{"smiles": "CC=O"}]}
            ]
        }));
        let tree = tree.unwrap();
        assert_eq!(tree.reactants().len(), 2);
        assert_eq!(tree.depth(), 2);
        assert!(tree.reactants()[0].is_leaf());
        assert_eq!(tree.reactants()[1].reactants().len(), 1);
    }

    #[test]
    fn childless_node_is_leaf() {
        let (tree, _) = build(json!({"smiles": "CCO", "children": []}));
        assert!(tree.unwrap().is_leaf());
    }

    #[test]
    fn metadata_is_preserved_verbatim() {
        let (tree, _) = build(json!({"smiles": "CCO", "metadata": {"score": 0.25, "source": "beam"}}));
        let tree = tree.unwrap();
        assert_eq!(tree.metadata.get("score"), Some(&json!(0.25)));
        assert_eq!(tree.metadata.get("source"), Some(&json!("beam")));
    }

    #[test]
    fn repeated_structure_is_cut() {
        let (tree, report) = build(json!({
            "smiles": "A",
            "children": [{"smiles": "B", "children": [{"smiles": "A", "children": [{"smiles": "C"}]}]}]
        }));
        let tree = tree.unwrap();
        assert_eq!(tree.depth(), 2);
        assert!(tree.is_acyclic());
        assert_eq!(report.cycles, 1);
    }

    #[test]
    fn invalid_child_structure_rejects_route() {
        let (result, _) = build(json!({"smiles": "CCO", "children": [{"smiles": "C[C"}]}));
        assert!(matches!(result, Err(Error::Chemistry { .. })));
    }
}
