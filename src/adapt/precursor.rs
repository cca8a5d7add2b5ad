//! Builder for precursor-map outputs: product structure → reactant structures.
//!
//! A route is either a JSON object mapping products to reactant lists, or an
//! encoded step string `product>score>r1.r2|product>score>r3|...` whose first
//! product is the route's declared root. Search-result envelopes of the form
//! `{"succ": bool, "routes": "<encoded>"}` are unwrapped during decoding.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::Error;
use super::guard::{Ancestry, BuildContext};
use crate::chem::{CanonicalForm, Chemistry};
use crate::model::{Molecule, ReactionStep};

/// One raw precursor route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrecursorRoute {
    Map(BTreeMap<String, Vec<String>>),
    Encoded(String),
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    succ: bool,
    #[serde(default)]
    routes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Search(SearchResult),
    Many(Vec<RawPrecursorRoute>),
    One(RawPrecursorRoute),
}

/// Decodes every accepted precursor payload into a list of routes. An
/// unsuccessful search decodes to no routes.
pub(crate) fn decode(value: serde_json::Value) -> Result<Vec<RawPrecursorRoute>, String> {
    let payload: Payload = serde_json::from_value(value).map_err(|_| {
        "expected a precursor map, an encoded route string, a list of those, \
         or a search result object"
            .to_string()
    })?;
    match payload {
        Payload::Many(routes) => Ok(routes),
        Payload::One(route) => Ok(vec![route]),
        Payload::Search(SearchResult { succ: false, .. }) => Ok(Vec::new()),
        Payload::Search(SearchResult {
            routes: Some(route),
            ..
        }) if !route.is_empty() => Ok(vec![RawPrecursorRoute::Encoded(route)]),
        Payload::Search(_) => Err("successful search result has no 'routes' string".to_string()),
    }
}

type PrecursorMap = BTreeMap<String, Vec<CanonicalForm>>;

pub(crate) fn build_route<C: Chemistry + ?Sized>(
    raw: &RawPrecursorRoute,
    target: &CanonicalForm,
    ctx: &mut BuildContext<'_, C>,
) -> Result<Molecule, Error> {
    let map = match raw {
        RawPrecursorRoute::Map(raw_map) => canonical_map(raw_map, ctx)?,
        RawPrecursorRoute::Encoded(route) => {
            let (root, map) = parse_encoded(route, ctx)?;
            if root.canonical_id != target.canonical_id {
                return Err(ctx.logic(format!(
                    "mismatched target: expected '{}', route string starts at '{}'",
                    target.smiles, root.smiles
                )));
            }
            map
        }
    };
    build_node(target.clone(), &map, ctx, &Ancestry::root())
}

/// A product without a map entry is a leaf. A product whose entry is an
/// empty list is not: a step with no reactants is malformed, so the route is
/// rejected with [`Error::AdapterLogic`].
fn build_node<C: Chemistry + ?Sized>(
    form: CanonicalForm,
    map: &PrecursorMap,
    ctx: &mut BuildContext<'_, C>,
    ancestry: &Ancestry<'_>,
) -> Result<Molecule, Error> {
    if ctx.cut_cycle(&form, ancestry) {
        return Ok(Molecule::leaf(form));
    }
    let Some(precursors) = map.get(&form.canonical_id) else {
        return Ok(Molecule::leaf(form));
    };
    if precursors.is_empty() {
        return Err(ctx.logic(format!(
            "product '{}' has an empty precursor list",
            form.smiles
        )));
    }

    let scope = ancestry.child(&form.canonical_id);
    let mut reactants = Vec::with_capacity(precursors.len());
    for precursor in precursors {
        reactants.push(build_node(precursor.clone(), map, ctx, &scope)?);
    }
    Ok(Molecule::synthesized(form, ReactionStep::new(reactants)))
}

fn canonical_map<C: Chemistry + ?Sized>(
    raw: &BTreeMap<String, Vec<String>>,
    ctx: &BuildContext<'_, C>,
) -> Result<PrecursorMap, Error> {
    let mut map = PrecursorMap::new();
    for (product, reactants) in raw {
        let product = ctx.canonicalize(product)?;
        let reactants = reactants
            .iter()
            .map(|r| ctx.canonicalize(r))
            .collect::<Result<Vec<_>, _>>()?;
        map.entry(product.canonical_id).or_insert(reactants);
    }
    Ok(map)
}

fn parse_encoded<C: Chemistry + ?Sized>(
    route: &str,
    ctx: &BuildContext<'_, C>,
) -> Result<(CanonicalForm, PrecursorMap), Error> {
    let route = route.trim();
    if route.is_empty() {
        return Err(ctx.logic("route string is empty"));
    }
    if !route.contains('>') && !route.contains('|') {
        return Ok((ctx.canonicalize(route)?, PrecursorMap::new()));
    }

    let mut root = None;
    let mut map = PrecursorMap::new();
    for step in route.split('|') {
        let parts: Vec<&str> = step.split('>').collect();
        let &[product, _score, reactants] = parts.as_slice() else {
            let near: String = step.chars().take(70).collect();
            return Err(ctx.logic(format!("invalid route step near '{near}'")));
        };
        let product = ctx.canonicalize(product)?;
        let reactants = reactants
            .split('.')
            .map(|r| ctx.canonicalize(r))
            .collect::<Result<Vec<_>, _>>()?;
        if root.is_none() {
            root = Some(product.clone());
        }
        map.entry(product.canonical_id).or_insert(reactants);
    }

    let root = root.ok_or_else(|| ctx.logic("route string has no steps"))?;
    Ok((root, map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapt::BuildReport;
    use crate::chem::LexicalChemistry;
    use serde_json::json;

    fn build(raw: RawPrecursorRoute, target: &str) -> (Result<Molecule, Error>, BuildReport) {
        let chem = LexicalChemistry;
        let mut ctx = BuildContext::new(&chem, "t1");
        let target = chem.canonicalize(target).unwrap();
        let result = build_route(&raw, &target, &mut ctx);
        (result, ctx.report)
    }

    fn map(value: serde_json::Value) -> RawPrecursorRoute {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn two_node_cycle_is_cut_once() {
        let (tree, report) = build(map(json!({"A": ["B"], "B": ["A"]})), "A");
        let tree = tree.unwrap();
        assert_eq!(tree.depth(), 2);
        assert!(tree.is_acyclic());
        assert_eq!(report.cycles, 1);

        let b = &tree.reactants()[0];
        assert_eq!(b.canonical_id, "B");
        let a_again = &b.reactants()[0];
        assert_eq!(a_again.canonical_id, "A");
        assert!(a_again.is_leaf());
    }

    #[test]
    fn steps_carry_unmapped_reaction_smiles() {
        let (tree, _) = build(map(json!({"A": ["B"]})), "A");
        let tree = tree.unwrap();
        let step = tree.synthesis_step.as_ref().unwrap();
        assert_eq!(step.reaction_smiles.as_deref(), Some("B>>A"));
        assert!(step.mapped_form.is_none());
    }

    #[test]
    fn target_without_entry_is_single_leaf() {
        let (tree, report) = build(map(json!({"CC": ["C"]})), "CCO");
        let tree = tree.unwrap();
        assert!(tree.is_leaf());
        assert_eq!(report, BuildReport::default());
    }

    #[test]
    fn keys_and_values_are_canonicalized() {
        let (tree, _) = build(map(json!({" O.CC ": ["CC", "O"]})), "CC.O");
        let tree = tree.unwrap();
        assert_eq!(tree.canonical_id, "CC.O");
        assert_eq!(tree.reactants().len(), 2);
    }

    #[test]
    fn empty_precursor_list_is_logic_error() {
        let (result, _) = build(map(json!({"A": []})), "A");
        assert!(matches!(result, Err(Error::AdapterLogic { .. })));
    }

    #[test]
    fn encoded_route_string() {
        let raw = RawPrecursorRoute::Encoded("CCOC>0.9>CCO.C|CCO>0.5>CC.O".into());
        let (tree, _) = build(raw, "CCOC");
        let tree = tree.unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_ids().into_iter().collect::<Vec<_>>(), vec!["C", "CC", "O"]);
    }

    #[test]
    fn encoded_route_must_start_at_target() {
        let raw = RawPrecursorRoute::Encoded("CCO>0.5>CC.O".into());
        let (result, _) = build(raw, "CCN");
        assert!(matches!(result, Err(Error::AdapterLogic { .. })));
    }

    #[test]
    fn encoded_route_with_bad_step() {
        let raw = RawPrecursorRoute::Encoded("CCO>0.5>CC.O|CC>C".into());
        let (result, _) = build(raw, "CCO");
        assert!(matches!(result, Err(Error::AdapterLogic { .. })));
    }

    #[test]
    fn bare_structure_string_is_leaf_route() {
        let (tree, _) = build(RawPrecursorRoute::Encoded("CCO".into()), "CCO");
        assert!(tree.unwrap().is_leaf());
    }

    #[test]
    fn decode_accepts_every_payload_shape() {
        assert_eq!(decode(json!([{"A": ["B"]}, "A>1>B"])).unwrap().len(), 2);
        assert_eq!(decode(json!({"A": ["B"]})).unwrap().len(), 1);
        assert_eq!(decode(json!("A>1>B")).unwrap().len(), 1);
        assert_eq!(decode(json!({"succ": true, "routes": "A>1>B"})).unwrap().len(), 1);
        assert!(decode(json!({"succ": false})).unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_malformed_payloads() {
        assert!(decode(json!(42)).is_err());
        assert!(decode(json!({"A": "B"})).is_err());
        assert!(decode(json!({"succ": true})).is_err());
    }
}
