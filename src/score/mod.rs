//! Solvability scoring against a stock of purchasable structures.
//!
//! A route is solvable under a stock iff every leaf's `canonical_id` is in
//! that stock. Scoring never touches the tree; the verdict is recorded in
//! [`Route::solvability`] under the stock's name.

use std::collections::BTreeSet;

use tracing::warn;

use crate::chem::Chemistry;
use crate::model::{Route, RouteSet};

/// Decides route solvability from leaf identities.
pub trait SolvabilityScorer: Sync {
    /// Key under which verdicts are recorded.
    fn name(&self) -> &str;

    fn is_available(&self, canonical_id: &str) -> bool;

    fn is_solvable(&self, route: &Route) -> bool {
        route.leaf_ids().into_iter().all(|id| self.is_available(id))
    }
}

/// A named set of canonical identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    name: String,
    ids: BTreeSet<String>,
}

impl Stock {
    pub fn new(name: impl Into<String>, ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            ids: ids.into_iter().collect(),
        }
    }

    /// Builds a stock from newline-separated structures.
    ///
    /// Blank lines and lines starting with `#` are ignored. The first
    /// whitespace-separated field is the structure; anything after it (an
    /// identifier or price column) is ignored. Structures the chemistry
    /// backend rejects are skipped with a warning.
    pub fn parse<C: Chemistry + ?Sized>(name: impl Into<String>, text: &str, chem: &C) -> Self {
        let name = name.into();
        let mut ids = BTreeSet::new();
        for (index, line) in text.lines().enumerate() {
            let Some(structure) = line.split_whitespace().next() else {
                continue;
            };
            if structure.starts_with('#') {
                continue;
            }
            match chem.canonicalize(structure) {
                Ok(form) => {
                    ids.insert(form.canonical_id);
                }
                Err(e) => warn!(stock = %name, line = index + 1, "skipping stock entry: {e}"),
            }
        }
        Self { name, ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, canonical_id: &str) -> bool {
        self.ids.contains(canonical_id)
    }
}

impl SolvabilityScorer for Stock {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self, canonical_id: &str) -> bool {
        self.contains(canonical_id)
    }
}

/// Records the scorer's verdict on each route.
pub fn annotate<S: SolvabilityScorer + ?Sized>(routes: Vec<Route>, scorer: &S) -> Vec<Route> {
    routes
        .into_iter()
        .map(|route| {
            let solvable = scorer.is_solvable(&route);
            route.with_solvability(scorer.name(), solvable)
        })
        .collect()
}

/// [`annotate`] applied to every target of a route set.
pub fn annotate_set<S: SolvabilityScorer + ?Sized>(set: RouteSet, scorer: &S) -> RouteSet {
    set.into_inner()
        .into_iter()
        .map(|(target, routes)| (target, annotate(routes, scorer)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::{CanonicalForm, LexicalChemistry};
    use crate::model::{Molecule, ReactionStep};

    fn form(s: &str) -> CanonicalForm {
        CanonicalForm {
            canonical_id: s.into(),
            smiles: s.into(),
        }
    }

    fn ethanol_route(rank: usize) -> Route {
        Route::new(
            Molecule::synthesized(
                form("CCO"),
                ReactionStep::new(vec![Molecule::leaf(form("CC")), Molecule::leaf(form("O"))]),
            ),
            rank,
        )
    }

    #[test]
    fn parse_skips_comments_blanks_and_invalid_lines() {
        let text = "# buyables\nO.[Na+] sodium\n\nCC 12.50\nC(C\nO\n";
        let stock = Stock::parse("buyables", text, &LexicalChemistry);
        assert_eq!(stock.len(), 3);
        assert!(stock.contains("CC"));
        assert!(stock.contains("O"));
        assert!(stock.contains("O.[Na+]"));
        assert!(!stock.contains("C(C"));
    }

    #[test]
    fn solvable_iff_all_leaves_in_stock() {
        let full = Stock::new("full", ["CC".to_string(), "O".to_string()]);
        let partial = Stock::new("partial", ["CC".to_string()]);

        let route = ethanol_route(1);
        assert!(full.is_solvable(&route));
        assert!(!partial.is_solvable(&route));
    }

    #[test]
    fn annotate_records_verdict_without_touching_tree() {
        let stock = Stock::new("buyables", ["CC".to_string(), "O".to_string()]);
        let before = vec![ethanol_route(1), Route::new(Molecule::leaf(form("CCN")), 2)];
        let after = annotate(before.clone(), &stock);

        assert_eq!(after[0].solvability.get("buyables"), Some(&true));
        assert_eq!(after[1].solvability.get("buyables"), Some(&false));
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.target, b.target);
            assert_eq!(a.rank, b.rank);
        }
    }

    #[test]
    fn annotate_set_keeps_every_target() {
        let stock = Stock::new("s", ["CC".to_string(), "O".to_string()]);
        let mut set = RouteSet::new();
        set.insert("t1", vec![ethanol_route(1)]);
        set.insert("t2", vec![]);

        let scored = annotate_set(set, &stock);
        assert_eq!(scored.target_count(), 2);
        assert_eq!(scored.get("t1").unwrap()[0].solvability.get("s"), Some(&true));
    }
}
