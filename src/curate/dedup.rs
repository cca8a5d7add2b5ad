use std::collections::HashSet;

use tracing::debug;

use crate::model::Route;

/// Drops every route whose signature was already seen earlier in `routes`.
///
/// The first occurrence wins and surviving routes keep their original rank,
/// so the output ranks are a subsequence of the input ranks.
pub fn deduplicate(routes: Vec<Route>) -> Vec<Route> {
    let before = routes.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<Route> = routes
        .into_iter()
        .filter(|route| seen.insert(route.signature()))
        .collect();

    if kept.len() < before {
        debug!(
            before,
            after = kept.len(),
            "removed duplicate routes"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::CanonicalForm;
    use crate::model::{Molecule, ReactionStep};

    fn leaf(s: &str) -> Molecule {
        Molecule::leaf(CanonicalForm {
            canonical_id: s.to_string(),
            smiles: s.to_string(),
        })
    }

    fn route(rank: usize, reactants: &[&str]) -> Route {
        let form = CanonicalForm {
            canonical_id: "CCO".into(),
            smiles: "CCO".into(),
        };
        let target = if reactants.is_empty() {
            Molecule::leaf(form)
        } else {
            Molecule::synthesized(
                form,
                ReactionStep::new(reactants.iter().map(|s| leaf(s)).collect()),
            )
        };
        Route::new(target, rank)
    }

    fn ranks(routes: &[Route]) -> Vec<usize> {
        routes.iter().map(|r| r.rank).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(deduplicate(Vec::new()).is_empty());
    }

    #[test]
    fn swapped_reactants_are_duplicates() {
        let routes = vec![
            route(1, &["CC", "O"]),
            route(2, &["C", "CO"]),
            route(3, &["O", "CC"]),
        ];
        let out = deduplicate(routes);
        assert_eq!(ranks(&out), vec![1, 2]);
    }

    #[test]
    fn idempotent() {
        let routes = vec![
            route(1, &["CC", "O"]),
            route(2, &["O", "CC"]),
            route(4, &[]),
            route(5, &[]),
        ];
        let once = deduplicate(routes);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
        assert_eq!(ranks(&once), vec![1, 4]);
    }

    #[test]
    fn ranks_are_never_renumbered() {
        let out = deduplicate(vec![route(3, &["CC", "O"]), route(7, &[]), route(9, &["O", "CC"])]);
        assert_eq!(ranks(&out), vec![3, 7]);
    }

    #[test]
    fn single_leaf_route_survives() {
        let out = deduplicate(vec![route(1, &[])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].signature(), "CCO");
    }
}
