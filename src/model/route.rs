use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use super::molecule::Molecule;

/// One complete proposed synthesis for a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Root of the synthesis tree.
    pub target: Molecule,
    /// 1-based position among the routes the model proposed for this target.
    pub rank: usize,
    /// Stock name → solvable. Empty until a scorer annotates the route.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub solvability: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Route {
    pub fn new(target: Molecule, rank: usize) -> Self {
        Self {
            target,
            rank,
            solvability: BTreeMap::new(),
            metadata: Metadata::new(),
        }
    }

    /// Returns the route with `solvability[stock]` set; the tree is untouched.
    pub fn with_solvability(mut self, stock: impl Into<String>, solvable: bool) -> Self {
        self.solvability.insert(stock.into(), solvable);
        self
    }

    /// Longest path of reactions from the target to a starting material.
    #[inline]
    pub fn depth(&self) -> usize {
        self.target.depth()
    }

    pub fn leaves(&self) -> Vec<&Molecule> {
        self.target.leaves()
    }

    pub fn leaf_ids(&self) -> BTreeSet<&str> {
        self.target.leaf_ids()
    }

    /// Order-invariant structural signature used for deduplication.
    pub fn signature(&self) -> String {
        crate::curate::signature(&self.target)
    }
}

/// Routes for many targets, keyed by target id.
///
/// Keys are sorted and each route list is kept in rank order, which makes the
/// serialized artifact independent of the order targets were processed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteSet(BTreeMap<String, Vec<Route>>);

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the routes for a target, sorting them by rank.
    pub fn insert(&mut self, target_id: impl Into<String>, mut routes: Vec<Route>) {
        routes.sort_by_key(|r| r.rank);
        self.0.insert(target_id.into(), routes);
    }

    pub fn get(&self, target_id: &str) -> Option<&[Route]> {
        self.0.get(target_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Route])> {
        self.0.iter().map(|(id, routes)| (id.as_str(), routes.as_slice()))
    }

    #[inline]
    pub fn target_count(&self) -> usize {
        self.0.len()
    }

    pub fn route_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<Route>> {
        self.0
    }
}

impl FromIterator<(String, Vec<Route>)> for RouteSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Route>)>>(iter: I) -> Self {
        let mut set = RouteSet::new();
        for (id, routes) in iter {
            set.insert(id, routes);
        }
        set
    }
}
