//! Reconstruction of canonical route trees from raw model outputs.
//!
//! Raw outputs come in three shapes, modelled by the closed [`RawRoutes`]
//! variant: bipartite molecule/reaction graphs, precursor maps and ready-made
//! molecule trees. Each model name in the registry ([`Adapter`]) maps onto one
//! of these shapes.
//!
//! Reconstruction is lazy: [`routes`] returns an iterator that builds one
//! route per raw entry. Every structural string passes through the supplied
//! [`Chemistry`] backend before it is stored, repeated identities on a path
//! are cut to leaves, and a route whose root is not the requested target is
//! rejected without affecting its siblings. Ranks are the 1-based positions in
//! the raw output, so a rejected route leaves a gap.
//!
//! # Examples
//!
//! ```
//! use route_forge::adapt::{Adapter, TargetInput};
//! use route_forge::chem::LexicalChemistry;
//! use serde_json::json;
//!
//! let raw = json!([{
//!     "type": "mol", "smiles": "CCO",
//!     "children": [{"type": "reaction", "children": [
//!         {"type": "mol", "smiles": "CC", "in_stock": true},
//!         {"type": "mol", "smiles": "O", "in_stock": true}
//!     ]}]
//! }]);
//! let target = TargetInput::new("ethanol", "CCO");
//!
//! let adapter = Adapter::by_name("aizynth")?;
//! let result = adapter.adapt(raw, &target, &LexicalChemistry)?;
//! assert_eq!(result.routes.len(), 1);
//! assert_eq!(result.routes[0].signature(), "CCO(CC,O)");
//! # Ok::<(), route_forge::adapt::Error>(())
//! ```

pub mod bipartite;
mod error;
mod guard;
pub mod precursor;
pub mod tree;

pub use error::Error;
pub use guard::BuildReport;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chem::{CanonicalForm, Chemistry};
use crate::model::{Molecule, Route};
use bipartite::RawNode;
use guard::BuildContext;
use precursor::RawPrecursorRoute;
use tree::RawTreeNode;

/// The identity a set of raw routes was predicted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInput {
    pub id: String,
    pub smiles: String,
}

impl TargetInput {
    pub fn new(id: impl Into<String>, smiles: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            smiles: smiles.into(),
        }
    }
}

/// The structural family of a raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawShape {
    Bipartite,
    PrecursorMap,
    Tree,
}

impl fmt::Display for RawShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bipartite => "bipartite",
            Self::PrecursorMap => "precursor-map",
            Self::Tree => "tree",
        };
        f.write_str(name)
    }
}

/// Schema-validated raw routes for one target, in the order the model emitted them.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRoutes {
    Bipartite(Vec<RawNode>),
    PrecursorMap(Vec<RawPrecursorRoute>),
    Tree(Vec<RawTreeNode>),
}

impl RawRoutes {
    pub fn shape(&self) -> RawShape {
        match self {
            Self::Bipartite(_) => RawShape::Bipartite,
            Self::PrecursorMap(_) => RawShape::PrecursorMap,
            Self::Tree(_) => RawShape::Tree,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bipartite(routes) => routes.len(),
            Self::PrecursorMap(routes) => routes.len(),
            Self::Tree(routes) => routes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates `value` against the schema of `shape`.
    ///
    /// Any mismatch fails the whole blob with [`Error::SchemaValidation`].
    pub fn decode(
        shape: RawShape,
        value: serde_json::Value,
        adapter: &str,
        target_id: &str,
    ) -> Result<Self, Error> {
        let schema_error = |details: String| Error::schema_validation(adapter, target_id, details);
        match shape {
            RawShape::Bipartite => serde_json::from_value(value)
                .map(Self::Bipartite)
                .map_err(|e| schema_error(e.to_string())),
            RawShape::PrecursorMap => precursor::decode(value)
                .map(Self::PrecursorMap)
                .map_err(schema_error),
            RawShape::Tree => decode_tree_payload(value)
                .map(Self::Tree)
                .map_err(|e| schema_error(e.to_string())),
        }
    }
}

/// A tree payload is either a list of root nodes or a single root node.
fn decode_tree_payload(value: serde_json::Value) -> Result<Vec<RawTreeNode>, serde_json::Error> {
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|root| vec![root])
    }
}

/// A named adapter: a model name bound to the raw shape it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adapter {
    name: &'static str,
    shape: RawShape,
}

const REGISTRY: &[Adapter] = &[
    Adapter::new("aizynth", RawShape::Bipartite),
    Adapter::new("synplanner", RawShape::Bipartite),
    Adapter::new("retrostar", RawShape::PrecursorMap),
    Adapter::new("dreamretro", RawShape::PrecursorMap),
    Adapter::new("dms", RawShape::Tree),
    Adapter::new("custom", RawShape::Tree),
];

impl Adapter {
    const fn new(name: &'static str, shape: RawShape) -> Self {
        Self { name, shape }
    }

    /// Looks up a registered adapter by name.
    pub fn by_name(name: &str) -> Result<Self, Error> {
        REGISTRY
            .iter()
            .copied()
            .find(|a| a.name == name)
            .ok_or_else(|| Error::UnknownAdapter {
                name: name.to_string(),
                available: Self::names().join(", "),
            })
    }

    pub fn all() -> &'static [Adapter] {
        REGISTRY
    }

    pub fn names() -> Vec<&'static str> {
        REGISTRY.iter().map(|a| a.name).collect()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> RawShape {
        self.shape
    }

    pub fn decode(&self, value: serde_json::Value, target_id: &str) -> Result<RawRoutes, Error> {
        RawRoutes::decode(self.shape, value, self.name, target_id)
    }

    /// Decodes `value` and reconstructs every route eagerly.
    pub fn adapt<C: Chemistry + ?Sized>(
        &self,
        value: serde_json::Value,
        target: &TargetInput,
        chem: &C,
    ) -> Result<Adaptation, Error> {
        let raw = self.decode(value, &target.id)?;
        let mut iter = routes(&raw, target, chem)?;
        let routes: Vec<Route> = iter.by_ref().collect();
        let report = iter.report();
        debug!(
            adapter = self.name,
            target = %target.id,
            produced = routes.len(),
            rejected = report.rejected,
            "adapted raw routes"
        );
        Ok(Adaptation {
            raw_count: raw.len(),
            routes,
            report,
        })
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Eagerly collected adapter output for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Adaptation {
    /// Number of raw routes the model emitted.
    pub raw_count: usize,
    /// Successfully reconstructed routes, in rank order.
    pub routes: Vec<Route>,
    pub report: BuildReport,
}

/// Starts lazy reconstruction of `raw` for `target`.
///
/// Fails with [`Error::Chemistry`] only if the target identity itself cannot
/// be canonicalized; per-route failures are logged and skipped by the iterator.
pub fn routes<'a, C: Chemistry + ?Sized>(
    raw: &'a RawRoutes,
    target: &'a TargetInput,
    chem: &'a C,
) -> Result<Routes<'a, C>, Error> {
    let expected = chem
        .canonicalize(&target.smiles)
        .map_err(|source| Error::chemistry(&target.id, source))?;
    Ok(Routes {
        raw,
        target,
        expected,
        chem,
        position: 0,
        report: BuildReport::default(),
    })
}

/// Lazy sequence of reconstructed routes. Restartable by calling [`routes`]
/// again; the output depends only on the inputs.
pub struct Routes<'a, C: ?Sized> {
    raw: &'a RawRoutes,
    target: &'a TargetInput,
    expected: CanonicalForm,
    chem: &'a C,
    position: usize,
    report: BuildReport,
}

impl<C: Chemistry + ?Sized> Routes<'_, C> {
    /// Counters accumulated over the routes produced so far.
    pub fn report(&self) -> BuildReport {
        self.report
    }

    fn build(&mut self, index: usize) -> Result<Molecule, Error> {
        let mut ctx = BuildContext::new(self.chem, &self.target.id);
        let built = match self.raw {
            RawRoutes::Bipartite(roots) => bipartite::build_route(&roots[index], &mut ctx),
            RawRoutes::PrecursorMap(maps) => {
                precursor::build_route(&maps[index], &self.expected, &mut ctx)
            }
            RawRoutes::Tree(roots) => tree::build_route(&roots[index], &mut ctx),
        };
        self.report.merge(ctx.report);
        let root = built?;
        guard::validate_root(&root, &self.expected, &self.target.id)?;
        Ok(root)
    }
}

impl<C: Chemistry + ?Sized> Iterator for Routes<'_, C> {
    type Item = Route;

    fn next(&mut self) -> Option<Route> {
        while self.position < self.raw.len() {
            let index = self.position;
            self.position += 1;
            let rank = index + 1;

            match self.build(index) {
                Ok(root) => return Some(Route::new(root, rank)),
                Err(e) => {
                    self.report.rejected += 1;
                    warn!(target = %self.target.id, rank, "skipping route: {e}");
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.raw.len() - self.position))
    }
}
