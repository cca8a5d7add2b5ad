//! Canonical synthesis-tree data model.
//!
//! Every adapter, whatever raw shape it reads, produces the same three types:
//!
//! - [`molecule`] – [`Molecule`] nodes and the [`ReactionStep`] that produces them.
//! - [`route`] – a ranked [`Route`] rooted at the target, and [`RouteSet`] for many targets.
//! - [`metadata`] – the opaque, sorted [`Metadata`] bag attached to every level.
//!
//! A route exclusively owns its tree. Chemically identical molecules in two
//! routes are equal by `canonical_id` but are separate values.
//!
//! [`Molecule`]: molecule::Molecule
//! [`ReactionStep`]: molecule::ReactionStep
//! [`Route`]: route::Route
//! [`RouteSet`]: route::RouteSet
//! [`Metadata`]: metadata::Metadata

pub mod metadata;
pub mod molecule;
pub mod route;

pub use metadata::Metadata;
pub use molecule::{Molecule, ReactionStep};
pub use route::{Route, RouteSet};
