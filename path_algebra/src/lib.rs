/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

#![deny(missing_docs)]

//! Path algebras for generalized shortest-path computation.
//!
//! A path algebra describes how routes are *chosen* and how they are
//! *extended*. It is the structure over which a generalized
//! Bellman-Ford relaxation runs.
//!
//! # Quick Start
//!
//! ```rust
//! use path_algebra::MinPlus;
//! use path_algebra::PathAlgebra;
//! use path_algebra::Weight;
//!
//! let a = MinPlus;
//! let best = a.plus(&Weight::Finite(3), &Weight::Finite(5)).unwrap();
//! assert_eq!(best, Weight::Finite(3));
//!
//! // Extending the identity route by an edge of weight 4.
//! let r = a.times(&Weight::Finite(4), &a.identity_route(), 0, 1);
//! assert_eq!(r, Weight::Finite(4));
//! ```
//!
//! # Core Concepts
//!
//! - **plus** (`⊕`): chooses between two routes. It must be
//!   idempotent, commutative and **selective**: `a ⊕ b` is always
//!   one of `a` or `b`. Selectivity is what lets the combinators
//!   below decide which side "won"; a non-selective `plus` is reported
//!   as a [`SelectivityViolation`] wherever it is relied upon.
//!
//! - **times** (`⊗`): extends a route by prepending one edge. The
//!   invalid edge and the invalid route are absorbing: extending
//!   either yields the invalid route.
//!
//! - **Sentinels**: the invalid route (identity for `plus`), the
//!   identity route (the zero-length route) and the invalid edge
//!   (absence of a direct edge).
//!
//! Laws (not enforced by the type system):
//!
//! - `plus(invalid_route, x) == x`
//! - `times(invalid_edge, x, i, j) == invalid_route`
//! - `plus(x, y) ∈ {x, y}`
//!
//! # Combinators
//!
//! - [`lexicographic_product`]: routes are pairs compared on the first
//!   component, falling back to the second on ties.
//! - [`track_paths`]: routes carry the path they were built from,
//!   rejecting cycles and breaking ties on path length.
//!
//! # Provided Algebras
//!
//! - [`MinPlus`]: shortest paths, `(ℕ∪{∞}, min, +)`.
//! - [`MaxMin`]: widest paths, `(ℕ∪{∞}, max, min)`.
//! - [`FRing`]: `min` over ℕ∪{∞} with edge *functions*.
//! - [`Pathological`]: a non-distributive algebra that converges in
//!   a super-linear number of rounds on its generated gadget graphs.

use std::fmt;

use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;

mod fring;
mod lexicographic;
mod path;
mod pathological;
mod paths;
mod primitives;

pub use fring::FRing;
pub use fring::FunctionEdge;
pub use fring::Terminal;
pub use lexicographic::lexicographic_product;
pub use lexicographic::Lexicographic;
pub use lexicographic::Pair;
pub use path::NodeId;
pub use path::Path;
pub use pathological::pathological_adjacency;
pub use pathological::Link;
pub use pathological::Pathological;
pub use paths::track_paths;
pub use paths::TrackPaths;
pub use paths::Tracked;
pub use primitives::MaxMin;
pub use primitives::MinPlus;
pub use primitives::Weight;

/// The `plus` operator of an algebra returned neither of its inputs.
///
/// This invalidates the lexicographic and path-tracking combinators,
/// so it aborts whatever computation observed it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the plus operator of {algebra} is not selective")]
pub struct SelectivityViolation {
    /// Name of the algebra whose `plus` misbehaved.
    pub algebra: String,
}

impl SelectivityViolation {
    /// Report a violation by the named algebra.
    pub fn new(algebra: impl Into<String>) -> Self {
        Self {
            algebra: algebra.into(),
        }
    }
}

/// Errors from parsing user-supplied edge values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EdgeParseError {
    /// The input is not a valid edge value for the algebra.
    #[error("`{input}` is not a valid edge value for {algebra}")]
    Invalid {
        /// The algebra that rejected the input.
        algebra: String,
        /// The rejected input.
        input: String,
    },

    /// A composite algebra received the wrong number of components.
    #[error("{algebra} expects {expected} edge components, got {actual}")]
    ComponentCount {
        /// The composite algebra.
        algebra: String,
        /// Number of components it is built from.
        expected: usize,
        /// Number of components supplied.
        actual: usize,
    },
}

/// A **path algebra**: the route-choice and route-extension operators
/// of a generalized shortest-path problem, together with the metadata
/// an editor needs to let users enter edge values.
///
/// Laws (not enforced by type system):
///
/// - **Selective**: `plus(a, b) ∈ {a, b}`
/// - **Commutative**: `plus(a, b) == plus(b, a)`
/// - **Identity**: `plus(invalid_route(), a) == a`
/// - **Absorbing**: `times(invalid_edge(), a, i, j) == invalid_route()`
///   and `times(e, invalid_route(), i, j) == invalid_route()`
///
/// # Example
///
/// ```rust
/// use path_algebra::MaxMin;
/// use path_algebra::PathAlgebra;
/// use path_algebra::Weight;
///
/// let widest = MaxMin;
/// let one_hop = widest.times(&Weight::Finite(2), &widest.identity_route(), 0, 1);
/// let two_hop = widest.times(&Weight::Finite(7), &Weight::Finite(5), 0, 2);
/// assert_eq!(widest.plus(&one_hop, &two_hop).unwrap(), Weight::Finite(5));
/// ```
pub trait PathAlgebra: Send + Sync {
    /// Route values: the result attached to a source-destination pair.
    type Route: Clone + PartialEq + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Edge values: the weight attached to a directed edge.
    type Edge: Clone
        + PartialEq
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Stable name, used as the catalogue key when saving problems.
    fn name(&self) -> String;

    /// Choose between two routes.
    fn plus(&self, a: &Self::Route, b: &Self::Route)
    -> Result<Self::Route, SelectivityViolation>;

    /// Extend `route` (from `to` onwards) by the edge `from -> to`.
    fn times(&self, edge: &Self::Edge, route: &Self::Route, from: NodeId, to: NodeId)
    -> Self::Route;

    /// The invalid route; identity for `plus`, absorbing for `times`.
    fn invalid_route(&self) -> Self::Route;

    /// The zero-length route from a node to itself.
    fn identity_route(&self) -> Self::Route;

    /// The absence of a direct edge.
    fn invalid_edge(&self) -> Self::Edge;

    /// Value given to new edges and to all edges when the algebra is
    /// selected.
    fn default_edge(&self) -> Self::Edge;

    /// A random edge value; may be the invalid edge.
    fn random_edge(&self, rng: &mut dyn RngCore) -> Self::Edge;

    /// Parse an edge value typed by the user.
    fn parse_edge_input(&self, input: &str) -> Result<Self::Edge, EdgeParseError>;

    /// Whether `input` parses as an edge value.
    fn validate_edge_input(&self, input: &str) -> bool {
        self.parse_edge_input(input).is_ok()
    }

    /// Names of the component algebras. Non-empty for composites,
    /// whose edge values are entered one component at a time.
    fn components(&self) -> Vec<String> {
        Vec::new()
    }

    /// Parse an edge value entered per component.
    fn parse_edge_components(&self, inputs: &[&str]) -> Result<Self::Edge, EdgeParseError> {
        match inputs {
            [input] => self.parse_edge_input(input),
            _ => Err(EdgeParseError::ComponentCount {
                algebra: self.name(),
                expected: 1,
                actual: inputs.len(),
            }),
        }
    }

    /// A cheaper edge value to try when removing an edge changes an
    /// instance's behaviour. `None` when the algebra has no such token.
    fn fallback_edge(&self) -> Option<Self::Edge> {
        None
    }

    /// Fold routes with `plus`, starting from the invalid route.
    ///
    /// Never fails on an empty iterator: it produces `invalid_route()`.
    fn sum<'a, I>(&self, routes: I) -> Result<Self::Route, SelectivityViolation>
    where
        I: IntoIterator<Item = &'a Self::Route>,
        Self::Route: 'a,
    {
        routes
            .into_iter()
            .try_fold(self.invalid_route(), |acc, r| self.plus(&acc, r))
    }

    /// Derived preference: `a` is at least as good as `b` iff
    /// `plus(a, b) == a`.
    fn prefers(&self, a: &Self::Route, b: &Self::Route) -> Result<bool, SelectivityViolation> {
        Ok(self.plus(a, b)? == *a)
    }
}

// Tests
