/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Path-tracking augmentation of an algebra.

use std::fmt;

use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;

use super::EdgeParseError;
use super::NodeId;
use super::Path;
use super::PathAlgebra;
use super::SelectivityViolation;

/// A route value paired with the path it was built along, or the
/// invalid route.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tracked<R> {
    /// No route.
    Invalid,
    /// A route with its path, most recently added node first.
    Route {
        /// The underlying route value.
        value: R,
        /// Nodes visited, most recent first.
        path: Path,
    },
}

impl<R> Tracked<R> {
    /// The underlying value, if any.
    pub fn value(&self) -> Option<&R> {
        match self {
            Tracked::Invalid => None,
            Tracked::Route { value, .. } => Some(value),
        }
    }

    /// The path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Tracked::Invalid => None,
            Tracked::Route { path, .. } => Some(path),
        }
    }

    /// Whether this is the invalid route.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Tracked::Invalid)
    }
}

impl<R: fmt::Display> fmt::Display for Tracked<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tracked::Invalid => write!(f, "invalid"),
            Tracked::Route { value, path } => write!(f, "{} {}", value, path),
        }
    }
}

/// An algebra `A` augmented with the path each route follows.
///
/// - `times` refuses to revisit a node, so only simple paths are
///   built.
/// - `plus` defers to `A.plus` when the base values differ, and
///   otherwise prefers the shorter path, then the lexicographically
///   smaller one. The tie-break is deterministic so that saved
///   problems re-solve identically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackPaths<A> {
    base: A,
}

/// Augment `base` with path tracking.
///
/// # Example
/// ```
/// use path_algebra::track_paths;
/// use path_algebra::MinPlus;
/// use path_algebra::PathAlgebra;
/// use path_algebra::Tracked;
/// use path_algebra::Weight;
///
/// let a = track_paths(MinPlus);
/// let r = a.times(&Weight::Finite(2), &a.identity_route(), 1, 0);
/// assert_eq!(r.value(), Some(&Weight::Finite(2)));
/// assert_eq!(r.path().unwrap().nodes(), &[1]);
/// // Revisiting node 1 is rejected.
/// assert_eq!(a.times(&Weight::Finite(2), &r, 1, 1), Tracked::Invalid);
/// ```
pub fn track_paths<A: PathAlgebra>(base: A) -> TrackPaths<A> {
    TrackPaths { base }
}

impl<A: PathAlgebra> TrackPaths<A> {
    /// The underlying algebra.
    pub fn base(&self) -> &A {
        &self.base
    }

    /// Drop the path, mapping the invalid route to `A`'s invalid route.
    pub fn project(&self, route: &Tracked<A::Route>) -> A::Route {
        match route {
            Tracked::Invalid => self.base.invalid_route(),
            Tracked::Route { value, .. } => value.clone(),
        }
    }
}

impl<A: PathAlgebra> PathAlgebra for TrackPaths<A> {
    type Route = Tracked<A::Route>;
    type Edge = A::Edge;

    fn name(&self) -> String {
        format!("{} + paths", self.base.name())
    }

    fn plus(&self, a: &Self::Route, b: &Self::Route) -> Result<Self::Route, SelectivityViolation> {
        let (x, p, y, q) = match (a, b) {
            (Tracked::Invalid, _) => return Ok(b.clone()),
            (_, Tracked::Invalid) => return Ok(a.clone()),
            (
                Tracked::Route { value: x, path: p },
                Tracked::Route { value: y, path: q },
            ) => (x, p, y, q),
        };

        if x == y {
            let a_wins = (p.len(), p) <= (q.len(), q);
            return Ok(if a_wins { a.clone() } else { b.clone() });
        }

        let r = self.base.plus(x, y)?;
        if r == *x {
            Ok(a.clone())
        } else if r == *y {
            Ok(b.clone())
        } else {
            Err(SelectivityViolation::new(self.base.name()))
        }
    }

    fn times(&self, edge: &Self::Edge, route: &Self::Route, from: NodeId, to: NodeId) -> Self::Route {
        let Tracked::Route { value, path } = route else {
            return Tracked::Invalid;
        };
        if path.contains(from) || *edge == self.base.invalid_edge() {
            return Tracked::Invalid;
        }
        let extended = self.base.times(edge, value, from, to);
        if extended == self.base.invalid_route() {
            return Tracked::Invalid;
        }
        Tracked::Route {
            value: extended,
            path: path.prepend(from),
        }
    }

    fn invalid_route(&self) -> Self::Route {
        Tracked::Invalid
    }

    fn identity_route(&self) -> Self::Route {
        Tracked::Route {
            value: self.base.identity_route(),
            path: Path::empty(),
        }
    }

    fn invalid_edge(&self) -> Self::Edge {
        self.base.invalid_edge()
    }

    fn default_edge(&self) -> Self::Edge {
        self.base.default_edge()
    }

    fn random_edge(&self, rng: &mut dyn RngCore) -> Self::Edge {
        self.base.random_edge(rng)
    }

    fn parse_edge_input(&self, input: &str) -> Result<Self::Edge, EdgeParseError> {
        self.base.parse_edge_input(input)
    }

    fn components(&self) -> Vec<String> {
        self.base.components()
    }

    fn parse_edge_components(&self, inputs: &[&str]) -> Result<Self::Edge, EdgeParseError> {
        self.base.parse_edge_components(inputs)
    }

    fn fallback_edge(&self) -> Option<Self::Edge> {
        self.base.fallback_edge()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::lexicographic_product;
    use crate::MinPlus;
    use crate::Pair;
    use crate::Weight;

    fn route(w: u64, path: Vec<NodeId>) -> Tracked<Weight> {
        Tracked::Route {
            value: Weight::Finite(w),
            path: Path::from(path),
        }
    }

    #[test]
    fn base_value_decides_first() {
        let a = track_paths(MinPlus);
        let short_heavy = route(9, vec![1]);
        let long_light = route(2, vec![1, 2, 3]);
        assert_eq!(a.plus(&short_heavy, &long_light), Ok(long_light.clone()));
        assert_eq!(a.plus(&long_light, &short_heavy), Ok(long_light));
    }

    #[test]
    fn shorter_path_breaks_ties() {
        let a = track_paths(MinPlus);
        let short = route(2, vec![3]);
        let long = route(2, vec![1, 2]);
        assert_eq!(a.plus(&long, &short), Ok(short.clone()));
        assert_eq!(a.plus(&short, &long), Ok(short));
    }

    #[test]
    fn smaller_path_breaks_length_ties() {
        let a = track_paths(MinPlus);
        let p = route(2, vec![1, 4]);
        let q = route(2, vec![2, 3]);
        assert_eq!(a.plus(&q, &p), Ok(p.clone()));
        assert_eq!(a.plus(&p, &q), Ok(p));
    }

    #[test]
    fn invalid_is_identity_and_absorbing() {
        let a = track_paths(MinPlus);
        let r = route(1, vec![0]);
        assert_eq!(a.plus(&Tracked::Invalid, &r), Ok(r.clone()));
        assert_eq!(a.plus(&r, &Tracked::Invalid), Ok(r.clone()));
        assert_eq!(a.times(&Weight::Finite(1), &Tracked::Invalid, 2, 0), Tracked::Invalid);
        assert_eq!(a.times(&a.invalid_edge(), &r, 2, 0), Tracked::Invalid);
    }

    #[test]
    fn times_rejects_cycles() {
        let a = track_paths(MinPlus);
        let r = route(1, vec![2, 0]);
        assert_eq!(a.times(&Weight::Finite(1), &r, 2, 2), Tracked::Invalid);
        assert_eq!(a.times(&Weight::Finite(1), &r, 3, 2), route(2, vec![3, 2, 0]));
    }

    #[test]
    fn identity_carries_empty_path() {
        let a = track_paths(MinPlus);
        assert_eq!(a.identity_route(), route(0, vec![]));
        assert_eq!(a.name(), "(N, min, +) + paths");
    }

    #[test]
    fn composes_with_lexicographic_product() {
        let a = track_paths(lexicographic_product(crate::MaxMin, MinPlus));
        assert_eq!(a.components().len(), 2);
        let e = a.parse_edge_input("3,1").unwrap();
        let r = a.times(&e, &a.identity_route(), 1, 0);
        assert_eq!(r.value(), Some(&Pair(Weight::Finite(3), Weight::Finite(1))));
    }

    #[test]
    fn project_drops_paths() {
        let a = track_paths(MinPlus);
        assert_eq!(a.project(&route(4, vec![1])), Weight::Finite(4));
        assert_eq!(a.project(&Tracked::Invalid), Weight::Infinite);
    }

    proptest! {
        #[test]
        fn plus_is_selective_and_commutative(
            x in 0u64..4, p in prop::collection::vec(0usize..5, 0..4),
            y in 0u64..4, q in prop::collection::vec(0usize..5, 0..4),
        ) {
            let a = track_paths(MinPlus);
            let (u, v) = (route(x, p), route(y, q));
            let r = a.plus(&u, &v).unwrap();
            prop_assert!(r == u || r == v);
            prop_assert_eq!(r, a.plus(&v, &u).unwrap());
        }
    }
}
