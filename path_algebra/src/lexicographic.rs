/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Lexicographic product of two algebras.

use std::fmt;

use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;

use super::EdgeParseError;
use super::NodeId;
use super::PathAlgebra;
use super::SelectivityViolation;

/// A pair of component values, used for both routes and edges of a
/// [`Lexicographic`] product.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize
)]
pub struct Pair<X, Y>(pub X, pub Y);

impl<X: fmt::Display, Y: fmt::Display> fmt::Display for Pair<X, Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// The lexicographic product `A ×⃗ B`.
///
/// Routes are compared on their `A` component; the `B` component only
/// breaks ties. `times` acts on each component independently.
///
/// The product relies on `A.plus` being selective: it must be able to
/// tell which side won. If it returns neither input, `plus` fails with
/// [`SelectivityViolation`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lexicographic<A, B> {
    first: A,
    second: B,
}

/// Build the lexicographic product of `first` and `second`.
///
/// # Example
/// ```
/// use path_algebra::lexicographic_product;
/// use path_algebra::MaxMin;
/// use path_algebra::MinPlus;
/// use path_algebra::Pair;
/// use path_algebra::PathAlgebra;
/// use path_algebra::Weight;
///
/// let shortest_widest = lexicographic_product(MaxMin, MinPlus);
/// let wide_long = Pair(Weight::Finite(5), Weight::Finite(9));
/// let wide_short = Pair(Weight::Finite(5), Weight::Finite(2));
/// let narrow = Pair(Weight::Finite(1), Weight::Finite(0));
/// assert_eq!(shortest_widest.plus(&wide_long, &narrow).unwrap(), wide_long);
/// assert_eq!(shortest_widest.plus(&wide_long, &wide_short).unwrap(), wide_short);
/// ```
pub fn lexicographic_product<A, B>(first: A, second: B) -> Lexicographic<A, B>
where
    A: PathAlgebra,
    B: PathAlgebra,
{
    Lexicographic { first, second }
}

impl<A, B> Lexicographic<A, B> {
    /// The dominant component algebra.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The tie-breaking component algebra.
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: PathAlgebra, B: PathAlgebra> PathAlgebra for Lexicographic<A, B> {
    type Route = Pair<A::Route, B::Route>;
    type Edge = Pair<A::Edge, B::Edge>;

    fn name(&self) -> String {
        format!("{}-x-{}", self.first.name(), self.second.name())
    }

    fn plus(&self, a: &Self::Route, b: &Self::Route) -> Result<Self::Route, SelectivityViolation> {
        let s = self.first.plus(&a.0, &b.0)?;
        match (s == a.0, s == b.0) {
            (true, false) => Ok(Pair(s, a.1.clone())),
            (false, true) => Ok(Pair(s, b.1.clone())),
            (true, true) => Ok(Pair(s, self.second.plus(&a.1, &b.1)?)),
            (false, false) => Err(SelectivityViolation::new(self.first.name())),
        }
    }

    fn times(&self, edge: &Self::Edge, route: &Self::Route, from: NodeId, to: NodeId) -> Self::Route {
        Pair(
            self.first.times(&edge.0, &route.0, from, to),
            self.second.times(&edge.1, &route.1, from, to),
        )
    }

    fn invalid_route(&self) -> Self::Route {
        Pair(self.first.invalid_route(), self.second.invalid_route())
    }

    fn identity_route(&self) -> Self::Route {
        Pair(self.first.identity_route(), self.second.identity_route())
    }

    fn invalid_edge(&self) -> Self::Edge {
        Pair(self.first.invalid_edge(), self.second.invalid_edge())
    }

    fn default_edge(&self) -> Self::Edge {
        Pair(self.first.default_edge(), self.second.default_edge())
    }

    fn random_edge(&self, rng: &mut dyn RngCore) -> Self::Edge {
        Pair(self.first.random_edge(rng), self.second.random_edge(rng))
    }

    /// Accepts `a,b` and the display form `(a, b)`.
    fn parse_edge_input(&self, input: &str) -> Result<Self::Edge, EdgeParseError> {
        let trimmed = input.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);
        let parts: Vec<&str> = inner.split(',').collect();
        self.parse_edge_components(&parts)
    }

    fn components(&self) -> Vec<String> {
        vec![self.first.name(), self.second.name()]
    }

    fn parse_edge_components(&self, inputs: &[&str]) -> Result<Self::Edge, EdgeParseError> {
        match inputs {
            [a, b] => Ok(Pair(
                self.first.parse_edge_input(a)?,
                self.second.parse_edge_input(b)?,
            )),
            _ => Err(EdgeParseError::ComponentCount {
                algebra: self.name(),
                expected: 2,
                actual: inputs.len(),
            }),
        }
    }

    fn fallback_edge(&self) -> Option<Self::Edge> {
        Some(Pair(self.first.fallback_edge()?, self.second.fallback_edge()?))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::MaxMin;
    use crate::MinPlus;
    use crate::Weight;

    fn shortest_widest() -> Lexicographic<MaxMin, MinPlus> {
        lexicographic_product(MaxMin, MinPlus)
    }

    fn weight() -> impl Strategy<Value = Weight> {
        prop_oneof![
            (0u64..20).prop_map(Weight::Finite),
            Just(Weight::Infinite),
        ]
    }

    #[test]
    fn name_joins_components() {
        assert_eq!(shortest_widest().name(), "(N, max, min)-x-(N, min, +)");
        assert_eq!(
            shortest_widest().components(),
            vec!["(N, max, min)".to_string(), "(N, min, +)".to_string()]
        );
    }

    #[test]
    fn first_component_dominates() {
        let a = Pair(Weight::Finite(3), Weight::Finite(100));
        let b = Pair(Weight::Finite(2), Weight::Finite(1));
        assert_eq!(shortest_widest().plus(&a, &b), Ok(a));
        assert_eq!(shortest_widest().plus(&b, &a), Ok(a));
    }

    #[test]
    fn second_component_breaks_ties() {
        let a = Pair(Weight::Finite(3), Weight::Finite(100));
        let b = Pair(Weight::Finite(3), Weight::Finite(1));
        assert_eq!(shortest_widest().plus(&a, &b), Ok(b));
    }

    #[test]
    fn times_is_componentwise() {
        let sw = shortest_widest();
        let e = Pair(Weight::Finite(4), Weight::Finite(2));
        let r = Pair(Weight::Finite(7), Weight::Finite(5));
        assert_eq!(sw.times(&e, &r, 0, 1), Pair(Weight::Finite(4), Weight::Finite(7)));
    }

    #[test]
    fn sentinels_are_pairs() {
        let sw = shortest_widest();
        assert_eq!(sw.invalid_route(), Pair(Weight::Finite(0), Weight::Infinite));
        assert_eq!(sw.identity_route(), Pair(Weight::Infinite, Weight::Finite(0)));
        assert_eq!(sw.default_edge(), Pair(Weight::Finite(2), Weight::Finite(1)));
        assert_eq!(sw.fallback_edge(), None);
    }

    #[test]
    fn parses_per_component() {
        let sw = shortest_widest();
        let expected = Pair(Weight::Finite(3), Weight::Finite(4));
        assert_eq!(sw.parse_edge_input("3,4"), Ok(expected));
        assert_eq!(sw.parse_edge_input("(3, 4)"), Ok(expected));
        assert_eq!(sw.parse_edge_components(&["3", "4"]), Ok(expected));
        assert!(!sw.validate_edge_input("3"));
        assert!(!sw.validate_edge_input("3,x"));
        assert_eq!(sw.parse_edge_input(&expected.to_string()), Ok(expected));
    }

    proptest! {
        #[test]
        fn plus_is_selective(a0 in weight(), a1 in weight(), b0 in weight(), b1 in weight()) {
            let (a, b) = (Pair(a0, a1), Pair(b0, b1));
            let r = shortest_widest().plus(&a, &b).unwrap();
            prop_assert!(r == a || r == b);
            prop_assert_eq!(r, shortest_widest().plus(&b, &a).unwrap());
        }

        #[test]
        fn invalid_route_is_identity(a0 in weight(), a1 in weight()) {
            let sw = shortest_widest();
            let a = Pair(a0, a1);
            prop_assert_eq!(sw.plus(&sw.invalid_route(), &a).unwrap(), a);
            prop_assert_eq!(sw.times(&sw.invalid_edge(), &a, 0, 1), sw.invalid_route());
        }
    }
}
