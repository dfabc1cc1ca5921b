/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A deliberately badly behaved algebra.
//!
//! [`Pathological`] violates distributivity on purpose. On the gadget
//! graphs built by [`pathological_adjacency`] the sink column keeps
//! changing for many more rounds than the number of nodes, which makes
//! it a useful worst case for the solver's iteration cap and for the
//! searches.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;

use super::EdgeParseError;
use super::NodeId;
use super::Path;
use super::PathAlgebra;
use super::SelectivityViolation;
use super::Tracked;

/// An edge that is either present or absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Link {
    /// No edge.
    Absent,
    /// An edge, written `e`.
    Present,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Absent => write!(f, "-"),
            Link::Present => write!(f, "e"),
        }
    }
}

/// Parse error for [`Link`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid link `{0}`")]
pub struct ParseLinkError(String);

impl FromStr for Link {
    type Err = ParseLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "e" => Ok(Link::Present),
            "-" => Ok(Link::Absent),
            _ => Err(ParseLinkError(s.to_string())),
        }
    }
}

impl From<Link> for String {
    fn from(l: Link) -> String {
        l.to_string()
    }
}

impl TryFrom<String> for Link {
    type Error = ParseLinkError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Routes are `(label, path)` where the label is the node that first
/// left the sink, and the path includes the destination.
///
/// - `plus`: lower label, then shorter path, then smaller path.
/// - `times`: prepends the node, but blocks specific extensions so
///   that the gadget's best routes keep being displaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pathological;

impl PathAlgebra for Pathological {
    type Route = Tracked<NodeId>;
    type Edge = Link;

    fn name(&self) -> String {
        "Pathological".to_string()
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
        let a_wins = (x, p.len(), p) < (y, q.len(), q);
        Ok(if a_wins { a.clone() } else { b.clone() })
    }

    fn times(&self, edge: &Link, route: &Self::Route, from: NodeId, to: NodeId) -> Self::Route {
        let Tracked::Route { value: label, path } = route else {
            return Tracked::Invalid;
        };
        if *edge == Link::Absent || path.contains(from) {
            return Tracked::Invalid;
        }

        let nodes = path.nodes();

        // Distributivity violation.
        if to % 2 == 0 && to > 0 && nodes == [to, to - 1, 0] {
            return Tracked::Invalid;
        }

        // Block routes from the gadget leg.
        if to % 2 == 1 && nodes == [to, 0] && from != to + 1 {
            return Tracked::Invalid;
        }

        // Only accept routes from the preceding neighbour once past the gadget.
        if nodes.len() > 2 {
            let preceding = from.checked_sub(1) == Some(to);
            let follows_second_last = from == nodes[nodes.len() - 2] + 1;
            if !preceding && !follows_second_last {
                return Tracked::Invalid;
            }
        }

        let label = if to == 0 { from } else { *label };
        let path = if path.is_empty() {
            Path::from(vec![from, to])
        } else {
            path.prepend(from)
        };
        Tracked::Route { value: label, path }
    }

    fn invalid_route(&self) -> Self::Route {
        Tracked::Invalid
    }

    fn identity_route(&self) -> Self::Route {
        Tracked::Route {
            value: 0,
            path: Path::empty(),
        }
    }

    fn invalid_edge(&self) -> Link {
        Link::Absent
    }

    fn default_edge(&self) -> Link {
        Link::Present
    }

    fn random_edge(&self, _rng: &mut dyn RngCore) -> Link {
        Link::Present
    }

    fn parse_edge_input(&self, input: &str) -> Result<Link, EdgeParseError> {
        match input.trim() {
            "e" => Ok(Link::Present),
            _ => Err(EdgeParseError::Invalid {
                algebra: self.name(),
                input: input.to_string(),
            }),
        }
    }
}

/// The gadget graph on `n` nodes on which [`Pathological`] converges
/// slowly. Entry `[i][j]` is the edge `i -> j`; node 0 is the sink.
pub fn pathological_adjacency(n: usize) -> Vec<Vec<Link>> {
    let mut m = vec![vec![Link::Absent; n]; n];
    if n == 0 {
        return m;
    }
    let prev = |i: usize| (i + n - 1) % n;

    // Distributivity violations.
    for i in (0..n).step_by(2) {
        m[i][0] = Link::Present;
        m[prev(i)][0] = Link::Present;
        m[i][prev(i)] = Link::Present;
    }

    // Initial violation spreading links.
    for i in (2..n).step_by(2) {
        for j in i + 1..n {
            m[j][i] = Link::Present;
        }
    }

    // Violation circulation links.
    for i in (2..n).step_by(2) {
        for j in i + 1..n {
            if j != n - 1 {
                m[j + 1][j] = Link::Present;
            } else {
                m[i + 1][j] = Link::Present;
            }
        }
    }

    m
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn route(label: NodeId, path: Vec<NodeId>) -> Tracked<NodeId> {
        Tracked::Route {
            value: label,
            path: Path::from(path),
        }
    }

    #[test]
    fn leaving_the_sink_sets_the_label() {
        let a = Pathological;
        assert_eq!(a.times(&Link::Present, &a.identity_route(), 3, 0), route(3, vec![3, 0]));
        assert_eq!(a.times(&Link::Absent, &a.identity_route(), 3, 0), Tracked::Invalid);
    }

    #[test]
    fn plus_orders_by_label_then_length_then_path() {
        let a = Pathological;
        assert_eq!(
            a.plus(&route(2, vec![1, 0]), &route(1, vec![4, 3, 0])),
            Ok(route(1, vec![4, 3, 0]))
        );
        assert_eq!(
            a.plus(&route(1, vec![1, 2, 0]), &route(1, vec![3, 0])),
            Ok(route(1, vec![3, 0]))
        );
        assert_eq!(
            a.plus(&route(1, vec![2, 0]), &route(1, vec![3, 0])),
            Ok(route(1, vec![2, 0]))
        );
    }

    #[test]
    fn blocks_distributivity_violation() {
        let a = Pathological;
        // Extending (2,1,0) across the edge into node 2 is refused.
        assert_eq!(a.times(&Link::Present, &route(1, vec![2, 1, 0]), 3, 2), Tracked::Invalid);
    }

    #[test]
    fn blocks_gadget_leg_except_successor() {
        let a = Pathological;
        let leg = route(3, vec![3, 0]);
        assert_eq!(a.times(&Link::Present, &leg, 5, 3), Tracked::Invalid);
        assert_eq!(a.times(&Link::Present, &leg, 4, 3), route(3, vec![4, 3, 0]));
    }

    #[test]
    fn adjacency_has_gadget_edges() {
        let m = pathological_adjacency(6);
        assert_eq!(m[0][0], Link::Present);
        assert_eq!(m[5][0], Link::Present);
        assert_eq!(m[0][5], Link::Present);
        assert_eq!(m[2][1], Link::Present);
        assert_eq!(m[3][2], Link::Present);
        assert_eq!(m[4][3], Link::Present);
        assert_eq!(m[3][5], Link::Present);
        assert_eq!(m[1][2], Link::Absent);
        assert!(pathological_adjacency(0).is_empty());
    }

    #[test]
    fn only_e_is_an_edge_input() {
        assert!(Pathological.validate_edge_input("e"));
        assert!(!Pathological.validate_edge_input("1"));
    }

    fn any_route() -> impl Strategy<Value = Tracked<NodeId>> {
        prop_oneof![
            1 => Just(Tracked::Invalid),
            6 => (0usize..4, prop::collection::vec(0usize..6, 0..5)).prop_map(|(l, p)| route(l, p)),
        ]
    }

    proptest! {
        #[test]
        fn plus_is_selective_and_commutative(a in any_route(), b in any_route()) {
            let alg = Pathological;
            let r = alg.plus(&a, &b).unwrap();
            prop_assert!(r == a || r == b);
            prop_assert_eq!(r, alg.plus(&b, &a).unwrap());
        }

        #[test]
        fn invalid_route_is_plus_identity(a in any_route()) {
            let alg = Pathological;
            prop_assert_eq!(alg.plus(&alg.invalid_route(), &a).unwrap(), a.clone());
            prop_assert_eq!(alg.plus(&a, &alg.invalid_route()).unwrap(), a);
        }
    }
}
