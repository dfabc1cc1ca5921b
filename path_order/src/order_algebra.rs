/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::sync::Arc;

use path_algebra::EdgeParseError;
use path_algebra::Link;
use path_algebra::NodeId;
use path_algebra::Path;
use path_algebra::PathAlgebra;
use path_algebra::SelectivityViolation;
use rand::RngCore;

use crate::order::PathPartialOrder;
use crate::order::Related;

/// A route of an [`OrderAlgebra`]: the full path including its
/// destination.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrderRoute {
    Invalid,
    Route(Path),
}

impl OrderRoute {
    pub fn path(&self) -> Option<&Path> {
        match self {
            OrderRoute::Invalid => None,
            OrderRoute::Route(p) => Some(p),
        }
    }
}

impl fmt::Display for OrderRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRoute::Invalid => write!(f, "invalid"),
            OrderRoute::Route(p) => write!(f, "{}", p),
        }
    }
}

/// The algebra whose preference is a path partial order: `plus` picks
/// the path known to be smaller. Pairs the order does not decide fall
/// back to the shorter path, then the smaller one, which keeps `plus`
/// selective and commutative.
///
/// Edges only record presence.
#[derive(Clone, Debug)]
pub struct OrderAlgebra {
    name: String,
    order: Arc<PathPartialOrder>,
}

impl OrderAlgebra {
    pub fn new(name: impl Into<String>, order: PathPartialOrder) -> Self {
        Self {
            name: name.into(),
            order: Arc::new(order),
        }
    }

    pub fn order(&self) -> &PathPartialOrder {
        &self.order
    }

    fn tie_break<'a>(p: &'a Path, q: &'a Path) -> bool {
        (p.len(), p) <= (q.len(), q)
    }
}

impl PathAlgebra for OrderAlgebra {
    type Route = OrderRoute;
    type Edge = Link;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn plus(&self, a: &OrderRoute, b: &OrderRoute) -> Result<OrderRoute, SelectivityViolation> {
        let (p, q) = match (a, b) {
            (OrderRoute::Invalid, _) => return Ok(b.clone()),
            (_, OrderRoute::Invalid) => return Ok(a.clone()),
            (OrderRoute::Route(p), OrderRoute::Route(q)) => (p, q),
        };
        let a_wins = match self.order.relation(p, q) {
            Ok(Related::LessThan) | Ok(Related::EqualTo) => true,
            Ok(Related::GreaterThan) => false,
            Ok(Related::Unknown) | Err(_) => Self::tie_break(p, q),
        };
        Ok(if a_wins { a.clone() } else { b.clone() })
    }

    fn times(&self, edge: &Link, route: &OrderRoute, from: NodeId, to: NodeId) -> OrderRoute {
        match route {
            OrderRoute::Route(path) if *edge == Link::Present && !path.contains(from) => {
                if path.is_empty() {
                    OrderRoute::Route(Path::from(vec![from, to]))
                } else {
                    OrderRoute::Route(path.prepend(from))
                }
            }
            _ => OrderRoute::Invalid,
        }
    }

    fn invalid_route(&self) -> OrderRoute {
        OrderRoute::Invalid
    }

    fn identity_route(&self) -> OrderRoute {
        OrderRoute::Route(Path::empty())
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
