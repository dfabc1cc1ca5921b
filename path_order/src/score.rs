/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Scoring a (possibly partial) path order by how long the sink
//! column takes to converge under it.
//!
//! Whenever relaxation compares two routes the order does not decide,
//! the computation forks: one branch asserts each outcome. Every
//! branch owns its own order and rows, so branches live on an
//! explicit stack and no state is shared between them.

use path_algebra::Link;
use path_algebra::NodeId;
use path_algebra::Path;
use path_algebra::SelectivityViolation;
use routing::matrix;
use routing::Graph;
use routing::Solution;

use crate::order::OrderError;
use crate::order::PathPartialOrder;
use crate::order::Related;
use crate::order_algebra::OrderAlgebra;
use crate::order_algebra::OrderRoute;

/// The slowest refinement found below one leaf order.
#[derive(Debug, Clone)]
pub struct LeafScore {
    /// Relaxation rounds until the sink column stopped changing, or
    /// until the cap was reached.
    pub rounds: usize,
    pub converged: bool,
    /// The refined order that produced `rounds`.
    pub order: PathPartialOrder,
}

/// Sink column of one relaxation: the chosen path for every node.
type Row = Vec<Option<Path>>;

struct Branch {
    order: PathPartialOrder,
    previous: Row,
    /// Partially computed next row.
    current: Row,
    rounds: usize,
}

/// Explore every refinement of `order` the relaxation forces and
/// return the one that converges slowest. Ties keep the first
/// refinement found. `cap` bounds the history length the way
/// [`matrix::solve`] does.
///
/// `cancelled` is polled between branches; when it returns true the
/// best score so far is returned.
pub fn score_leaf<E>(
    order: PathPartialOrder,
    graph: &Graph<E>,
    sink: NodeId,
    cap: Option<usize>,
    cancelled: &dyn Fn() -> bool,
) -> Result<Option<LeafScore>, OrderError> {
    let n = graph.len();
    let cap = cap.unwrap_or_else(|| matrix::default_cap(n)).max(2);

    let identity: Row = graph
        .nodes()
        .map(|i| (i == sink).then(|| Path::singleton(sink)))
        .collect();
    let mut stack = vec![Branch {
        order,
        previous: identity,
        current: Vec::with_capacity(n),
        rounds: 0,
    }];
    let mut best: Option<LeafScore> = None;

    'branches: while let Some(mut branch) = stack.pop() {
        if cancelled() {
            break;
        }
        while branch.current.len() < n {
            let i = branch.current.len();
            let mut chosen = (i == sink).then(|| Path::singleton(sink));
            for k in graph.nodes() {
                let candidate = match &branch.previous[k] {
                    Some(path) if graph.has_edge(i, k) && !path.contains(i) => path.prepend(i),
                    _ => continue,
                };
                let Some(incumbent) = &chosen else {
                    chosen = Some(candidate);
                    continue;
                };
                match branch.order.relation(incumbent, &candidate)? {
                    Related::LessThan | Related::EqualTo => {}
                    Related::GreaterThan => chosen = Some(candidate),
                    Related::Unknown => {
                        let mut prefer_candidate = branch.order.clone();
                        prefer_candidate.assert_order(&candidate, incumbent)?;
                        let incumbent = incumbent.clone();
                        stack.push(Branch {
                            order: prefer_candidate,
                            previous: branch.previous.clone(),
                            current: branch.current.clone(),
                            rounds: branch.rounds,
                        });
                        branch.order.assert_order(&incumbent, &candidate)?;
                        stack.push(branch);
                        continue 'branches;
                    }
                }
            }
            branch.current.push(chosen);
        }

        let converged = branch.current == branch.previous;
        if converged || branch.rounds + 2 >= cap {
            if best.as_ref().map_or(true, |b| branch.rounds > b.rounds) {
                tracing::debug!(rounds = branch.rounds, converged, "leaf refinement scored");
                best = Some(LeafScore {
                    rounds: branch.rounds,
                    converged,
                    order: branch.order,
                });
            }
            continue;
        }
        stack.push(Branch {
            order: branch.order,
            previous: branch.current,
            current: Vec::with_capacity(n),
            rounds: branch.rounds + 1,
        });
    }
    Ok(best)
}

/// Solve the whole routing problem on `graph` with `order` as the
/// preference.
pub fn evaluate<E>(
    order: PathPartialOrder,
    graph: &Graph<E>,
    cap: Option<usize>,
) -> Result<Solution<OrderRoute>, SelectivityViolation> {
    let algebra = OrderAlgebra::new("Path order", order);
    let links = graph.map_edges(|_| Link::Present);
    let identity = matrix::create_identity_matrix(&algebra, links.len());
    let adjacency = matrix::create_adjacency_matrix(&algebra, &links);
    matrix::solve(&algebra, &identity, &adjacency, cap)
}
