/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use path_algebra::NodeId;
use path_algebra::Path;
use path_algebra::SelectivityViolation;
use routing::Graph;
use routing::GraphError;

use crate::order::OrderError;
use crate::order::PathPartialOrder;
use crate::score;
use crate::symmetry;
use crate::symmetry::SymmetrySearch;

#[derive(Debug, thiserror::Error)]
pub enum OrderSearchError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Selectivity(#[from] SelectivityViolation),
}

/// The slowest-converging path order found for one sink.
#[derive(Debug, Clone)]
pub struct OrderSearchOutcome {
    /// Sink-column rounds under `order`.
    pub rounds: usize,
    pub converged: bool,
    pub order: PathPartialOrder,
    /// Every explicit assertion, oldest first. Replaying these on a
    /// fresh order over the same paths rebuilds `order`.
    pub assertions: Vec<(Path, Path)>,
    /// Rounds of the full solver run with `order` as its preference.
    pub solver_rounds: usize,
    /// Leaf orders scored.
    pub leaves: usize,
}

/// Search the path orders over simple paths to `sink` for the one
/// whose sink column converges slowest.
///
/// `cancelled` is polled between leaves and between scoring branches.
/// A cancelled search returns the best outcome found so far, which is
/// `None` if no leaf was scored.
pub fn search_orderings<E>(
    graph: &Graph<E>,
    sink: NodeId,
    cap: Option<usize>,
    cancelled: &dyn Fn() -> bool,
) -> Result<Option<OrderSearchOutcome>, OrderSearchError> {
    let paths = graph.simple_paths_to(sink)?;
    let order = PathPartialOrder::new(paths);
    let groups = symmetry::initial_groups(graph, sink);
    tracing::info!(
        nodes = graph.len(),
        sink,
        paths = order.len(),
        groups = groups.len(),
        "starting path order search"
    );

    let mut best: Option<score::LeafScore> = None;
    let mut leaves = 0;
    let mut search = SymmetrySearch::new(order, groups);
    for leaf in search.by_ref() {
        if cancelled() {
            tracing::info!(leaves, "path order search cancelled");
            break;
        }
        let leaf = leaf?;
        leaves += 1;
        let Some(scored) = score::score_leaf(leaf, graph, sink, cap, cancelled)? else {
            continue;
        };
        if best.as_ref().map_or(true, |b| scored.rounds > b.rounds) {
            tracing::info!(rounds = scored.rounds, leaves, "new slowest path order");
            best = Some(scored);
        }
    }
    tracing::debug!(expanded = search.expanded(), leaves, "path order search finished");

    let Some(best) = best else {
        return Ok(None);
    };
    let assertions = best.order.assertions();
    let solution = score::evaluate(best.order.clone(), graph, cap)?;
    Ok(Some(OrderSearchOutcome {
        rounds: best.rounds,
        converged: best.converged,
        order: best.order,
        assertions,
        solver_rounds: solution.rounds(),
        leaves,
    }))
}
