/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Generalized Bellman-Ford over an arbitrary [`PathAlgebra`].
//!
//! All-pairs state is retained so that the displayed source column is
//! always a projection, and the source can change without recomputing.

use path_algebra::NodeId;
use path_algebra::PathAlgebra;
use path_algebra::SelectivityViolation;

use crate::graph::Graph;

/// A square matrix, row-major. Entry `[i][j]` concerns routes from
/// `i` to `j` (or the edge `i -> j` for adjacency matrices).
pub type Matrix<T> = Vec<Vec<T>>;

/// The default iteration cap for `n` nodes: `n²`, but never less than
/// the two states needed to observe convergence.
pub fn default_cap(n: usize) -> usize {
    n.saturating_mul(n).max(2)
}

/// Identity route on the diagonal, invalid route elsewhere.
pub fn create_identity_matrix<A: PathAlgebra>(algebra: &A, n: usize) -> Matrix<A::Route> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        algebra.identity_route()
                    } else {
                        algebra.invalid_route()
                    }
                })
                .collect()
        })
        .collect()
}

/// Edge weights of `graph`, the invalid edge where there is none.
pub fn create_adjacency_matrix<A: PathAlgebra>(
    algebra: &A,
    graph: &Graph<A::Edge>,
) -> Matrix<A::Edge> {
    let n = graph.len();
    let mut m = vec![vec![algebra.invalid_edge(); n]; n];
    for (from, to, weight) in graph.edges() {
        m[from][to] = weight.clone();
    }
    m
}

/// One synchronous relaxation round over all pairs:
///
/// ```text
/// next[i][j] = ⊕_k (adjacency[i][k] ⊗ state[k][j])  ⊕  identity[i][j]
/// ```
pub fn iterate<A: PathAlgebra>(
    algebra: &A,
    state: &Matrix<A::Route>,
    identity: &Matrix<A::Route>,
    adjacency: &Matrix<A::Edge>,
) -> Result<Matrix<A::Route>, SelectivityViolation> {
    let n = state.len();
    let mut next = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(n);
        for j in 0..n {
            let mut best = identity[i][j].clone();
            for k in 0..n {
                let candidate = algebra.times(&adjacency[i][k], &state[k][j], i, k);
                best = algebra.plus(&candidate, &best)?;
            }
            row.push(best);
        }
        next.push(row);
    }
    Ok(next)
}

/// The full history of a computation, starting at the identity matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<R> {
    pub history: Vec<Matrix<R>>,
    pub converged: bool,
}

impl<R> Solution<R> {
    /// Rounds until the state stopped changing: the number of states
    /// before the repeated one, less the initial state.
    pub fn convergence_time(&self) -> Option<usize> {
        self.converged.then(|| self.history.len() - 2)
    }

    /// Rounds computed; equals the convergence time when converged.
    pub fn rounds(&self) -> usize {
        self.history.len().saturating_sub(2)
    }

    pub fn last(&self) -> Option<&Matrix<R>> {
        self.history.last()
    }
}

/// Iterate from `identity` until two consecutive states are equal or
/// the history holds `cap` states. `cap` defaults to [`default_cap`].
///
/// Running out of budget is not an error; it is reported as
/// `converged == false`.
pub fn solve<A: PathAlgebra>(
    algebra: &A,
    identity: &Matrix<A::Route>,
    adjacency: &Matrix<A::Edge>,
    cap: Option<usize>,
) -> Result<Solution<A::Route>, SelectivityViolation> {
    let cap = cap.unwrap_or_else(|| default_cap(identity.len())).max(2);
    let mut history = vec![identity.clone()];
    history.push(iterate(algebra, identity, identity, adjacency)?);
    loop {
        let converged = is_converged(&history);
        if converged {
            tracing::debug!(
                algebra = algebra.name(),
                rounds = history.len() - 2,
                "solve converged"
            );
            return Ok(Solution { history, converged });
        }
        if history.len() >= cap {
            tracing::warn!(
                algebra = algebra.name(),
                states = history.len(),
                cap,
                "solve stopped at the iteration cap without converging"
            );
            return Ok(Solution { history, converged });
        }
        let next = iterate(algebra, &history[history.len() - 1], identity, adjacency)?;
        history.push(next);
    }
}

/// Whether the last two states of `history` are equal.
pub fn is_converged<R: PartialEq>(history: &[Matrix<R>]) -> bool {
    match history {
        [.., a, b] => a == b,
        _ => false,
    }
}

/// Column `source` of `state`: the route from every node to `source`.
pub fn column<R: Clone>(state: &Matrix<R>, source: NodeId) -> Vec<R> {
    state.iter().map(|row| row[source].clone()).collect()
}
