/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Worst-case search by random sampling.
//!
//! Random adjacency matrices are scored by their rounds to
//! convergence. Whenever a sample beats the best score so far it is
//! simplified edge by edge, the slowest source is located, and the
//! result is handed out as a [`Candidate`].

use path_algebra::NodeId;
use path_algebra::PathAlgebra;
use path_algebra::SelectivityViolation;
use rand::RngCore;

use crate::matrix;
use crate::matrix::Matrix;

/// A slow instance found by the search. `None` entries are absent
/// edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<E> {
    pub adjacency: Matrix<Option<E>>,
    pub source: NodeId,
    pub score: usize,
}

/// An `n × n` matrix with invalid edges on the diagonal and random
/// edges elsewhere.
pub fn random_adjacency<A: PathAlgebra>(
    algebra: &A,
    n: usize,
    rng: &mut dyn RngCore,
) -> Matrix<A::Edge> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        algebra.invalid_edge()
                    } else {
                        algebra.random_edge(rng)
                    }
                })
                .collect()
        })
        .collect()
}

/// Rounds to convergence of `adjacency`, or the rounds computed before
/// the cap was reached.
pub fn score<A: PathAlgebra>(
    algebra: &A,
    adjacency: &Matrix<A::Edge>,
    cap: Option<usize>,
) -> Result<usize, SelectivityViolation> {
    let identity = matrix::create_identity_matrix(algebra, adjacency.len());
    Ok(matrix::solve(algebra, &identity, adjacency, cap)?.rounds())
}

/// Remove every edge whose removal does not lower the score. When it
/// does, try the algebra's fallback edge instead before giving up on
/// that edge.
pub fn simplify<A: PathAlgebra>(
    algebra: &A,
    adjacency: &mut Matrix<A::Edge>,
    cap: Option<usize>,
) -> Result<(), SelectivityViolation> {
    let target = score(algebra, adjacency, cap)?;
    let invalid = algebra.invalid_edge();
    let fallback = algebra.fallback_edge();
    let n = adjacency.len();

    for i in 0..n {
        for j in 0..n {
            if adjacency[i][j] == invalid {
                continue;
            }
            let entry = std::mem::replace(&mut adjacency[i][j], invalid.clone());
            if score(algebra, adjacency, cap)? >= target {
                continue;
            }
            match &fallback {
                Some(cheaper) if *cheaper != entry => {
                    adjacency[i][j] = cheaper.clone();
                    if score(algebra, adjacency, cap)? < target {
                        adjacency[i][j] = entry;
                    }
                }
                _ => adjacency[i][j] = entry,
            }
        }
    }
    Ok(())
}

/// The first node whose column changed in the last round before the
/// fixed point (or before the cap, if the history never converged).
pub fn slowest_source<R: PartialEq>(history: &[Matrix<R>]) -> Option<NodeId> {
    let offset = if matrix::is_converged(history) { 1 } else { 0 };
    let len = history.len().checked_sub(offset)?;
    if len < 2 {
        return None;
    }
    let (before, after) = (&history[len - 2], &history[len - 1]);
    (0..after.len()).find(|&node| {
        before
            .iter()
            .zip(after)
            .any(|(b, a)| b[node] != a[node])
    })
}

/// Simplify `adjacency`, locate its slowest source and drop its
/// invalid edges. The candidate is scored after simplification, which
/// never lowers the score.
pub fn improve<A: PathAlgebra>(
    algebra: &A,
    mut adjacency: Matrix<A::Edge>,
    cap: Option<usize>,
) -> Result<Candidate<A::Edge>, SelectivityViolation> {
    simplify(algebra, &mut adjacency, cap)?;
    let identity = matrix::create_identity_matrix(algebra, adjacency.len());
    let solution = matrix::solve(algebra, &identity, &adjacency, cap)?;
    let source = slowest_source(&solution.history).unwrap_or(0);

    let invalid = algebra.invalid_edge();
    let adjacency = adjacency
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|e| if e == invalid { None } else { Some(e) })
                .collect()
        })
        .collect();
    Ok(Candidate {
        adjacency,
        source,
        score: solution.rounds(),
    })
}

/// A resumable random-sampling search. Each [`RandomSearch::step`]
/// draws and scores one sample, so a driver can stop between any two
/// samples.
pub struct RandomSearch<A, R> {
    algebra: A,
    nodes: usize,
    iterations: usize,
    cap: Option<usize>,
    rng: R,
    completed: usize,
    best_score: usize,
}

impl<A: PathAlgebra, R: RngCore> RandomSearch<A, R> {
    pub fn new(algebra: A, nodes: usize, iterations: usize, cap: Option<usize>, rng: R) -> Self {
        Self {
            algebra,
            nodes,
            iterations,
            cap,
            rng,
            completed: 0,
            best_score: 0,
        }
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn best_score(&self) -> usize {
        self.best_score
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.iterations
    }

    /// Fraction of the budget used, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.iterations == 0 {
            1.0
        } else {
            self.completed as f64 / self.iterations as f64
        }
    }

    /// Draw and score one sample. Returns the improved instance when
    /// it beats every earlier sample.
    pub fn step(&mut self) -> Result<Option<Candidate<A::Edge>>, SelectivityViolation> {
        if self.is_finished() {
            return Ok(None);
        }
        self.completed += 1;

        let adjacency = random_adjacency(&self.algebra, self.nodes, &mut self.rng);
        let sample = score(&self.algebra, &adjacency, self.cap)?;
        if sample <= self.best_score {
            return Ok(None);
        }
        tracing::debug!(
            algebra = self.algebra.name(),
            iteration = self.completed,
            score = sample,
            "new best sample"
        );
        let candidate = improve(&self.algebra, adjacency, self.cap)?;
        self.best_score = candidate.score;
        Ok(Some(candidate))
    }
}
