/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Generalized Bellman-Ford over path algebras.
//!
//! Provides [`Graph`], the editable topology a routing problem is
//! defined on, the matrix solver in [`matrix`], a cursor over solver
//! histories ([`Simulation`]) and a random-sampling search for slowly
//! converging instances ([`RandomSearch`]).
//!
//! The solver never looks at node positions or labels; those exist for
//! whatever displays the graph.

/// Editable directed graphs with contiguous node identifiers.
pub mod graph;

/// Identity/adjacency matrices, relaxation rounds and `solve`.
pub mod matrix;

/// Random sampling for slowly converging instances.
pub mod random_search;

mod simulation;

pub use graph::Graph;
pub use graph::GraphError;
pub use graph::Position;
pub use matrix::solve;
pub use matrix::Matrix;
pub use matrix::Solution;
pub use random_search::Candidate;
pub use random_search::RandomSearch;
pub use simulation::Simulation;
pub use simulation::StateChanged;
