/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Path partial orders and the search for slowly converging ones.
//!
//! A [`PathPartialOrder`] relates the simple paths to a sink. It is
//! built by asserting `p < q` one pair at a time; every assertion is
//! closed under transitivity and can be undone as a unit. The
//! [`OrderAlgebra`] turns an order into a path algebra so the generic
//! solver can run on it.
//!
//! [`search_orderings`] enumerates orders up to the symmetries of the
//! graph and reports the one under which the sink column takes the
//! most rounds to settle.

mod order;
mod order_algebra;
mod score;
mod search;

/// Symmetry groups and the branching enumeration built on them.
pub mod symmetry;

pub use order::OrderError;
pub use order::PathPartialOrder;
pub use order::Related;
pub use order_algebra::OrderAlgebra;
pub use order_algebra::OrderRoute;
pub use score::evaluate;
pub use score::score_leaf;
pub use score::LeafScore;
pub use search::search_orderings;
pub use search::OrderSearchError;
pub use search::OrderSearchOutcome;
