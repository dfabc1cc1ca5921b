/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! PathVision: explore how path algebras converge.
//!
//! - [`workbench::Workbench`] is an editing session: a graph, an
//!   algebra from the [`catalogue`], and a cursor over the solver's
//!   history.
//! - [`storage::RoutingProblem`] is the on-disk form of a session.
//! - [`search::SearchWorker`] runs the random worst-case search in the
//!   background.
//! - [`config::Config`] holds the tunables shared by all of these.

pub use path_algebra;

pub mod catalogue;
pub mod config;
pub mod search;
pub mod storage;
pub mod workbench;

pub use catalogue::AlgebraChoice;
pub use catalogue::AlgebraKind;
pub use config::Config;
pub use search::SearchError;
pub use search::SearchEvent;
pub use search::SearchRequest;
pub use search::SearchWorker;
pub use storage::RoutingProblem;
pub use storage::StorageError;
pub use workbench::Workbench;
pub use workbench::WorkbenchError;
