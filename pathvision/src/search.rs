/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The background worker for worst-case random search.
//!
//! A search runs on a blocking thread and reports through a bounded
//! channel. Intermediate progress events are dropped when the channel
//! is full; results and the final progress event wait for room unless
//! the search is cancelled. A search stops when its budget is spent,
//! when its cancellation token fires, or when the receiving side goes
//! away. Only one search runs per worker at a time.

use path_algebra::NodeId;
use path_algebra::PathAlgebra;
use path_algebra::SelectivityViolation;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use routing::Matrix;
use routing::RandomSearch;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::catalogue::AlgebraChoice;
use crate::config::Config;
use crate::with_algebra;

/// Events buffered before the worker blocks on a slow receiver.
const EVENT_BUFFER: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("a search is already running")]
    AlreadyRunning,

    #[error("no search has been started")]
    NotStarted,

    #[error(transparent)]
    Selectivity(#[from] SelectivityViolation),

    #[error("failed to encode edge weights")]
    Encode(#[from] serde_json::Error),

    #[error("search worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

/// Parameters of one random search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub choice: AlgebraChoice,
    pub nodes: usize,
    pub iterations: usize,
    pub cap: Option<usize>,
    pub seed: Option<u64>,
    /// Iterations between progress events.
    pub progress_interval: usize,
}

impl SearchRequest {
    pub fn from_config(choice: AlgebraChoice, config: &Config) -> Self {
        Self {
            choice,
            nodes: config.graph_size,
            iterations: config.search_iterations,
            cap: config.iteration_cap,
            seed: config.seed,
            progress_interval: config.progress_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Progress {
        /// Fraction of the iteration budget used.
        fraction: f64,
        best_score: usize,
    },
    /// A new slowest instance, already simplified. Weights are in the
    /// algebra's serialized form; `None` is an absent edge.
    Result {
        adjacency: Matrix<Option<serde_json::Value>>,
        source: NodeId,
        score: usize,
    },
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    pub completed: usize,
    pub best_score: usize,
    pub cancelled: bool,
}

/// Owns at most one running search.
#[derive(Debug, Default)]
pub struct SearchWorker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<Result<SearchSummary, SearchError>>>,
}

impl SearchWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start a search, returning the receiving end of its event
    /// channel. The channel closes when the search ends.
    pub fn start(
        &mut self,
        request: SearchRequest,
    ) -> Result<mpsc::Receiver<SearchEvent>, SearchError> {
        if self.is_running() {
            return Err(SearchError::AlreadyRunning);
        }
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        self.handle = Some(tokio::task::spawn_blocking(move || {
            with_algebra!(request.choice, |algebra| run(algebra, &request, &cancel, &tx))
        }));
        Ok(rx)
    }

    /// Ask the running search to stop at its next iteration.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels the current search.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the current search to end.
    pub async fn join(&mut self) -> Result<SearchSummary, SearchError> {
        let handle = self.handle.take().ok_or(SearchError::NotStarted)?;
        handle.await?
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn encode<E: serde::Serialize>(
    adjacency: Matrix<Option<E>>,
) -> Result<Matrix<Option<serde_json::Value>>, serde_json::Error> {
    adjacency
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|e| e.map(|e| serde_json::to_value(e)).transpose())
                .collect()
        })
        .collect()
}

/// Wait for room on the channel, giving up if the search is cancelled
/// first. Returns whether the event was delivered.
fn send_unless_cancelled(
    tx: &mpsc::Sender<SearchEvent>,
    event: SearchEvent,
    cancel: &CancellationToken,
) -> bool {
    tokio::runtime::Handle::current().block_on(async {
        tokio::select! {
            sent = tx.send(event) => sent.is_ok(),
            _ = cancel.cancelled() => false,
        }
    })
}

fn run<A: PathAlgebra>(
    algebra: A,
    request: &SearchRequest,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<SearchEvent>,
) -> Result<SearchSummary, SearchError> {
    let rng = match request.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let algebra_name = algebra.name();
    let interval = request.progress_interval.max(1);
    let mut search = RandomSearch::new(algebra, request.nodes, request.iterations, request.cap, rng);
    tracing::info!(
        algebra = %algebra_name,
        nodes = request.nodes,
        iterations = request.iterations,
        "search started"
    );

    let mut cancelled = false;
    while !search.is_finished() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        if let Some(candidate) = search.step()? {
            tracing::info!(
                score = candidate.score,
                source = candidate.source,
                iteration = search.completed(),
                "new slowest instance"
            );
            let event = SearchEvent::Result {
                adjacency: encode(candidate.adjacency)?,
                source: candidate.source,
                score: candidate.score,
            };
            if !send_unless_cancelled(tx, event, cancel) {
                cancelled = true;
                break;
            }
        }
        if search.completed() % interval == 0 || search.is_finished() {
            let event = SearchEvent::Progress {
                fraction: search.progress(),
                best_score: search.best_score(),
            };
            let delivered = if search.is_finished() {
                send_unless_cancelled(tx, event, cancel)
            } else {
                !matches!(tx.try_send(event), Err(mpsc::error::TrySendError::Closed(_)))
            };
            if !delivered {
                cancelled = true;
                break;
            }
        }
    }

    let summary = SearchSummary {
        completed: search.completed(),
        best_score: search.best_score(),
        cancelled,
    };
    if cancelled {
        tracing::info!(completed = summary.completed, "search cancelled");
    } else {
        tracing::info!(
            completed = summary.completed,
            best_score = summary.best_score,
            "search finished"
        );
    }
    Ok(summary)
}
