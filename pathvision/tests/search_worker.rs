/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The background search worker, driven from async code.

use std::time::Duration;

use pathvision::catalogue::AlgebraChoice;
use pathvision::catalogue::AlgebraKind;
use pathvision::SearchError;
use pathvision::SearchEvent;
use pathvision::SearchRequest;
use pathvision::SearchWorker;
use tokio::time::timeout;

const DEADLINE: Duration = Duration::from_secs(60);

fn request(iterations: usize) -> SearchRequest {
    SearchRequest {
        choice: AlgebraChoice::new(AlgebraKind::ShortestPath, false),
        nodes: 4,
        iterations,
        cap: None,
        seed: Some(7),
        progress_interval: 5,
    }
}

#[tokio::test]
async fn seeded_search_runs_to_completion() {
    let mut worker = SearchWorker::new();
    let mut events = worker.start(request(50)).unwrap();

    let mut fractions = Vec::new();
    let mut scores = Vec::new();
    timeout(DEADLINE, async {
        while let Some(event) = events.recv().await {
            match event {
                SearchEvent::Progress { fraction, .. } => fractions.push(fraction),
                SearchEvent::Result {
                    adjacency, score, ..
                } => {
                    assert_eq!(adjacency.len(), 4);
                    scores.push(score);
                }
            }
        }
    })
    .await
    .unwrap();

    let summary = worker.join().await.unwrap();
    assert_eq!(summary.completed, 50);
    assert!(!summary.cancelled);
    assert!(!fractions.is_empty() && fractions.len() <= 10);
    assert_eq!(fractions.last(), Some(&1.0));
    assert!(scores.windows(2).all(|w| w[0] < w[1]));
    if let Some(&last) = scores.last() {
        assert_eq!(last, summary.best_score);
    }
}

#[tokio::test]
async fn one_search_at_a_time_and_cancellation() {
    let mut worker = SearchWorker::new();
    let mut events = worker.start(request(10_000_000)).unwrap();
    assert!(worker.is_running());
    assert!(matches!(
        worker.start(request(10)),
        Err(SearchError::AlreadyRunning)
    ));

    worker.cancel();
    timeout(DEADLINE, async { while events.recv().await.is_some() {} })
        .await
        .unwrap();
    let summary = timeout(DEADLINE, worker.join()).await.unwrap().unwrap();
    assert!(summary.cancelled);
    assert!(summary.completed < 10_000_000);
    assert!(!worker.is_running());
}

#[tokio::test]
async fn join_without_start_fails() {
    let mut worker = SearchWorker::new();
    assert!(matches!(worker.join().await, Err(SearchError::NotStarted)));
}
