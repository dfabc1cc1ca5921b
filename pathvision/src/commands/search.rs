/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::PathBuf;

use anyhow::Context;
use pathvision::catalogue::AlgebraChoice;
use pathvision::catalogue::AlgebraKind;
use pathvision::Config;
use pathvision::RoutingProblem;
use pathvision::SearchEvent;
use pathvision::SearchRequest;
use pathvision::SearchWorker;

#[derive(clap::Args, Debug)]
pub struct SearchCommand {
    /// The algebra to search, by key or name.
    #[arg(long)]
    algebra: AlgebraKind,

    /// Nodes per sampled graph.
    #[arg(long)]
    nodes: Option<usize>,

    /// Samples to draw.
    #[arg(long)]
    iterations: Option<usize>,

    /// Track paths alongside the algebra's weights.
    #[arg(long)]
    paths: bool,

    /// Save the slowest instance found as a routing problem.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl SearchCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let choice = AlgebraChoice::new(self.algebra, self.paths);
        let mut request = SearchRequest::from_config(choice, config);
        if let Some(nodes) = self.nodes {
            request.nodes = nodes;
        }
        if let Some(iterations) = self.iterations {
            request.iterations = iterations;
            request.progress_interval = Config {
                search_iterations: iterations,
                ..config.clone()
            }
            .progress_interval();
        }

        let mut worker = SearchWorker::new();
        let mut events = worker.start(request)?;
        let token = worker.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });

        let mut best = None;
        while let Some(event) = events.recv().await {
            match event {
                SearchEvent::Progress {
                    fraction,
                    best_score,
                } => {
                    eprintln!("{:>5.1}% best {}", fraction * 100.0, best_score);
                }
                SearchEvent::Result {
                    adjacency,
                    source,
                    score,
                } => {
                    println!("slowest so far: {} rounds to source {}", score, source);
                    best = Some((adjacency, source));
                }
            }
        }

        let summary = worker.join().await?;
        println!(
            "{} after {} samples, best {} rounds",
            if summary.cancelled { "cancelled" } else { "finished" },
            summary.completed,
            summary.best_score
        );

        if let Some(output) = self.output {
            let Some((adjacency, source)) = best else {
                anyhow::bail!("no instance found to save");
            };
            RoutingProblem::from_adjacency(choice, adjacency, source)
                .save(&output)
                .with_context(|| format!("saving {}", output.display()))?;
        }
        Ok(())
    }
}
