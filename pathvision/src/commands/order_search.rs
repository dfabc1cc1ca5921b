/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::PathBuf;

use anyhow::Context;
use path_algebra::NodeId;
use pathvision::Config;
use pathvision::RoutingProblem;
use pathvision::Workbench;
use tokio_util::sync::CancellationToken;

#[derive(clap::Args, Debug)]
pub struct OrderSearchCommand {
    /// A routing problem saved as JSON. Only its topology is used.
    problem: PathBuf,

    /// The destination of every path; defaults to the problem's source.
    #[arg(long)]
    sink: Option<NodeId>,
}

impl OrderSearchCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let problem = RoutingProblem::load(&self.problem)
            .with_context(|| format!("loading {}", self.problem.display()))?;
        let workbench = Workbench::from_problem(&problem, config.iteration_cap)?;
        let topology = workbench.topology();
        let sink = self.sink.unwrap_or(workbench.source());
        let cap = config.iteration_cap;

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let outcome = tokio::task::spawn_blocking(move || {
            path_order::search_orderings(&topology, sink, cap, &|| token.is_cancelled())
        })
        .await??;

        let Some(outcome) = outcome else {
            println!("no path order scored");
            return Ok(());
        };
        println!(
            "slowest order: {} rounds ({}), {} leaves scored",
            outcome.rounds,
            if outcome.converged { "converged" } else { "capped" },
            outcome.leaves
        );
        println!("full solver: {} rounds", outcome.solver_rounds);
        println!("assertions:");
        for (p, q) in &outcome.assertions {
            println!("  {} < {}", p, q);
        }
        print!("{}", outcome.order);
        Ok(())
    }
}
