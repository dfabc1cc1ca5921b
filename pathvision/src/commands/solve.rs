/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::PathBuf;

use anyhow::Context;
use pathvision::Config;
use pathvision::RoutingProblem;
use pathvision::Workbench;

#[derive(clap::Args, Debug)]
pub struct SolveCommand {
    /// A routing problem saved as JSON.
    problem: PathBuf,

    /// Print only this round.
    #[arg(long)]
    round: Option<usize>,
}

impl SolveCommand {
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let problem = RoutingProblem::load(&self.problem)
            .with_context(|| format!("loading {}", self.problem.display()))?;
        let mut workbench = Workbench::from_problem(&problem, config.iteration_cap)
            .with_context(|| format!("building a session from {}", self.problem.display()))?;

        let n = workbench.len();
        let limit = config.iteration_cap.unwrap_or((n * n).max(2));
        let last = self.round.unwrap_or(limit);

        println!("{} on {} nodes, source {}", workbench.algebra_name(), n, workbench.source());
        loop {
            let round = workbench.current_round();
            if self.round.is_none() || self.round == Some(round) {
                println!("round {}: {}", round, workbench.source_row().join(" "));
            }
            if round >= last || !workbench.state_changed().can_step_forward {
                break;
            }
            workbench.move_forward()?;
        }

        if let Some(round) = self.round {
            if workbench.current_round() < round {
                anyhow::bail!(
                    "round {} is past the fixed point at round {}",
                    round,
                    workbench.current_round()
                );
            }
        }
        match workbench.convergence_time() {
            Some(rounds) => println!("converged after {} rounds", rounds),
            None => println!("not converged after {} rounds", workbench.current_round()),
        }
        Ok(())
    }
}
