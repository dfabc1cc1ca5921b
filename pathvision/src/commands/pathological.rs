/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::path::PathBuf;

use anyhow::Context;
use path_algebra::pathological_adjacency;
use path_algebra::Link;
use pathvision::catalogue::AlgebraChoice;
use pathvision::catalogue::AlgebraKind;
use pathvision::RoutingProblem;

#[derive(clap::Args, Debug)]
pub struct PathologicalCommand {
    /// Nodes in the gadget graph.
    #[arg(long, default_value_t = 6)]
    nodes: usize,

    /// Where to write the routing problem.
    #[arg(long)]
    output: PathBuf,
}

impl PathologicalCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let adjacency = pathological_adjacency(self.nodes)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|link| match link {
                        Link::Present => serde_json::to_value(link).map(Some),
                        Link::Absent => Ok(None),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let choice = AlgebraChoice::new(AlgebraKind::Pathological, false);
        RoutingProblem::from_adjacency(choice, adjacency, 0)
            .save(&self.output)
            .with_context(|| format!("writing {}", self.output.display()))?;
        println!("wrote {} node pathological problem to {}", self.nodes, self.output.display());
        Ok(())
    }
}
