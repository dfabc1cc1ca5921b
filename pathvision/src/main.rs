/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use pathvision::Config;
use tracing_subscriber::EnvFilter;

use crate::commands::algebras::AlgebrasCommand;
use crate::commands::order_search::OrderSearchCommand;
use crate::commands::pathological::PathologicalCommand;
use crate::commands::search::SearchCommand;
use crate::commands::solve::SolveCommand;

#[derive(Parser)]
#[command(about = "Explore the convergence of path algebras")]
struct Cli {
    /// YAML configuration file; `PATHVISION_*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[clap(about = r#"List the available algebras"#)]
    Algebras(AlgebrasCommand),

    #[clap(about = r#"Solve a routing problem and print each round"#)]
    Solve(SolveCommand),

    #[clap(about = r#"Search random graphs for slow convergence"#)]
    Search(SearchCommand),

    #[clap(about = r#"Search path orders for slow convergence"#)]
    OrderSearch(OrderSearchCommand),

    #[clap(about = r#"Write the pathological example problem"#)]
    Pathological(PathologicalCommand),
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => Config::from_yaml(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    let config = config.from_env();
    init_tracing(&config.log_filter);

    match args.command {
        Command::Algebras(command) => command.run().await,
        Command::Solve(command) => command.run(&config).await,
        Command::Search(command) => command.run(&config).await,
        Command::OrderSearch(command) => command.run(&config).await,
        Command::Pathological(command) => command.run().await,
    }
}
