/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Configuration for PathVision.
//!
//! Values come from defaults, optionally a YAML file
//! (`Config::from_yaml`), then `PATHVISION_*` environment variables
//! (`Config::from_env`), each layer overriding the previous one.

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable names.
pub const SEARCH_ITERATIONS_ENV: &str = "PATHVISION_SEARCH_ITERATIONS";
pub const GRAPH_SIZE_ENV: &str = "PATHVISION_GRAPH_SIZE";
pub const PROGRESS_UPDATES_ENV: &str = "PATHVISION_PROGRESS_UPDATES";
pub const ITERATION_CAP_ENV: &str = "PATHVISION_ITERATION_CAP";
pub const SEED_ENV: &str = "PATHVISION_SEED";
pub const LOG_ENV: &str = "PATHVISION_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Random samples drawn by a worst-case search.
    pub search_iterations: usize,
    /// Nodes in each sampled graph.
    pub graph_size: usize,
    /// Progress events per search; 100 reports every 1% of the budget.
    pub progress_updates: usize,
    /// Overrides the solver's default cap of `n²` states.
    pub iteration_cap: Option<usize>,
    /// Seed for the search RNG. Unseeded searches draw from entropy.
    pub seed: Option<u64>,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG`
    /// is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_iterations: 1000,
            graph_size: 5,
            progress_updates: 100,
            iteration_cap: None,
            seed: None,
            log_filter: "info".to_string(),
        }
    }
}

fn parse_into<T: FromStr>(name: &str, value: &str, slot: &mut T) -> bool
where
    T::Err: std::fmt::Display,
{
    match value.parse::<T>() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(e) => {
            tracing::error!(
                "failed to override config from value \"{}\" in ${}: {}",
                value,
                name,
                e
            );
            false
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file. Missing keys keep their
    /// defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Override fields from the process environment.
    pub fn from_env(self) -> Self {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Override fields from `lookup`, which maps variable names to
    /// values. Unparsable values are logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut applied = Vec::new();

        if let Some(val) = lookup(SEARCH_ITERATIONS_ENV) {
            if parse_into(SEARCH_ITERATIONS_ENV, &val, &mut self.search_iterations) {
                applied.push(SEARCH_ITERATIONS_ENV);
            }
        }
        if let Some(val) = lookup(GRAPH_SIZE_ENV) {
            if parse_into(GRAPH_SIZE_ENV, &val, &mut self.graph_size) {
                applied.push(GRAPH_SIZE_ENV);
            }
        }
        if let Some(val) = lookup(PROGRESS_UPDATES_ENV) {
            if parse_into(PROGRESS_UPDATES_ENV, &val, &mut self.progress_updates) {
                applied.push(PROGRESS_UPDATES_ENV);
            }
        }
        if let Some(val) = lookup(ITERATION_CAP_ENV) {
            let mut cap = 0usize;
            if parse_into(ITERATION_CAP_ENV, &val, &mut cap) {
                self.iteration_cap = Some(cap);
                applied.push(ITERATION_CAP_ENV);
            }
        }
        if let Some(val) = lookup(SEED_ENV) {
            let mut seed = 0u64;
            if parse_into(SEED_ENV, &val, &mut seed) {
                self.seed = Some(seed);
                applied.push(SEED_ENV);
            }
        }
        if let Some(val) = lookup(LOG_ENV) {
            self.log_filter = val;
            applied.push(LOG_ENV);
        }

        if !applied.is_empty() {
            tracing::info!("loaded configuration from environment: {}", applied.join(", "));
        }
        self
    }

    /// How many iterations pass between progress events. Never zero.
    pub fn progress_interval(&self) -> usize {
        (self.search_iterations / self.progress_updates.max(1)).max(1)
    }
}
