/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! An algebra whose edges are functions on ℕ ∪ {∞}.
//!
//! An edge is written as a colon-separated list of *rules* followed by
//! a *terminal*:
//!
//! ```text
//! edge     ::= (rule ":")* terminal
//! rule     ::= X "t" Y          -- if the route is X, it becomes Y (X <= Y)
//! terminal ::= "c"              -- keep the route
//!            | "i" N            -- add N
//!            | "r"              -- reset to infinity
//!            | "r" N            -- raise to at least N
//! ```
//!
//! Rules are tried in order; the first whose `X` matches wins, and the
//! terminal applies when none does.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;

use super::EdgeParseError;
use super::NodeId;
use super::PathAlgebra;
use super::SelectivityViolation;
use super::Weight;

/// What an edge function does when no rule matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// `c`: the route is unchanged.
    Keep,
    /// `iN`: add `N`.
    Increment(u64),
    /// `r`: the route becomes infinite.
    Reset,
    /// `rN`: the route is raised to at least `N`.
    ResetTo(u64),
}

/// An edge function: rewrite rules followed by a terminal.
///
/// # Example
/// ```
/// use path_algebra::FunctionEdge;
/// use path_algebra::Weight;
///
/// let f: FunctionEdge = "1t3:i2".parse().unwrap();
/// assert_eq!(f.apply(Weight::Finite(1)), Weight::Finite(3));
/// assert_eq!(f.apply(Weight::Finite(4)), Weight::Finite(6));
/// assert_eq!(f.to_string(), "1t3:i2");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FunctionEdge {
    rules: Vec<(u64, u64)>,
    terminal: Terminal,
}

impl FunctionEdge {
    /// A function with no rules.
    pub fn terminal(terminal: Terminal) -> Self {
        Self {
            rules: Vec::new(),
            terminal,
        }
    }

    /// Apply the function to a route value.
    pub fn apply(&self, value: Weight) -> Weight {
        for &(from, to) in &self.rules {
            if value == Weight::Finite(from) {
                return Weight::Finite(to);
            }
        }
        match self.terminal {
            Terminal::Keep => value,
            Terminal::Increment(n) => value.saturating_add(Weight::Finite(n)),
            Terminal::Reset => Weight::Infinite,
            Terminal::ResetTo(n) => value.max(Weight::Finite(n)),
        }
    }
}

impl fmt::Display for FunctionEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (from, to) in &self.rules {
            write!(f, "{}t{}:", from, to)?;
        }
        match self.terminal {
            Terminal::Keep => write!(f, "c"),
            Terminal::Increment(n) => write!(f, "i{}", n),
            Terminal::Reset => write!(f, "r"),
            Terminal::ResetTo(n) => write!(f, "r{}", n),
        }
    }
}

/// Parse error for [`FunctionEdge`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid edge function `{0}`")]
pub struct ParseFunctionError(String);

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_terminal(s: &str) -> Option<Terminal> {
    match s {
        "c" => Some(Terminal::Keep),
        "r" => Some(Terminal::Reset),
        _ => {
            if let Some(n) = s.strip_prefix('i') {
                digits(n).map(Terminal::Increment)
            } else if let Some(n) = s.strip_prefix('r') {
                digits(n).map(Terminal::ResetTo)
            } else {
                None
            }
        }
    }
}

fn parse_rule(s: &str) -> Option<(u64, u64)> {
    let (from, to) = s.split_once('t')?;
    let (from, to) = (digits(from)?, digits(to)?);
    (from <= to).then_some((from, to))
}

impl FromStr for FunctionEdge {
    type Err = ParseFunctionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFunctionError(s.to_string());
        let mut parts: Vec<&str> = s.trim().split(':').collect();
        let terminal = parts.pop().and_then(parse_terminal).ok_or_else(err)?;
        let rules = parts
            .into_iter()
            .map(parse_rule)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(err)?;
        Ok(Self { rules, terminal })
    }
}

impl From<FunctionEdge> for String {
    fn from(f: FunctionEdge) -> String {
        f.to_string()
    }
}

impl TryFrom<String> for FunctionEdge {
    type Error = ParseFunctionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// `min` over ℕ ∪ {∞} with edge functions.
///
/// - `plus = min`
/// - `times(f, a) = f(a)`
/// - invalid route = `∞`, identity route = `0`
/// - invalid edge = `r`, default edge = `c`
///
/// The fallback edge is `c`: when an instance depends on an edge,
/// the identity function is the cheapest replacement to try.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FRing;

impl PathAlgebra for FRing {
    type Route = Weight;
    type Edge = FunctionEdge;

    fn name(&self) -> String {
        "F-custom".to_string()
    }

    fn plus(&self, a: &Weight, b: &Weight) -> Result<Weight, SelectivityViolation> {
        Ok(*a.min(b))
    }

    fn times(&self, edge: &FunctionEdge, route: &Weight, _from: NodeId, _to: NodeId) -> Weight {
        edge.apply(*route)
    }

    fn invalid_route(&self) -> Weight {
        Weight::Infinite
    }

    fn identity_route(&self) -> Weight {
        Weight::Finite(0)
    }

    fn invalid_edge(&self) -> FunctionEdge {
        FunctionEdge::terminal(Terminal::Reset)
    }

    fn default_edge(&self) -> FunctionEdge {
        FunctionEdge::terminal(Terminal::Keep)
    }

    fn random_edge(&self, rng: &mut dyn RngCore) -> FunctionEdge {
        match rng.gen_range(0..5) {
            0 => FunctionEdge::terminal(Terminal::Keep),
            1 => FunctionEdge::terminal(Terminal::Increment(rng.gen_range(1..5))),
            2 => {
                let from = rng.gen_range(0..2);
                let to = rng.gen_range(from + 1..5);
                FunctionEdge {
                    rules: vec![(from, to)],
                    terminal: Terminal::Keep,
                }
            }
            _ => FunctionEdge::terminal(Terminal::Reset),
        }
    }

    fn parse_edge_input(&self, input: &str) -> Result<FunctionEdge, EdgeParseError> {
        input.parse().map_err(|_| EdgeParseError::Invalid {
            algebra: self.name(),
            input: input.to_string(),
        })
    }

    fn fallback_edge(&self) -> Option<FunctionEdge> {
        Some(self.default_edge())
    }
}
