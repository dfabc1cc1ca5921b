/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The fixed set of algebras a session can select.
//!
//! Algebras are generic types, so runtime selection goes through the
//! closed [`AlgebraKind`] enum and the [`with_algebra!`] macro, which
//! expands a block once per concrete algebra.

use std::fmt;
use std::str::FromStr;

use path_algebra::PathAlgebra;
use serde::Deserialize;
use serde::Serialize;

/// The algebras in the catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgebraKind {
    /// `(N, min, +)`
    ShortestPath,
    /// `(N, max, min)`
    WidestPath,
    /// `(N, max, min)-x-(N, min, +)`
    ShortestWidest,
    /// `F-custom`
    FunctionRing,
    /// `Pathological`
    Pathological,
}

impl AlgebraKind {
    pub const ALL: [AlgebraKind; 5] = [
        AlgebraKind::ShortestPath,
        AlgebraKind::WidestPath,
        AlgebraKind::ShortestWidest,
        AlgebraKind::FunctionRing,
        AlgebraKind::Pathological,
    ];

    /// Short command line key.
    pub fn key(self) -> &'static str {
        match self {
            AlgebraKind::ShortestPath => "min-plus",
            AlgebraKind::WidestPath => "max-min",
            AlgebraKind::ShortestWidest => "shortest-widest",
            AlgebraKind::FunctionRing => "f-custom",
            AlgebraKind::Pathological => "pathological",
        }
    }

    /// The algebra's own name, as stored in routing problems.
    pub fn name(self) -> String {
        AlgebraChoice::new(self, false).name()
    }

    /// Resolve a stored algebra name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for AlgebraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algebra `{0}`")]
pub struct UnknownAlgebra(pub String);

impl FromStr for AlgebraKind {
    type Err = UnknownAlgebra;

    /// Accepts the command line key or the algebra name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .or_else(|| Self::from_name(s))
            .ok_or_else(|| UnknownAlgebra(s.to_string()))
    }
}

/// A catalogue algebra, optionally augmented with path tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgebraChoice {
    pub kind: AlgebraKind,
    pub track_paths: bool,
}

impl AlgebraChoice {
    pub fn new(kind: AlgebraKind, track_paths: bool) -> Self {
        Self { kind, track_paths }
    }

    /// Name of the selected algebra, including the path-tracking
    /// suffix when enabled.
    pub fn name(self) -> String {
        crate::with_algebra!(self, |algebra| algebra.name())
    }
}

impl Default for AlgebraChoice {
    fn default() -> Self {
        Self::new(AlgebraKind::ShortestPath, false)
    }
}

/// Editor metadata for one catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlgebraInfo {
    pub key: &'static str,
    pub name: String,
    pub default_edge: String,
    pub invalid_edge: String,
    /// Component names; empty unless edges are entered per component.
    pub components: Vec<String>,
    pub has_fallback_edge: bool,
}

fn info<A: PathAlgebra>(key: &'static str, algebra: &A) -> AlgebraInfo {
    AlgebraInfo {
        key,
        name: algebra.name(),
        default_edge: algebra.default_edge().to_string(),
        invalid_edge: algebra.invalid_edge().to_string(),
        components: algebra.components(),
        has_fallback_edge: algebra.fallback_edge().is_some(),
    }
}

/// Every catalogue algebra, without path tracking.
pub fn algebras() -> Vec<AlgebraInfo> {
    AlgebraKind::ALL
        .into_iter()
        .map(|kind| {
            let choice = AlgebraChoice::new(kind, false);
            crate::with_algebra!(choice, |algebra| info(kind.key(), &algebra))
        })
        .collect()
}

/// Evaluate `$body` with `$algebra` bound to the concrete algebra
/// selected by `$choice` (an [`AlgebraChoice`]).
///
/// ```
/// use pathvision::catalogue::AlgebraChoice;
/// use pathvision::catalogue::AlgebraKind;
/// use pathvision::with_algebra;
/// use path_algebra::PathAlgebra;
///
/// let choice = AlgebraChoice::new(AlgebraKind::WidestPath, true);
/// let name = with_algebra!(choice, |a| a.name());
/// assert_eq!(name, "(N, max, min) + paths");
/// ```
#[macro_export]
macro_rules! with_algebra {
    ($choice:expr, |$algebra:ident| $body:expr) => {{
        use $crate::catalogue::AlgebraKind as __Kind;
        let __choice: $crate::catalogue::AlgebraChoice = $choice;
        match (__choice.kind, __choice.track_paths) {
            (__Kind::ShortestPath, false) => {
                let $algebra = $crate::path_algebra::MinPlus;
                $body
            }
            (__Kind::ShortestPath, true) => {
                let $algebra = $crate::path_algebra::track_paths($crate::path_algebra::MinPlus);
                $body
            }
            (__Kind::WidestPath, false) => {
                let $algebra = $crate::path_algebra::MaxMin;
                $body
            }
            (__Kind::WidestPath, true) => {
                let $algebra = $crate::path_algebra::track_paths($crate::path_algebra::MaxMin);
                $body
            }
            (__Kind::ShortestWidest, false) => {
                let $algebra = $crate::path_algebra::lexicographic_product(
                    $crate::path_algebra::MaxMin,
                    $crate::path_algebra::MinPlus,
                );
                $body
            }
            (__Kind::ShortestWidest, true) => {
                let $algebra = $crate::path_algebra::track_paths($crate::path_algebra::lexicographic_product(
                    $crate::path_algebra::MaxMin,
                    $crate::path_algebra::MinPlus,
                ));
                $body
            }
            (__Kind::FunctionRing, false) => {
                let $algebra = $crate::path_algebra::FRing;
                $body
            }
            (__Kind::FunctionRing, true) => {
                let $algebra = $crate::path_algebra::track_paths($crate::path_algebra::FRing);
                $body
            }
            (__Kind::Pathological, false) => {
                let $algebra = $crate::path_algebra::Pathological;
                $body
            }
            (__Kind::Pathological, true) => {
                let $algebra = $crate::path_algebra::track_paths($crate::path_algebra::Pathological);
                $body
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_back_to_kinds() {
        for kind in AlgebraKind::ALL {
            assert_eq!(AlgebraKind::from_name(&kind.name()), Some(kind));
            assert_eq!(kind.key().parse::<AlgebraKind>(), Ok(kind));
        }
        assert_eq!(
            "(N, min, +)".parse::<AlgebraKind>(),
            Ok(AlgebraKind::ShortestPath)
        );
        assert!("(N, +, +)".parse::<AlgebraKind>().is_err());
    }

    #[test]
    fn path_tracking_changes_the_name_only() {
        let plain = AlgebraChoice::new(AlgebraKind::ShortestWidest, false);
        let tracked = AlgebraChoice::new(AlgebraKind::ShortestWidest, true);
        assert_eq!(plain.name(), "(N, max, min)-x-(N, min, +)");
        assert_eq!(tracked.name(), "(N, max, min)-x-(N, min, +) + paths");
    }

    #[test]
    fn catalogue_metadata() {
        let all = algebras();
        assert_eq!(all.len(), 5);
        let widest = &all[1];
        assert_eq!(widest.name, "(N, max, min)");
        assert_eq!(widest.default_edge, "2");
        let product = &all[2];
        assert_eq!(
            product.components,
            vec!["(N, max, min)".to_string(), "(N, min, +)".to_string()]
        );
        let fring = &all[3];
        assert_eq!(fring.default_edge, "c");
        assert!(fring.has_fallback_edge);
        assert!(!all[0].has_fallback_edge);
    }
}
