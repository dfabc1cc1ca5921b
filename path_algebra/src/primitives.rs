/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Primitive algebras over the naturals extended with infinity:
//! MinPlus, MaxMin.

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

// Weight: ℕ ∪ {∞}

/// A natural number or infinity.
///
/// `Infinite` compares greater than every finite weight.
///
/// # Example
/// ```
/// use path_algebra::Weight;
///
/// assert!(Weight::Finite(u64::MAX) < Weight::Infinite);
/// assert_eq!("7".parse::<Weight>().unwrap(), Weight::Finite(7));
/// assert_eq!("inf".parse::<Weight>().unwrap(), Weight::Infinite);
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize
)]
#[serde(into = "String", try_from = "String")]
pub enum Weight {
    /// A finite weight.
    Finite(u64),
    /// Infinity.
    Infinite,
}

impl Weight {
    /// Addition, absorbing at infinity and saturating on overflow.
    pub fn saturating_add(self, other: Weight) -> Weight {
        match (self, other) {
            (Weight::Finite(a), Weight::Finite(b)) => Weight::Finite(a.saturating_add(b)),
            _ => Weight::Infinite,
        }
    }

    /// The finite value, if any.
    pub fn finite(self) -> Option<u64> {
        match self {
            Weight::Finite(v) => Some(v),
            Weight::Infinite => None,
        }
    }
}

impl From<u64> for Weight {
    fn from(value: u64) -> Self {
        Weight::Finite(value)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Finite(v) => write!(f, "{}", v),
            Weight::Infinite => write!(f, "∞"),
        }
    }
}

/// Parse error for [`Weight`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid weight `{0}`")]
pub struct ParseWeightError(String);

impl FromStr for Weight {
    type Err = ParseWeightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inf" | "∞" => Ok(Weight::Infinite),
            t => t
                .parse::<u64>()
                .map(Weight::Finite)
                .map_err(|_| ParseWeightError(s.to_string())),
        }
    }
}

impl From<Weight> for String {
    fn from(w: Weight) -> String {
        match w {
            Weight::Finite(v) => v.to_string(),
            Weight::Infinite => "inf".to_string(),
        }
    }
}

impl TryFrom<String> for Weight {
    type Error = ParseWeightError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Edge inputs are plain naturals; infinity is expressed by deleting
/// the edge.
fn parse_natural(algebra: &str, input: &str) -> Result<Weight, EdgeParseError> {
    input
        .trim()
        .parse::<u64>()
        .map(Weight::Finite)
        .map_err(|_| EdgeParseError::Invalid {
            algebra: algebra.to_string(),
            input: input.to_string(),
        })
}

/// Half of the draws are a weight in `0..10`, the rest are `absent`.
fn random_natural(rng: &mut dyn RngCore, absent: Weight) -> Weight {
    let r: u64 = rng.gen_range(0..20);
    if r < 10 {
        Weight::Finite(r)
    } else {
        absent
    }
}

// MinPlus: plus = min, times = +

/// Shortest paths.
///
/// - `plus = min`
/// - `times = +`
/// - invalid route = invalid edge = `∞`, identity route = `0`
///
/// # Example
/// ```
/// use path_algebra::MinPlus;
/// use path_algebra::PathAlgebra;
/// use path_algebra::Weight;
///
/// let r = MinPlus.times(&Weight::Finite(2), &Weight::Finite(3), 0, 1);
/// assert_eq!(r, Weight::Finite(5));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinPlus;

impl PathAlgebra for MinPlus {
    type Route = Weight;
    type Edge = Weight;

    fn name(&self) -> String {
        "(N, min, +)".to_string()
    }

    fn plus(&self, a: &Weight, b: &Weight) -> Result<Weight, SelectivityViolation> {
        Ok(*a.min(b))
    }

    fn times(&self, edge: &Weight, route: &Weight, _from: NodeId, _to: NodeId) -> Weight {
        edge.saturating_add(*route)
    }

    fn invalid_route(&self) -> Weight {
        Weight::Infinite
    }

    fn identity_route(&self) -> Weight {
        Weight::Finite(0)
    }

    fn invalid_edge(&self) -> Weight {
        Weight::Infinite
    }

    fn default_edge(&self) -> Weight {
        Weight::Finite(1)
    }

    fn random_edge(&self, rng: &mut dyn RngCore) -> Weight {
        random_natural(rng, self.invalid_edge())
    }

    fn parse_edge_input(&self, input: &str) -> Result<Weight, EdgeParseError> {
        parse_natural(&self.name(), input)
    }
}

// MaxMin: plus = max, times = min

/// Widest paths: the capacity of a route is its narrowest edge.
///
/// - `plus = max`
/// - `times = min`
/// - invalid route = invalid edge = `0`, identity route = `∞`
///
/// # Example
/// ```
/// use path_algebra::MaxMin;
/// use path_algebra::PathAlgebra;
/// use path_algebra::Weight;
///
/// let r = MaxMin.times(&Weight::Finite(2), &MaxMin.identity_route(), 0, 1);
/// assert_eq!(r, Weight::Finite(2));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaxMin;

impl PathAlgebra for MaxMin {
    type Route = Weight;
    type Edge = Weight;

    fn name(&self) -> String {
        "(N, max, min)".to_string()
    }

    fn plus(&self, a: &Weight, b: &Weight) -> Result<Weight, SelectivityViolation> {
        Ok(*a.max(b))
    }

    fn times(&self, edge: &Weight, route: &Weight, _from: NodeId, _to: NodeId) -> Weight {
        *edge.min(route)
    }

    fn invalid_route(&self) -> Weight {
        Weight::Finite(0)
    }

    fn identity_route(&self) -> Weight {
        Weight::Infinite
    }

    fn invalid_edge(&self) -> Weight {
        Weight::Finite(0)
    }

    fn default_edge(&self) -> Weight {
        Weight::Finite(2)
    }

    fn random_edge(&self, rng: &mut dyn RngCore) -> Weight {
        random_natural(rng, self.invalid_edge())
    }

    fn parse_edge_input(&self, input: &str) -> Result<Weight, EdgeParseError> {
        parse_natural(&self.name(), input)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn weight() -> impl Strategy<Value = Weight> {
        prop_oneof![
            (0u64..1000).prop_map(Weight::Finite),
            Just(Weight::Infinite),
        ]
    }

    // Weight tests

    #[test]
    fn infinity_is_greatest() {
        assert!(Weight::Finite(0) < Weight::Infinite);
        assert!(Weight::Finite(u64::MAX) < Weight::Infinite);
    }

    #[test]
    fn addition_absorbs_infinity() {
        assert_eq!(
            Weight::Finite(3).saturating_add(Weight::Infinite),
            Weight::Infinite
        );
        assert_eq!(
            Weight::Finite(u64::MAX).saturating_add(Weight::Finite(1)),
            Weight::Finite(u64::MAX)
        );
    }

    #[test]
    fn weight_serde_roundtrip() {
        let json = serde_json::to_string(&Weight::Infinite).unwrap();
        assert_eq!(json, "\"inf\"");
        let back: Weight = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Weight::Infinite);
        let back: Weight = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(back, Weight::Finite(12));
    }

    // MinPlus tests

    #[test]
    fn min_plus_prefers_lighter_routes() {
        assert_eq!(
            MinPlus.plus(&Weight::Finite(5), &Weight::Finite(2)),
            Ok(Weight::Finite(2))
        );
    }

    #[test]
    fn min_plus_sentinels() {
        let a = MinPlus;
        assert_eq!(a.plus(&a.invalid_route(), &Weight::Finite(4)), Ok(Weight::Finite(4)));
        assert_eq!(a.times(&a.invalid_edge(), &Weight::Finite(4), 0, 1), a.invalid_route());
        assert_eq!(a.times(&Weight::Finite(4), &a.invalid_route(), 0, 1), a.invalid_route());
    }

    #[test]
    fn min_plus_parses_naturals_only() {
        assert_eq!(MinPlus.parse_edge_input(" 3 "), Ok(Weight::Finite(3)));
        assert!(!MinPlus.validate_edge_input("-1"));
        assert!(!MinPlus.validate_edge_input("inf"));
        assert!(!MinPlus.validate_edge_input(""));
    }

    // MaxMin tests

    #[test]
    fn max_min_prefers_wider_routes() {
        assert_eq!(
            MaxMin.plus(&Weight::Finite(5), &Weight::Finite(2)),
            Ok(Weight::Finite(5))
        );
    }

    #[test]
    fn max_min_sentinels() {
        let a = MaxMin;
        assert_eq!(a.plus(&a.invalid_route(), &Weight::Finite(4)), Ok(Weight::Finite(4)));
        assert_eq!(a.times(&a.invalid_edge(), &Weight::Finite(4), 0, 1), a.invalid_route());
        assert_eq!(a.times(&Weight::Finite(3), &a.identity_route(), 0, 1), Weight::Finite(3));
    }

    proptest! {
        #[test]
        fn min_plus_is_selective(a in weight(), b in weight()) {
            let r = MinPlus.plus(&a, &b).unwrap();
            prop_assert!(r == a || r == b);
            prop_assert_eq!(r, MinPlus.plus(&b, &a).unwrap());
        }

        #[test]
        fn max_min_is_selective(a in weight(), b in weight()) {
            let r = MaxMin.plus(&a, &b).unwrap();
            prop_assert!(r == a || r == b);
            prop_assert_eq!(r, MaxMin.plus(&b, &a).unwrap());
        }

        #[test]
        fn invalid_route_is_plus_identity(a in weight()) {
            prop_assert_eq!(MinPlus.plus(&MinPlus.invalid_route(), &a).unwrap(), a);
            prop_assert_eq!(MaxMin.plus(&MaxMin.invalid_route(), &a).unwrap(), a);
        }
    }
}
