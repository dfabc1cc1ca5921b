/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Node identifiers and concrete paths.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Nodes are identified by contiguous indices `0..n`.
pub type NodeId = usize;

/// An immutable sequence of nodes, first node first.
///
/// Ordering is lexicographic on the node sequence, so paths of equal
/// length compare the way their node lists do.
///
/// # Example
/// ```
/// use path_algebra::Path;
///
/// let p = Path::from(vec![2, 1, 0]);
/// assert_eq!(p.suffix(1), Path::from(vec![1, 0]));
/// assert_eq!(p.swapped(2, 1), Path::from(vec![1, 2, 0]));
/// ```
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize
)]
#[serde(transparent)]
pub struct Path(Vec<NodeId>);

impl Path {
    /// The empty path.
    pub fn empty() -> Self {
        Path(Vec::new())
    }

    /// The single-node path.
    pub fn singleton(node: NodeId) -> Self {
        Path(vec![node])
    }

    /// The nodes of the path, first node first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `node` occurs anywhere in the path.
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    /// The first node.
    pub fn first(&self) -> Option<NodeId> {
        self.0.first().copied()
    }

    /// The last node.
    pub fn last(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// A new path with `node` in front.
    pub fn prepend(&self, node: NodeId) -> Self {
        let mut nodes = Vec::with_capacity(self.0.len() + 1);
        nodes.push(node);
        nodes.extend_from_slice(&self.0);
        Path(nodes)
    }

    /// The path starting at position `start`.
    pub fn suffix(&self, start: usize) -> Self {
        Path(self.0[start.min(self.0.len())..].to_vec())
    }

    /// The image of this path under the transposition of `a` and `b`.
    pub fn swapped(&self, a: NodeId, b: NodeId) -> Self {
        Path(
            self.0
                .iter()
                .map(|&n| {
                    if n == a {
                        b
                    } else if n == b {
                        a
                    } else {
                        n
                    }
                })
                .collect(),
        )
    }

    /// Whether `other` is a proper suffix of this path.
    pub fn has_proper_suffix(&self, other: &Path) -> bool {
        other.len() < self.len() && self.0.ends_with(&other.0)
    }
}

impl From<Vec<NodeId>> for Path {
    fn from(nodes: Vec<NodeId>) -> Self {
        Path(nodes)
    }
}

impl FromIterator<NodeId> for Path {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", n)?;
        }
        write!(f, ")")
    }
}
