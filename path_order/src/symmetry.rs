/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Symmetry-breaking enumeration of path orders.
//!
//! Nodes whose transposition is a graph automorphism have
//! interchangeable paths, so orders that differ only by such a swap
//! converge identically. Instead of branching on every unknown pair,
//! the search picks one unknown pair `p`, `q` of a group's
//! representative `e` and decides the corresponding pair for every
//! movable member at once. Members are split into those ordered
//! `p < q` and those ordered `q < p`; only the sizes of the two halves
//! matter, so a group of `k` movable members yields `k + 1` branches
//! instead of `2^k`.

use path_algebra::NodeId;
use path_algebra::Path;
use routing::Graph;

use crate::order::OrderError;
use crate::order::PathPartialOrder;
use crate::order::Related;

/// Nodes currently interchangeable. Always sorted, at least two nodes.
pub type SymmetryGroup = Vec<NodeId>;

fn swap(n: NodeId, a: NodeId, b: NodeId) -> NodeId {
    if n == a {
        b
    } else if n == b {
        a
    } else {
        n
    }
}

/// Whether transposing `a` and `b` maps every edge of `graph` onto an
/// edge.
pub fn is_automorphism<E>(graph: &Graph<E>, a: NodeId, b: NodeId) -> bool {
    graph
        .edges()
        .all(|(from, to, _)| graph.has_edge(swap(from, a, b), swap(to, a, b)))
}

/// Classes of non-sink nodes that can be pairwise transposed without
/// changing the graph. Singleton classes are dropped.
pub fn initial_groups<E>(graph: &Graph<E>, sink: NodeId) -> Vec<SymmetryGroup> {
    let mut groups: Vec<SymmetryGroup> = Vec::new();
    for node in graph.nodes().filter(|&n| n != sink) {
        match groups
            .iter_mut()
            .find(|g| is_automorphism(graph, g[0], node))
        {
            Some(group) => group.push(node),
            None => groups.push(vec![node]),
        }
    }
    groups.retain(|g| g.len() >= 2);
    groups
}

/// One way of breaking a group: the assertions to make, and the
/// smaller groups that stay symmetric afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub assertions: Vec<(Path, Path)>,
    pub groups: Vec<SymmetryGroup>,
}

/// The `k + 1` splits of `group`, or `None` when its representative
/// has no unordered pair of paths left.
pub fn splits(order: &PathPartialOrder, group: &[NodeId]) -> Option<Vec<Split>> {
    let &e = group.first()?;
    let candidates = order.paths_from(e);

    let passed_through = |p: &Path, q: &Path| -> Vec<NodeId> {
        group
            .iter()
            .copied()
            .filter(|&m| p.nodes()[1..].contains(&m) || q.nodes()[1..].contains(&m))
            .collect()
    };

    let mut choice: Option<(usize, &Path, &Path)> = None;
    for (a, p) in candidates.iter().enumerate() {
        for q in &candidates[a + 1..] {
            if order.relation(p, q).ok()? != Related::Unknown {
                continue;
            }
            let cost = passed_through(p, q).len();
            if choice.map_or(true, |(best, _, _)| cost < best) {
                choice = Some((cost, *p, *q));
            }
        }
    }
    let (_, p, q) = choice?;

    let lost = passed_through(p, q);
    let movable: Vec<NodeId> = group.iter().copied().filter(|m| !lost.contains(m)).collect();
    let images: Vec<(Path, Path)> = movable
        .iter()
        .map(|&m| (p.swapped(e, m), q.swapped(e, m)))
        .collect();

    let splits = (0..=movable.len())
        .map(|i| {
            let assertions = images
                .iter()
                .enumerate()
                .map(|(j, (pm, qm))| {
                    if j < i {
                        (pm.clone(), qm.clone())
                    } else {
                        (qm.clone(), pm.clone())
                    }
                })
                .collect();
            let groups = [&movable[..i], &movable[i..]]
                .into_iter()
                .filter(|g| g.len() >= 2)
                .map(|g| g.to_vec())
                .collect();
            Split { assertions, groups }
        })
        .collect();
    Some(splits)
}

/// Make every assertion of `split`. Assertions already implied are
/// skipped. Returns `Ok(false)` if one contradicts the known order,
/// in which case the split is infeasible and `order` should be
/// discarded.
pub fn apply(order: &mut PathPartialOrder, split: &Split) -> Result<bool, OrderError> {
    for (p, q) in &split.assertions {
        match order.relation(p, q)? {
            Related::Unknown => order.assert_order(p, q)?,
            Related::LessThan => {}
            Related::GreaterThan | Related::EqualTo => return Ok(false),
        }
    }
    Ok(true)
}

struct WorkItem {
    order: PathPartialOrder,
    groups: Vec<SymmetryGroup>,
}

/// Depth-first enumeration of symmetry-broken refinements, as an
/// iterator of leaf orders. Each work item owns its own order, so the
/// iterator can be dropped or resumed between any two leaves.
pub struct SymmetrySearch {
    stack: Vec<WorkItem>,
    expanded: usize,
}

impl SymmetrySearch {
    pub fn new(order: PathPartialOrder, groups: Vec<SymmetryGroup>) -> Self {
        Self {
            stack: vec![WorkItem { order, groups }],
            expanded: 0,
        }
    }

    /// Number of work items taken off the stack so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}

impl Iterator for SymmetrySearch {
    type Item = Result<PathPartialOrder, OrderError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(mut item) = self.stack.pop() {
            self.expanded += 1;
            let Some(group) = item.groups.pop() else {
                return Some(Ok(item.order));
            };
            let Some(splits) = splits(&item.order, &group) else {
                // Nothing left to decide for this group.
                self.stack.push(item);
                continue;
            };
            // Reversed so that the first split is explored first.
            for split in splits.into_iter().rev() {
                let mut order = item.order.clone();
                match apply(&mut order, &split) {
                    Ok(true) => {
                        let mut groups = item.groups.clone();
                        groups.extend(split.groups);
                        self.stack.push(WorkItem { order, groups });
                    }
                    Ok(false) => {}
                    Err(e) => return Some(Err(e)),
                }
            }
        }
        None
    }
}
