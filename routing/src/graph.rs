/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::collections::BTreeMap;
use std::f64::consts::PI;

use path_algebra::NodeId;
use path_algebra::Path;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node {node} out of range for graph of size {size}")]
    UnknownNode { node: NodeId, size: usize },

    #[error("no edge {from} -> {to}")]
    UnknownEdge { from: NodeId, to: NodeId },

    #[error("cannot delete the last node of a graph")]
    LastNode,

    #[error("adjacency matrix must be square and non-empty, got {rows} rows")]
    BadAdjacency { rows: usize },
}

/// Display position of a node. Never read by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A directed graph on contiguous nodes `0..n` with edge values of
/// type `E`, a distinguished source node and per-node display data.
///
/// There is always at least one node, and the source is always one
/// of them. Deleting a node relabels the nodes above it downwards so
/// that identifiers stay contiguous.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph<E> {
    positions: Vec<Position>,
    labelled: Vec<bool>,
    edges: BTreeMap<(NodeId, NodeId), E>,
    source: NodeId,
}

impl<E> Default for Graph<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of node `i` of `n` on a circle of radius 2, starting at
/// the bottom and running clockwise.
pub fn circular_position(i: usize, n: usize) -> Position {
    let angle = -(i as f64 * 2.0 * PI / n as f64 + PI / 2.0);
    Position::new(2.0 * angle.cos(), 2.0 * angle.sin())
}

impl<E> Graph<E> {
    /// A graph with the single node 0, which is the source.
    pub fn new() -> Self {
        Self {
            positions: vec![Position::default()],
            labelled: vec![true],
            edges: BTreeMap::new(),
            source: 0,
        }
    }

    /// Build a graph from an adjacency matrix, `None` meaning no edge.
    /// Nodes are laid out on a circle and node 0 is the source.
    pub fn from_adjacency(matrix: Vec<Vec<Option<E>>>) -> Result<Self, GraphError> {
        let n = matrix.len();
        if n == 0 || matrix.iter().any(|row| row.len() != n) {
            return Err(GraphError::BadAdjacency { rows: n });
        }
        let mut edges = BTreeMap::new();
        for (i, row) in matrix.into_iter().enumerate() {
            for (j, weight) in row.into_iter().enumerate() {
                if let Some(weight) = weight {
                    edges.insert((i, j), weight);
                }
            }
        }
        Ok(Self {
            positions: (0..n).map(|i| circular_position(i, n)).collect(),
            labelled: vec![true; n],
            edges,
            source: 0,
        })
    }

    /// An edgeless graph with one node per position. Node 0 is the
    /// source.
    pub fn with_positions(positions: Vec<Position>) -> Result<Self, GraphError> {
        if positions.is_empty() {
            return Err(GraphError::BadAdjacency { rows: 0 });
        }
        Ok(Self {
            labelled: vec![true; positions.len()],
            positions,
            edges: BTreeMap::new(),
            source: 0,
        })
    }

    /// Node positions, indexed by node.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn nodes(&self) -> std::ops::Range<NodeId> {
        0..self.len()
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn position(&self, node: NodeId) -> Result<Position, GraphError> {
        self.check(node)?;
        Ok(self.positions[node])
    }

    pub fn is_labelled(&self, node: NodeId) -> Result<bool, GraphError> {
        self.check(node)?;
        Ok(self.labelled[node])
    }

    fn check(&self, node: NodeId) -> Result<(), GraphError> {
        if node < self.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode {
                node,
                size: self.len(),
            })
        }
    }

    // Node operations

    /// Add a node at `position`, returning its identifier.
    pub fn add_node(&mut self, position: Position) -> NodeId {
        self.positions.push(position);
        self.labelled.push(true);
        self.len() - 1
    }

    /// Delete `node` and every edge touching it. Nodes above it move
    /// down by one. If it was the source, node 0 becomes the source.
    pub fn delete_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.check(node)?;
        if self.len() == 1 {
            return Err(GraphError::LastNode);
        }
        self.positions.remove(node);
        self.labelled.remove(node);

        let relabel = |n: NodeId| if n > node { n - 1 } else { n };
        self.edges = std::mem::take(&mut self.edges)
            .into_iter()
            .filter(|((from, to), _)| *from != node && *to != node)
            .map(|((from, to), w)| ((relabel(from), relabel(to)), w))
            .collect();

        self.source = if self.source == node {
            0
        } else {
            relabel(self.source)
        };
        Ok(())
    }

    pub fn move_node(&mut self, node: NodeId, position: Position) -> Result<(), GraphError> {
        self.check(node)?;
        self.positions[node] = position;
        Ok(())
    }

    pub fn set_source(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.check(node)?;
        self.source = node;
        Ok(())
    }

    /// Flip whether `node`'s route is labelled, returning the new flag.
    pub fn toggle_label(&mut self, node: NodeId) -> Result<bool, GraphError> {
        self.check(node)?;
        self.labelled[node] = !self.labelled[node];
        Ok(self.labelled[node])
    }

    // Edge operations

    /// Add the edge `from -> to`, replacing any existing weight.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: E) -> Result<(), GraphError> {
        self.check(from)?;
        self.check(to)?;
        self.edges.insert((from, to), weight);
        Ok(())
    }

    pub fn delete_edge(&mut self, from: NodeId, to: NodeId) -> Result<E, GraphError> {
        self.edges
            .remove(&(from, to))
            .ok_or(GraphError::UnknownEdge { from, to })
    }

    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<&E> {
        self.edges.get(&(from, to))
    }

    pub fn set_edge_weight(&mut self, from: NodeId, to: NodeId, weight: E) -> Result<(), GraphError> {
        match self.edges.get_mut(&(from, to)) {
            Some(w) => {
                *w = weight;
                Ok(())
            }
            None => Err(GraphError::UnknownEdge { from, to }),
        }
    }

    /// Set every edge to `weight`.
    pub fn reset_edge_weights(&mut self, weight: &E)
    where
        E: Clone,
    {
        for w in self.edges.values_mut() {
            *w = weight.clone();
        }
    }

    /// Edges in `(from, to)` order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &E)> + '_ {
        self.edges.iter().map(|(&(from, to), w)| (from, to, w))
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.contains_key(&(from, to))
    }

    /// Convert every edge value, keeping topology and display data.
    pub fn map_edges<F, T>(&self, mut f: F) -> Graph<T>
    where
        F: FnMut(&E) -> T,
    {
        Graph {
            positions: self.positions.clone(),
            labelled: self.labelled.clone(),
            edges: self.edges.iter().map(|(&k, w)| (k, f(w))).collect(),
            source: self.source,
        }
    }

    /// All simple paths ending at `sink`, including the singleton
    /// `(sink)`. Paths start at their source node.
    ///
    /// The result is sorted by length, and paths of equal length by
    /// their reversed node sequence, so that paths sharing a tail are
    /// adjacent.
    pub fn simple_paths_to(&self, sink: NodeId) -> Result<Vec<Path>, GraphError> {
        self.check(sink)?;
        let mut predecessors = vec![Vec::new(); self.len()];
        for &(from, to) in self.edges.keys() {
            if from != to {
                predecessors[to].push(from);
            }
        }

        let mut paths = Vec::new();
        let mut stack = vec![Path::singleton(sink)];
        while let Some(path) = stack.pop() {
            let head = path.first().unwrap_or(sink);
            for &prev in &predecessors[head] {
                if !path.contains(prev) {
                    stack.push(path.prepend(prev));
                }
            }
            paths.push(path);
        }

        paths.sort_by(|p, q| {
            p.len()
                .cmp(&q.len())
                .then_with(|| p.nodes().iter().rev().cmp(q.nodes().iter().rev()))
        });
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph<u32> {
        let mut g = Graph::new();
        g.add_node(Position::new(1.0, 0.0));
        g.add_node(Position::new(0.0, 1.0));
        g.add_edge(0, 1, 1).unwrap();
        g.add_edge(1, 2, 1).unwrap();
        g.add_edge(0, 2, 5).unwrap();
        g
    }

    #[test]
    fn new_graph_has_one_source_node() {
        let g: Graph<u32> = Graph::new();
        assert_eq!(g.len(), 1);
        assert_eq!(g.source(), 0);
        assert_eq!(g.is_labelled(0), Ok(true));
    }

    #[test]
    fn delete_node_relabels_contiguously() {
        let mut g = triangle();
        g.set_source(2).unwrap();
        g.delete_node(1).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.source(), 1);
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 1, &5)]);
        assert_eq!(g.position(1), Ok(Position::new(0.0, 1.0)));
    }

    #[test]
    fn deleting_source_reassigns_it() {
        let mut g = triangle();
        g.set_source(1).unwrap();
        g.delete_node(1).unwrap();
        assert_eq!(g.source(), 0);
        assert!(g.source() < g.len());
    }

    #[test]
    fn last_node_cannot_be_deleted() {
        let mut g: Graph<u32> = Graph::new();
        assert_eq!(g.delete_node(0), Err(GraphError::LastNode));
        assert_eq!(
            g.delete_node(4),
            Err(GraphError::UnknownNode { node: 4, size: 1 })
        );
    }

    #[test]
    fn edge_editing() {
        let mut g = triangle();
        assert_eq!(g.edge_weight(0, 2), Some(&5));
        g.set_edge_weight(0, 2, 7).unwrap();
        assert_eq!(g.edge_weight(0, 2), Some(&7));
        assert_eq!(
            g.set_edge_weight(2, 0, 1),
            Err(GraphError::UnknownEdge { from: 2, to: 0 })
        );
        g.reset_edge_weights(&3);
        assert!(g.edges().all(|(_, _, w)| *w == 3));
        assert_eq!(g.delete_edge(0, 1), Ok(3));
        assert!(!g.has_edge(0, 1));
        assert!(g.add_edge(0, 9, 1).is_err());
    }

    #[test]
    fn with_positions_builds_edgeless_graph() {
        let g: Graph<u32> =
            Graph::with_positions(vec![Position::new(0.0, 0.0), Position::new(1.0, 1.0)]).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.edges().count(), 0);
        assert_eq!(g.positions()[1], Position::new(1.0, 1.0));
        assert!(Graph::<u32>::with_positions(Vec::new()).is_err());
    }

    #[test]
    fn toggle_label_flips() {
        let mut g = triangle();
        assert_eq!(g.toggle_label(1), Ok(false));
        assert_eq!(g.toggle_label(1), Ok(true));
    }

    #[test]
    fn from_adjacency_uses_circular_layout() {
        let g = Graph::from_adjacency(vec![
            vec![None, Some(1), None, None],
            vec![None, None, Some(2), None],
            vec![None, None, None, None],
            vec![Some(4), None, None, None],
        ])
        .unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(g.source(), 0);
        assert_eq!(g.edges().count(), 3);
        let p = g.position(0).unwrap();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y + 2.0).abs() < 1e-9);
        assert!(Graph::<u32>::from_adjacency(vec![]).is_err());
        assert!(Graph::from_adjacency(vec![vec![Some(1), None]]).is_err());
    }

    #[test]
    fn simple_paths_into_sink() {
        let g = triangle();
        let paths = g.simple_paths_to(2).unwrap();
        let expected: Vec<Path> = vec![
            Path::from(vec![2]),
            Path::from(vec![0, 2]),
            Path::from(vec![1, 2]),
            Path::from(vec![0, 1, 2]),
        ];
        assert_eq!(paths, expected);
    }

    #[test]
    fn simple_paths_skip_cycles() {
        let mut g: Graph<u32> = Graph::new();
        g.add_node(Position::default());
        g.add_edge(0, 1, 1).unwrap();
        g.add_edge(1, 0, 1).unwrap();
        g.add_edge(1, 1, 1).unwrap();
        let paths = g.simple_paths_to(0).unwrap();
        assert_eq!(paths, vec![Path::from(vec![0]), Path::from(vec![1, 0])]);
    }

    #[test]
    fn map_edges_keeps_topology() {
        let g = triangle().map_edges(|w| w * 10);
        assert_eq!(g.edge_weight(0, 2), Some(&50));
        assert_eq!(g.len(), 3);
    }
}
