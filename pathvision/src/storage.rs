/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Routing problems on disk.
//!
//! A [`RoutingProblem`] names its algebra instead of embedding it, so
//! edge weights are kept as JSON values until the name has been
//! resolved against the catalogue and the concrete edge type is known.

use std::path::Path;
use std::path::PathBuf;

use path_algebra::NodeId;
use path_algebra::PathAlgebra;
use routing::graph::circular_position;
use routing::Graph;
use routing::GraphError;
use routing::Matrix;
use routing::Position;
use serde::Deserialize;
use serde::Serialize;

use crate::catalogue::AlgebraChoice;
use crate::catalogue::AlgebraKind;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed routing problem")]
    Json(#[from] serde_json::Error),

    #[error("unknown algebra reference `{0}`")]
    UnknownAlgebraReference(String),

    #[error("edge {from} -> {to} is not a valid {algebra} edge")]
    EdgeWeight {
        from: NodeId,
        to: NodeId,
        algebra: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One directed edge with its weight in the algebra's serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: serde_json::Value,
}

/// Everything needed to rebuild an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingProblem {
    /// Name of the base algebra, without the path-tracking suffix.
    pub algebra: String,
    #[serde(default)]
    pub track_paths: bool,
    pub source: NodeId,
    pub positions: Vec<Position>,
    /// Nodes whose label is hidden.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_labels: Vec<NodeId>,
    pub edges: Vec<EdgeRecord>,
}

impl RoutingProblem {
    /// Capture `graph` as a problem over `choice`.
    pub fn from_graph<E: Serialize>(
        choice: AlgebraChoice,
        graph: &Graph<E>,
    ) -> Result<Self, serde_json::Error> {
        let edges = graph
            .edges()
            .map(|(from, to, weight)| {
                Ok(EdgeRecord {
                    from,
                    to,
                    weight: serde_json::to_value(weight)?,
                })
            })
            .collect::<Result<_, serde_json::Error>>()?;
        let hidden_labels = graph
            .nodes()
            .filter(|&n| graph.is_labelled(n) == Ok(false))
            .collect();
        Ok(Self {
            algebra: choice.kind.name(),
            track_paths: choice.track_paths,
            source: graph.source(),
            positions: graph.positions().to_vec(),
            hidden_labels,
            edges,
        })
    }

    /// A problem laid out on a circle from an adjacency matrix whose
    /// `None` entries are absent edges.
    pub fn from_adjacency(
        choice: AlgebraChoice,
        adjacency: Matrix<Option<serde_json::Value>>,
        source: NodeId,
    ) -> Self {
        let n = adjacency.len();
        let edges = adjacency
            .into_iter()
            .enumerate()
            .flat_map(|(from, row)| {
                row.into_iter()
                    .enumerate()
                    .filter_map(move |(to, weight)| Some(EdgeRecord { from, to, weight: weight? }))
            })
            .collect();
        Self {
            algebra: choice.kind.name(),
            track_paths: choice.track_paths,
            source,
            positions: (0..n).map(|i| circular_position(i, n)).collect(),
            hidden_labels: Vec::new(),
            edges,
        }
    }

    /// Resolve the stored algebra name against the catalogue.
    pub fn choice(&self) -> Result<AlgebraChoice, StorageError> {
        let kind = AlgebraKind::from_name(&self.algebra)
            .ok_or_else(|| StorageError::UnknownAlgebraReference(self.algebra.clone()))?;
        Ok(AlgebraChoice::new(kind, self.track_paths))
    }

    /// Rebuild the graph with edge weights decoded for `algebra`.
    pub fn graph<A: PathAlgebra>(&self, algebra: &A) -> Result<Graph<A::Edge>, StorageError> {
        let mut graph = Graph::with_positions(self.positions.clone())?;
        graph.set_source(self.source)?;
        for &node in &self.hidden_labels {
            if graph.is_labelled(node)? {
                graph.toggle_label(node)?;
            }
        }
        for edge in &self.edges {
            let weight = serde_json::from_value::<A::Edge>(edge.weight.clone()).map_err(|source| {
                StorageError::EdgeWeight {
                    from: edge.from,
                    to: edge.to,
                    algebra: algebra.name(),
                    source,
                }
            })?;
            graph.add_edge(edge.from, edge.to, weight)?;
        }
        Ok(graph)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let problem: Self = serde_json::from_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            algebra = %problem.algebra,
            nodes = problem.positions.len(),
            edges = problem.edges.len(),
            "loaded routing problem"
        );
        Ok(problem)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), algebra = %self.algebra, "saved routing problem");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use path_algebra::MinPlus;
    use path_algebra::Weight;
    use serde_json::json;

    use super::*;

    fn problem() -> RoutingProblem {
        RoutingProblem {
            algebra: "(N, min, +)".to_string(),
            track_paths: true,
            source: 1,
            positions: vec![Position::new(0.0, 0.0), Position::new(1.0, 0.0)],
            hidden_labels: vec![0],
            edges: vec![EdgeRecord {
                from: 0,
                to: 1,
                weight: json!("3"),
            }],
        }
    }

    #[test]
    fn graph_round_trips_through_a_problem() {
        let p = problem();
        let choice = p.choice().unwrap();
        assert_eq!(choice, AlgebraChoice::new(AlgebraKind::ShortestPath, true));
        let graph = p.graph(&MinPlus).unwrap();
        assert_eq!(graph.source(), 1);
        assert_eq!(graph.is_labelled(0), Ok(false));
        assert_eq!(graph.edge_weight(0, 1), Some(&Weight::Finite(3)));
        assert_eq!(RoutingProblem::from_graph(choice, &graph).unwrap(), p);
    }

    #[test]
    fn unknown_algebra_is_reported_by_name() {
        let mut p = problem();
        p.algebra = "(N, +, +)".to_string();
        assert!(matches!(
            p.choice(),
            Err(StorageError::UnknownAlgebraReference(name)) if name == "(N, +, +)"
        ));
    }

    #[test]
    fn bad_weights_name_their_edge() {
        let mut p = problem();
        p.edges[0].weight = json!("e");
        assert!(matches!(
            p.graph(&MinPlus),
            Err(StorageError::EdgeWeight { from: 0, to: 1, .. })
        ));
    }

    #[test]
    fn adjacency_problems_skip_absent_edges() {
        let choice = AlgebraChoice::new(AlgebraKind::Pathological, false);
        let p = RoutingProblem::from_adjacency(
            choice,
            vec![vec![None, Some(json!("e"))], vec![None, None]],
            1,
        );
        assert_eq!(p.algebra, "Pathological");
        assert_eq!(p.edges.len(), 1);
        assert_eq!(p.positions.len(), 2);
        assert_eq!(p.source, 1);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problem.json");
        problem().save(&path).unwrap();
        assert_eq!(RoutingProblem::load(&path).unwrap(), problem());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RoutingProblem::load(dir.path().join("absent.json")),
            Err(StorageError::Io { .. })
        ));
    }
}
