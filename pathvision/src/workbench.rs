/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The editing session: a graph, the selected algebra and a
//! simulation over the graph's solver history.
//!
//! The concrete algebra is only known at runtime, so the typed state
//! lives behind the object-safe [`Session`] trait and edge values
//! cross it as text.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use path_algebra::EdgeParseError;
use path_algebra::NodeId;
use path_algebra::PathAlgebra;
use path_algebra::SelectivityViolation;
use routing::Graph;
use routing::GraphError;
use routing::Position;
use routing::Simulation;
use routing::StateChanged;

use crate::catalogue::AlgebraChoice;
use crate::storage::RoutingProblem;
use crate::storage::StorageError;
use crate::with_algebra;

#[derive(Debug, thiserror::Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Selectivity(#[from] SelectivityViolation),

    #[error(transparent)]
    EdgeInput(#[from] EdgeParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to encode edge weights")]
    Encode(#[from] serde_json::Error),
}

type SharedObserver = Arc<Mutex<dyn FnMut(&StateChanged) + Send>>;

/// Algebra-specific state behind a [`Workbench`].
trait Session: Send {
    fn choice(&self) -> AlgebraChoice;
    fn components(&self) -> Vec<String>;
    fn validate_edge_input(&self, input: &str) -> bool;

    fn graph_len(&self) -> usize;
    fn source(&self) -> NodeId;
    fn topology(&self) -> Graph<()>;
    fn add_node(&mut self, position: Position) -> NodeId;
    fn delete_node(&mut self, node: NodeId) -> Result<(), GraphError>;
    fn move_node(&mut self, node: NodeId, position: Position) -> Result<(), GraphError>;
    fn set_source(&mut self, node: NodeId) -> Result<(), GraphError>;
    fn toggle_label(&mut self, node: NodeId) -> Result<bool, GraphError>;
    fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError>;
    fn delete_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError>;
    fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<String>;
    fn set_edge_weight(
        &mut self,
        from: NodeId,
        to: NodeId,
        inputs: &[&str],
    ) -> Result<(), WorkbenchError>;
    fn reset_edge_weights(&mut self);
    fn to_problem(&self) -> Result<RoutingProblem, serde_json::Error>;

    /// Rebuild the simulation, cursor at round 0.
    fn restart(
        &mut self,
        cap: Option<usize>,
        observer: Option<SharedObserver>,
    ) -> Result<(), SelectivityViolation>;
    fn state_changed(&self) -> StateChanged;
    fn history_len(&self) -> usize;
    fn convergence_time(&self) -> Option<usize>;
    fn source_row(&self) -> Vec<String>;
    fn move_to_start(&mut self);
    fn move_back(&mut self);
    fn move_forward(&mut self) -> Result<(), SelectivityViolation>;
    fn move_to_end(&mut self);
}

struct TypedSession<A: PathAlgebra + Clone> {
    choice: AlgebraChoice,
    algebra: A,
    graph: Graph<A::Edge>,
    simulation: Simulation<A>,
}

impl<A: PathAlgebra + Clone> TypedSession<A> {
    fn start(
        choice: AlgebraChoice,
        algebra: A,
        graph: Graph<A::Edge>,
        cap: Option<usize>,
        observer: Option<SharedObserver>,
    ) -> Result<Self, SelectivityViolation> {
        let simulation = Self::simulate(&algebra, &graph, cap, observer)?;
        Ok(Self {
            choice,
            algebra,
            graph,
            simulation,
        })
    }

    fn simulate(
        algebra: &A,
        graph: &Graph<A::Edge>,
        cap: Option<usize>,
        observer: Option<SharedObserver>,
    ) -> Result<Simulation<A>, SelectivityViolation> {
        let mut simulation = Simulation::start(algebra.clone(), graph, cap)?;
        if let Some(observer) = observer {
            simulation.on_state_changed(move |state| {
                if let Ok(mut observer) = observer.lock() {
                    (&mut *observer)(state);
                }
            });
        }
        Ok(simulation)
    }
}

impl<A: PathAlgebra + Clone> Session for TypedSession<A> {
    fn choice(&self) -> AlgebraChoice {
        self.choice
    }

    fn components(&self) -> Vec<String> {
        self.algebra.components()
    }

    fn validate_edge_input(&self, input: &str) -> bool {
        self.algebra.validate_edge_input(input)
    }

    fn graph_len(&self) -> usize {
        self.graph.len()
    }

    fn source(&self) -> NodeId {
        self.graph.source()
    }

    fn topology(&self) -> Graph<()> {
        self.graph.map_edges(|_| ())
    }

    fn add_node(&mut self, position: Position) -> NodeId {
        self.graph.add_node(position)
    }

    fn delete_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.graph.delete_node(node)
    }

    fn move_node(&mut self, node: NodeId, position: Position) -> Result<(), GraphError> {
        self.graph.move_node(node, position)
    }

    fn set_source(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.graph.set_source(node)
    }

    fn toggle_label(&mut self, node: NodeId) -> Result<bool, GraphError> {
        self.graph.toggle_label(node)
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.graph.add_edge(from, to, self.algebra.default_edge())
    }

    fn delete_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.graph.delete_edge(from, to).map(|_| ())
    }

    fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<String> {
        self.graph.edge_weight(from, to).map(ToString::to_string)
    }

    fn set_edge_weight(
        &mut self,
        from: NodeId,
        to: NodeId,
        inputs: &[&str],
    ) -> Result<(), WorkbenchError> {
        let weight = self.algebra.parse_edge_components(inputs)?;
        self.graph.set_edge_weight(from, to, weight)?;
        Ok(())
    }

    fn reset_edge_weights(&mut self) {
        self.graph.reset_edge_weights(&self.algebra.default_edge());
    }

    fn to_problem(&self) -> Result<RoutingProblem, serde_json::Error> {
        RoutingProblem::from_graph(self.choice, &self.graph)
    }

    fn restart(
        &mut self,
        cap: Option<usize>,
        observer: Option<SharedObserver>,
    ) -> Result<(), SelectivityViolation> {
        self.simulation = Self::simulate(&self.algebra, &self.graph, cap, observer)?;
        Ok(())
    }

    fn state_changed(&self) -> StateChanged {
        self.simulation.state_changed()
    }

    fn history_len(&self) -> usize {
        self.simulation.history().len()
    }

    fn convergence_time(&self) -> Option<usize> {
        self.simulation.convergence_time()
    }

    fn source_row(&self) -> Vec<String> {
        self.simulation
            .source_column(self.graph.source())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn move_to_start(&mut self) {
        self.simulation.move_to_start()
    }

    fn move_back(&mut self) {
        self.simulation.move_back()
    }

    fn move_forward(&mut self) -> Result<(), SelectivityViolation> {
        self.simulation.move_forward()
    }

    fn move_to_end(&mut self) {
        self.simulation.move_to_end()
    }
}

fn session_from_topology(
    choice: AlgebraChoice,
    topology: &Graph<()>,
    cap: Option<usize>,
    observer: Option<SharedObserver>,
) -> Result<Box<dyn Session>, SelectivityViolation> {
    Ok(with_algebra!(choice, |algebra| {
        let graph = topology.map_edges(|_| algebra.default_edge());
        Box::new(TypedSession::start(choice, algebra, graph, cap, observer)?) as Box<dyn Session>
    }))
}

fn session_from_problem(
    problem: &RoutingProblem,
    cap: Option<usize>,
    observer: Option<SharedObserver>,
) -> Result<Box<dyn Session>, WorkbenchError> {
    let choice = problem.choice()?;
    Ok(with_algebra!(choice, |algebra| {
        let graph = problem.graph(&algebra)?;
        Box::new(TypedSession::start(choice, algebra, graph, cap, observer)?) as Box<dyn Session>
    }))
}

/// An editing session over one graph.
///
/// Every change to the graph's topology or weights discards the
/// solver history and rebuilds it, leaving the cursor at round 0.
/// Moving nodes, toggling labels and changing the source only affect
/// what is displayed.
pub struct Workbench {
    session: Box<dyn Session>,
    cap: Option<usize>,
    observer: Option<SharedObserver>,
}

impl Workbench {
    /// A single-node graph under `choice`. `cap` overrides the
    /// solver's default iteration cap.
    pub fn new(choice: AlgebraChoice, cap: Option<usize>) -> Result<Self, WorkbenchError> {
        let session = session_from_topology(choice, &Graph::new(), cap, None)?;
        Ok(Self {
            session,
            cap,
            observer: None,
        })
    }

    pub fn from_problem(problem: &RoutingProblem, cap: Option<usize>) -> Result<Self, WorkbenchError> {
        Ok(Self {
            session: session_from_problem(problem, cap, None)?,
            cap,
            observer: None,
        })
    }

    pub fn choice(&self) -> AlgebraChoice {
        self.session.choice()
    }

    pub fn algebra_name(&self) -> String {
        self.session.choice().name()
    }

    /// Component algebras whose edge values are entered separately.
    pub fn components(&self) -> Vec<String> {
        self.session.components()
    }

    pub fn validate_edge_input(&self, input: &str) -> bool {
        self.session.validate_edge_input(input)
    }

    /// Switch algebra. Every edge is reset to the new algebra's
    /// default edge.
    pub fn set_algebra(&mut self, choice: AlgebraChoice) -> Result<(), WorkbenchError> {
        let topology = self.session.topology();
        self.session = session_from_topology(choice, &topology, self.cap, self.observer.clone())?;
        tracing::info!(algebra = %choice.name(), "algebra selected");
        Ok(())
    }

    /// Register the observer told about every cursor move, including
    /// the reset that follows each recomputation.
    pub fn on_state_changed(
        &mut self,
        observer: impl FnMut(&StateChanged) + Send + 'static,
    ) -> Result<(), WorkbenchError> {
        let observer: SharedObserver = Arc::new(Mutex::new(observer));
        self.observer = Some(observer);
        self.recompute()
    }

    fn recompute(&mut self) -> Result<(), WorkbenchError> {
        self.session.restart(self.cap, self.observer.clone())?;
        Ok(())
    }

    // Graph

    pub fn len(&self) -> usize {
        self.session.graph_len()
    }

    pub fn is_empty(&self) -> bool {
        self.session.graph_len() == 0
    }

    pub fn source(&self) -> NodeId {
        self.session.source()
    }

    /// The graph without its weights.
    pub fn topology(&self) -> Graph<()> {
        self.session.topology()
    }

    pub fn add_node(&mut self, position: Position) -> Result<NodeId, WorkbenchError> {
        let node = self.session.add_node(position);
        self.recompute()?;
        Ok(node)
    }

    pub fn delete_node(&mut self, node: NodeId) -> Result<(), WorkbenchError> {
        self.session.delete_node(node)?;
        self.recompute()
    }

    pub fn move_node(&mut self, node: NodeId, position: Position) -> Result<(), WorkbenchError> {
        Ok(self.session.move_node(node, position)?)
    }

    pub fn set_source(&mut self, node: NodeId) -> Result<(), WorkbenchError> {
        Ok(self.session.set_source(node)?)
    }

    pub fn toggle_label(&mut self, node: NodeId) -> Result<bool, WorkbenchError> {
        Ok(self.session.toggle_label(node)?)
    }

    /// Add an edge carrying the algebra's default edge value.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), WorkbenchError> {
        self.session.add_edge(from, to)?;
        self.recompute()
    }

    pub fn delete_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), WorkbenchError> {
        self.session.delete_edge(from, to)?;
        self.recompute()
    }

    /// The edge value in the algebra's input syntax.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<String> {
        self.session.edge_weight(from, to)
    }

    /// Set an edge value from user input: one string, or one per
    /// component for composite algebras.
    pub fn set_edge_weight(
        &mut self,
        from: NodeId,
        to: NodeId,
        inputs: &[&str],
    ) -> Result<(), WorkbenchError> {
        self.session.set_edge_weight(from, to, inputs)?;
        self.recompute()
    }

    pub fn reset_edge_weights(&mut self) -> Result<(), WorkbenchError> {
        self.session.reset_edge_weights();
        self.recompute()
    }

    // Simulation

    pub fn state_changed(&self) -> StateChanged {
        self.session.state_changed()
    }

    pub fn current_round(&self) -> usize {
        self.session.state_changed().current_round
    }

    /// Number of states computed so far, the identity included.
    pub fn history_len(&self) -> usize {
        self.session.history_len()
    }

    pub fn convergence_time(&self) -> Option<usize> {
        self.session.convergence_time()
    }

    /// The route from every node to the source at the cursor.
    pub fn source_row(&self) -> Vec<String> {
        self.session.source_row()
    }

    pub fn move_to_start(&mut self) {
        self.session.move_to_start()
    }

    pub fn move_back(&mut self) {
        self.session.move_back()
    }

    pub fn move_forward(&mut self) -> Result<(), WorkbenchError> {
        Ok(self.session.move_forward()?)
    }

    pub fn move_to_end(&mut self) {
        self.session.move_to_end()
    }

    // Storage

    pub fn to_problem(&self) -> Result<RoutingProblem, WorkbenchError> {
        Ok(self.session.to_problem()?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WorkbenchError> {
        self.to_problem()?.save(path)?;
        Ok(())
    }

    /// Replace the session with the problem stored at `path`. On any
    /// error the current session is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), WorkbenchError> {
        let problem = RoutingProblem::load(path)?;
        self.session = session_from_problem(&problem, self.cap, self.observer.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::catalogue::AlgebraKind;

    use super::*;

    fn triangle(choice: AlgebraChoice) -> Workbench {
        let mut wb = Workbench::new(choice, None).unwrap();
        wb.add_node(Position::new(1.0, 0.0)).unwrap();
        wb.add_node(Position::new(2.0, 0.0)).unwrap();
        wb.add_edge(0, 1).unwrap();
        wb.add_edge(1, 2).unwrap();
        wb.add_edge(0, 2).unwrap();
        wb.set_source(2).unwrap();
        wb
    }

    fn shortest() -> AlgebraChoice {
        AlgebraChoice::new(AlgebraKind::ShortestPath, false)
    }

    #[test]
    fn single_node_converges_at_once() {
        let wb = Workbench::new(shortest(), None).unwrap();
        assert_eq!(wb.len(), 1);
        assert_eq!(wb.convergence_time(), Some(0));
        assert_eq!(wb.source_row(), vec!["0".to_string()]);
    }

    #[test]
    fn editing_rebuilds_the_history() {
        let mut wb = triangle(shortest());
        wb.set_edge_weight(0, 2, &["5"]).unwrap();
        assert_eq!(wb.convergence_time(), Some(2));
        assert_eq!(wb.current_round(), 0);
        wb.move_to_end();
        assert_eq!(wb.source_row(), vec!["2", "1", "0"]);

        wb.delete_edge(0, 1).unwrap();
        assert_eq!(wb.current_round(), 0);
        wb.move_to_end();
        assert_eq!(wb.source_row(), vec!["5", "1", "0"]);
    }

    #[test]
    fn moving_nodes_keeps_the_cursor() {
        let mut wb = triangle(shortest());
        wb.move_forward().unwrap();
        wb.move_node(0, Position::new(5.0, 5.0)).unwrap();
        assert!(!wb.toggle_label(0).unwrap());
        assert_eq!(wb.current_round(), 1);
    }

    #[test]
    fn changing_algebra_resets_weights() {
        let mut wb = triangle(shortest());
        wb.set_edge_weight(0, 2, &["5"]).unwrap();
        wb.set_algebra(AlgebraChoice::new(AlgebraKind::WidestPath, false))
            .unwrap();
        assert_eq!(wb.algebra_name(), "(N, max, min)");
        assert_eq!(wb.edge_weight(0, 2).as_deref(), Some("2"));
        assert_eq!(wb.source(), 2);
    }

    #[test]
    fn composite_edges_are_entered_per_component() {
        let mut wb = triangle(AlgebraChoice::new(AlgebraKind::ShortestWidest, true));
        assert_eq!(wb.components().len(), 2);
        wb.set_edge_weight(0, 1, &["3", "4"]).unwrap();
        assert_eq!(wb.edge_weight(0, 1).as_deref(), Some("(3, 4)"));
        assert!(matches!(
            wb.set_edge_weight(0, 1, &["3"]),
            Err(WorkbenchError::EdgeInput(EdgeParseError::ComponentCount { .. }))
        ));
        assert!(matches!(
            wb.set_edge_weight(2, 0, &["3", "4"]),
            Err(WorkbenchError::Graph(GraphError::UnknownEdge { from: 2, to: 0 }))
        ));
    }

    #[test]
    fn observer_sees_every_cursor_move() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut wb = triangle(shortest());
        let sink = Arc::clone(&seen);
        wb.on_state_changed(move |s| sink.lock().unwrap().push(*s))
            .unwrap();
        wb.move_forward().unwrap();
        wb.move_back();
        wb.add_node(Position::default()).unwrap();

        let seen = seen.lock().unwrap();
        let rounds: Vec<usize> = seen.iter().map(|s| s.current_round).collect();
        assert_eq!(rounds, vec![0, 1, 0, 0]);
        assert!(seen[1].can_step_backward);
    }

    #[test]
    fn failed_load_keeps_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problem.json");
        let mut wb = triangle(shortest());
        let mut problem = wb.to_problem().unwrap();
        problem.algebra = "(N, +, +)".to_string();
        problem.save(&path).unwrap();

        assert!(matches!(
            wb.load(&path),
            Err(WorkbenchError::Storage(StorageError::UnknownAlgebraReference(_)))
        ));
        assert_eq!(wb.algebra_name(), "(N, min, +)");
        assert_eq!(wb.len(), 3);
    }
}
