/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Time travel over a solver history.

use path_algebra::NodeId;
use path_algebra::PathAlgebra;
use path_algebra::SelectivityViolation;

use crate::graph::Graph;
use crate::matrix;
use crate::matrix::Matrix;

/// Navigation flags published on every cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub current_round: usize,
    pub can_step_forward: bool,
    pub can_step_backward: bool,
    pub can_jump_to_convergence: bool,
}

type Observer = Box<dyn FnMut(&StateChanged) + Send>;

/// A solver history with a read cursor.
///
/// Moving backward only moves the cursor. Moving forward past the last
/// computed state appends one more round.
pub struct Simulation<A: PathAlgebra> {
    algebra: A,
    identity: Matrix<A::Route>,
    adjacency: Matrix<A::Edge>,
    history: Vec<Matrix<A::Route>>,
    cursor: usize,
    observer: Option<Observer>,
}

impl<A: PathAlgebra> Simulation<A> {
    /// Solve `graph` under `algebra` with the given cap and put the
    /// cursor on the identity state.
    pub fn start(
        algebra: A,
        graph: &Graph<A::Edge>,
        cap: Option<usize>,
    ) -> Result<Self, SelectivityViolation> {
        let identity = matrix::create_identity_matrix(&algebra, graph.len());
        let adjacency = matrix::create_adjacency_matrix(&algebra, graph);
        let solution = matrix::solve(&algebra, &identity, &adjacency, cap)?;
        tracing::info!(
            algebra = algebra.name(),
            nodes = graph.len(),
            rounds = solution.rounds(),
            converged = solution.converged,
            "simulation started"
        );
        Ok(Self {
            algebra,
            identity,
            adjacency,
            history: solution.history,
            cursor: 0,
            observer: None,
        })
    }

    /// Register the observer notified on every cursor move.
    pub fn on_state_changed(&mut self, observer: impl FnMut(&StateChanged) + Send + 'static) {
        self.observer = Some(Box::new(observer));
        self.notify();
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn history(&self) -> &[Matrix<A::Route>] {
        &self.history
    }

    pub fn current_round(&self) -> usize {
        self.cursor
    }

    pub fn current_state(&self) -> &Matrix<A::Route> {
        &self.history[self.cursor]
    }

    /// The route from every node to `source` at the cursor.
    pub fn source_column(&self, source: NodeId) -> Vec<A::Route> {
        matrix::column(self.current_state(), source)
    }

    /// Whether the last two computed states are equal.
    pub fn has_converged(&self) -> bool {
        matrix::is_converged(&self.history)
    }

    /// Whether the state at the cursor equals its successor.
    pub fn is_converged_at_cursor(&self) -> bool {
        self.history
            .get(self.cursor + 1)
            .is_some_and(|next| *next == self.history[self.cursor])
    }

    pub fn convergence_time(&self) -> Option<usize> {
        self.has_converged().then(|| self.history.len() - 2)
    }

    fn last_distinct(&self) -> usize {
        self.history.len().saturating_sub(2)
    }

    pub fn state_changed(&self) -> StateChanged {
        StateChanged {
            current_round: self.cursor,
            can_step_forward: !self.has_converged() || self.cursor < self.last_distinct(),
            can_step_backward: self.cursor > 0,
            can_jump_to_convergence: self.has_converged() && self.cursor < self.last_distinct(),
        }
    }

    fn notify(&mut self) {
        let state = self.state_changed();
        if let Some(observer) = self.observer.as_mut() {
            observer(&state);
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
        self.notify();
    }

    pub fn move_back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.notify();
    }

    /// Step forward, computing one more round if the cursor is on the
    /// last state. A no-op once the cursor reaches the fixed point.
    pub fn move_forward(&mut self) -> Result<(), SelectivityViolation> {
        if !self.state_changed().can_step_forward {
            return Ok(());
        }
        if self.cursor + 1 >= self.history.len() {
            let next = matrix::iterate(
                &self.algebra,
                &self.history[self.history.len() - 1],
                &self.identity,
                &self.adjacency,
            )?;
            self.history.push(next);
        }
        self.cursor += 1;
        self.notify();
        Ok(())
    }

    /// Jump to the first state of the fixed point. A no-op while the
    /// history is still growing.
    pub fn move_to_end(&mut self) {
        if self.has_converged() {
            self.cursor = self.last_distinct();
            self.notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use path_algebra::pathological_adjacency;
    use path_algebra::Link;
    use path_algebra::MinPlus;
    use path_algebra::Pathological;
    use path_algebra::Weight;

    use super::*;
    use crate::graph::Position;

    fn triangle() -> Graph<Weight> {
        let mut g = Graph::new();
        g.add_node(Position::default());
        g.add_node(Position::default());
        g.add_edge(0, 1, Weight::Finite(1)).unwrap();
        g.add_edge(1, 2, Weight::Finite(1)).unwrap();
        g.add_edge(0, 2, Weight::Finite(5)).unwrap();
        g.set_source(2).unwrap();
        g
    }

    #[test]
    fn starts_at_identity() {
        let sim = Simulation::start(MinPlus, &triangle(), None).unwrap();
        assert_eq!(sim.current_round(), 0);
        assert_eq!(
            sim.source_column(2),
            vec![Weight::Infinite, Weight::Infinite, Weight::Finite(0)]
        );
        assert_eq!(
            sim.state_changed(),
            StateChanged {
                current_round: 0,
                can_step_forward: true,
                can_step_backward: false,
                can_jump_to_convergence: true,
            }
        );
    }

    #[test]
    fn walks_to_convergence_and_back() {
        let mut sim = Simulation::start(MinPlus, &triangle(), None).unwrap();
        sim.move_to_end();
        assert_eq!(sim.current_round(), 2);
        assert_eq!(sim.convergence_time(), Some(2));
        assert!(sim.is_converged_at_cursor());
        assert!(!sim.state_changed().can_step_forward);
        assert_eq!(
            sim.source_column(2),
            vec![Weight::Finite(2), Weight::Finite(1), Weight::Finite(0)]
        );

        sim.move_forward().unwrap();
        assert_eq!(sim.current_round(), 2);

        sim.move_back();
        assert_eq!(sim.current_round(), 1);
        assert!(!sim.is_converged_at_cursor());
        sim.move_to_start();
        sim.move_back();
        assert_eq!(sim.current_round(), 0);
    }

    #[test]
    fn forward_past_cap_extends_history() {
        let g = Graph::from_adjacency(
            pathological_adjacency(6)
                .into_iter()
                .map(|row| row.into_iter().map(|l| (l == Link::Present).then_some(l)).collect())
                .collect(),
        )
        .unwrap();
        let mut sim = Simulation::start(Pathological, &g, Some(2)).unwrap();
        assert_eq!(sim.history().len(), 2);
        assert!(!sim.has_converged());
        assert!(!sim.state_changed().can_jump_to_convergence);

        sim.move_forward().unwrap();
        sim.move_forward().unwrap();
        assert_eq!(sim.current_round(), 2);
        assert_eq!(sim.history().len(), 3);
    }

    #[test]
    fn observer_sees_every_move() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::start(MinPlus, &triangle(), None).unwrap();
        let sink = seen.clone();
        sim.on_state_changed(move |s| sink.lock().unwrap().push(s.current_round));
        sim.move_forward().unwrap();
        sim.move_to_end();
        sim.move_back();
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 1]);
    }
}
