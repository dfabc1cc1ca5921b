/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use path_algebra::lexicographic_product;
use path_algebra::pathological_adjacency;
use path_algebra::track_paths;
use path_algebra::Link;
use path_algebra::MaxMin;
use path_algebra::MinPlus;
use path_algebra::Pair;
use path_algebra::PathAlgebra;
use path_algebra::Pathological;
use path_algebra::Weight;
use routing::matrix;
use routing::Graph;
use routing::Position;
use routing::Simulation;

fn triangle<E>(a: E, b: E, direct: E) -> Graph<E> {
    let mut g = Graph::new();
    g.add_node(Position::new(1.0, 0.0));
    g.add_node(Position::new(2.0, 0.0));
    g.add_edge(0, 1, a).unwrap();
    g.add_edge(1, 2, b).unwrap();
    g.add_edge(0, 2, direct).unwrap();
    g.set_source(2).unwrap();
    g
}

#[test]
fn shortest_path_triangle() {
    let g = triangle(Weight::Finite(1), Weight::Finite(1), Weight::Finite(5));
    let mut sim = Simulation::start(MinPlus, &g, None).unwrap();
    assert_eq!(sim.convergence_time(), Some(2));
    sim.move_to_end();
    let distances = sim.source_column(g.source());
    assert_eq!(
        distances,
        vec![Weight::Finite(2), Weight::Finite(1), Weight::Finite(0)]
    );
}

#[test]
fn widest_path_direct_edge_dominates_only_when_wider() {
    for (direct, expected) in [(3, 3), (1, 2), (2, 2)] {
        let g = triangle(Weight::Finite(2), Weight::Finite(4), Weight::Finite(direct));
        let mut sim = Simulation::start(MaxMin, &g, None).unwrap();
        sim.move_to_end();
        assert_eq!(
            sim.source_column(2)[0],
            Weight::Finite(expected),
            "direct edge {direct}"
        );
    }
}

#[test]
fn shortest_widest_on_lexicographic_product() {
    let a = track_paths(lexicographic_product(MaxMin, MinPlus));
    let p = |c: u64, d: u64| Pair(Weight::Finite(c), Weight::Finite(d));
    // The direct edge is as wide as the two-hop route but longer.
    let g = triangle(p(3, 1), p(3, 1), p(3, 5));
    let mut sim = Simulation::start(a, &g, None).unwrap();
    sim.move_to_end();
    let column = sim.source_column(2);
    let best = &column[0];
    assert_eq!(best.value(), Some(&p(3, 2)));
    assert_eq!(best.path().unwrap().nodes(), &[0, 1]);
}

fn solve_pathological(n: usize) -> matrix::Solution<<Pathological as PathAlgebra>::Route> {
    let g = Graph::from_adjacency(
        pathological_adjacency(n)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|l| (l == Link::Present).then_some(l))
                    .collect()
            })
            .collect(),
    )
    .unwrap();
    let algebra = Pathological;
    let identity = matrix::create_identity_matrix(&algebra, n);
    let adjacency = matrix::create_adjacency_matrix(&algebra, &g);
    matrix::solve(&algebra, &identity, &adjacency, None).unwrap()
}

#[test]
fn pathological_gadget_converges_super_linearly() {
    for (n, rounds) in [(6, 7), (8, 13), (10, 21)] {
        let solution = solve_pathological(n);
        assert!(solution.converged, "{n} nodes");
        assert_eq!(solution.rounds(), rounds, "{n} nodes");
        assert!(solution.rounds() > n);
        assert!(solution.history.iter().all(|state| state.len() == n));
    }
}

#[test]
fn distances_serialize_in_the_persisted_form() {
    let g = triangle(Weight::Finite(1), Weight::Finite(1), Weight::Finite(5));
    let mut sim = Simulation::start(MinPlus, &g, None).unwrap();
    sim.move_to_end();
    assert_eq!(
        serde_json::to_value(sim.source_column(2)).unwrap(),
        serde_json::json!(["2", "1", "0"])
    );
    sim.move_to_start();
    assert_eq!(
        serde_json::to_value(sim.source_column(2)).unwrap(),
        serde_json::json!(["inf", "inf", "0"])
    );
}
