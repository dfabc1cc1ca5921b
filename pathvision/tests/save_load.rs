/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A saved session reloads into the same simulation.

use pathvision::catalogue::AlgebraChoice;
use pathvision::catalogue::AlgebraKind;
use pathvision::RoutingProblem;
use pathvision::Workbench;
use routing::Position;

fn rows_until_fixed_point(wb: &mut Workbench) -> Vec<Vec<String>> {
    wb.move_to_start();
    let mut rows = vec![wb.source_row()];
    while wb.state_changed().can_step_forward {
        wb.move_forward().unwrap();
        rows.push(wb.source_row());
    }
    rows
}

fn diamond() -> Workbench {
    let choice = AlgebraChoice::new(AlgebraKind::ShortestWidest, true);
    let mut wb = Workbench::new(choice, None).unwrap();
    for x in 1..4 {
        wb.add_node(Position::new(x as f64, 0.0)).unwrap();
    }
    for (from, to, width, length) in [
        (0, 1, "5", "1"),
        (0, 2, "3", "1"),
        (1, 3, "2", "1"),
        (2, 3, "3", "4"),
    ] {
        wb.add_edge(from, to).unwrap();
        wb.set_edge_weight(from, to, &[width, length]).unwrap();
    }
    wb.set_source(3).unwrap();
    wb.toggle_label(1).unwrap();
    wb
}

#[test]
fn save_then_load_reproduces_the_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diamond.json");

    let mut original = diamond();
    let expected = rows_until_fixed_point(&mut original);
    original.save(&path).unwrap();

    let mut restored = Workbench::new(AlgebraChoice::default(), None).unwrap();
    restored.load(&path).unwrap();
    assert_eq!(restored.choice(), original.choice());
    assert_eq!(restored.len(), 4);
    assert_eq!(restored.source(), 3);
    assert_eq!(restored.edge_weight(2, 3).as_deref(), Some("(3, 4)"));
    assert_eq!(rows_until_fixed_point(&mut restored), expected);
    assert_eq!(restored.convergence_time(), original.convergence_time());
}

#[test]
fn stored_problem_names_the_base_algebra() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diamond.json");
    diamond().save(&path).unwrap();

    let problem = RoutingProblem::load(&path).unwrap();
    assert_eq!(problem.algebra, "(N, max, min)-x-(N, min, +)");
    assert!(problem.track_paths);
    assert_eq!(problem.hidden_labels, vec![1]);
    assert_eq!(problem.edges.len(), 4);
}
