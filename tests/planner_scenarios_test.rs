// Planner scenario tests
//
// End-to-end checks of Planner::update on small arenas:
// - open-field moves head straight for the target
// - boxed-in heads take the only open exit
// - the primary move never enters an obstacle or leaves the arena
// - the emergency override only fires when the heading is walled
// - pocketed targets are replaced and still reached

use netsnake_ai::config::Config;
use netsnake_ai::planner::Planner;
use netsnake_ai::types::{Coord, Direction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn planner(width: i32, height: i32, seed: u64) -> Planner {
    Planner::with_rng(&Config::with_arena(width, height), StdRng::seed_from_u64(seed))
}

#[test]
fn test_corner_to_corner_on_open_field() {
    for seed in 0..20 {
        let mut p = planner(5, 5, seed);
        let outcome = p
            .update(Coord::new(0, 0), None, Coord::new(4, 4), &[])
            .expect("planning should succeed on an open field");

        assert!(
            matches!(outcome.primary, Some(Direction::Right) | Some(Direction::Down)),
            "Seed {}: expected right or down, got {:?}",
            seed,
            outcome.primary
        );
        assert!(outcome.reached_target(), "Seed {}: target not reached", seed);
        assert_eq!(outcome.terminal_node().map(|n| n.heuristic), Some(0));
    }
}

#[test]
fn test_interior_first_step_always_closes_distance() {
    // Border cells are danger cells, so only interior pairs are expected to
    // move straight at the target
    let cells: Vec<Coord> = (1..7)
        .flat_map(|y| (1..7).map(move |x| Coord::new(x, y)))
        .collect();

    for (i, head) in cells.iter().enumerate() {
        for target in &cells {
            if head == target {
                continue;
            }
            let mut p = planner(8, 8, i as u64);
            let outcome = p.update(*head, None, *target, &[]).unwrap();
            let dir = outcome
                .primary
                .unwrap_or_else(|| panic!("{} -> {}: no move", head, target));
            let next = dir.apply(head);
            assert_eq!(
                next.manhattan(target) + 1,
                head.manhattan(target),
                "{} -> {}: {} does not close the distance",
                head,
                target,
                dir
            );
        }
    }
}

#[test]
fn test_boxed_head_takes_only_exit() {
    let head = Coord::new(2, 2);
    let obstacles = [Coord::new(1, 2), Coord::new(3, 2), Coord::new(2, 1)];
    for seed in 0..20 {
        let mut p = planner(5, 5, seed);
        let outcome = p
            .update(head, Some(Direction::Left), Coord::new(2, 0), &obstacles)
            .unwrap();
        assert_eq!(
            outcome.primary,
            Some(Direction::Down),
            "Seed {}: the only open neighbor is below",
            seed
        );
        assert!(outcome.reached_target());
    }
}

#[test]
fn test_boxed_head_takes_only_exit_on_larger_arena() {
    let head = Coord::new(3, 3);
    let obstacles = [Coord::new(2, 3), Coord::new(4, 3), Coord::new(3, 2)];
    for seed in 0..20 {
        let mut p = planner(7, 7, seed);
        let outcome = p
            .update(head, Some(Direction::Up), Coord::new(3, 0), &obstacles)
            .unwrap();
        assert_eq!(outcome.primary, Some(Direction::Down), "Seed {}", seed);
    }
}

#[test]
fn test_primary_never_enters_obstacle() {
    let mut scatter = StdRng::seed_from_u64(2024);
    for seed in 0..200 {
        let head = Coord::new(scatter.random_range(0..10), scatter.random_range(0..10));
        let target = Coord::new(scatter.random_range(0..10), scatter.random_range(0..10));
        if head == target {
            continue;
        }
        let obstacles: Vec<Coord> = (0..15)
            .map(|_| Coord::new(scatter.random_range(0..10), scatter.random_range(0..10)))
            .filter(|c| *c != head && *c != target)
            .collect();

        let mut p = planner(10, 10, seed);
        let Ok(outcome) = p.update(head, Some(Direction::Up), target, &obstacles) else {
            continue;
        };
        if let Some(dir) = outcome.primary {
            let next = dir.apply(&head);
            assert!(
                next.in_bounds(10, 10),
                "Seed {}: {} leaves the arena from {}",
                seed,
                dir,
                head
            );
            assert!(
                !obstacles.contains(&next),
                "Seed {}: {} from {} enters an obstacle",
                seed,
                dir,
                head
            );
        }
    }
}

#[test]
fn test_emergency_ignores_heading_along_the_wall() {
    let mut p = planner(10, 10, 1);
    for y in 2..8 {
        for heading in [Direction::Up, Direction::Down] {
            let outcome = p
                .update(Coord::new(0, y), Some(heading), Coord::new(5, 5), &[])
                .unwrap();
            assert_eq!(
                outcome.emergency, None,
                "(0,{}) heading {} runs along the wall",
                y, heading
            );
        }
    }
}

#[test]
fn test_emergency_in_corner_heading_open_side() {
    let mut p = planner(10, 10, 1);
    let outcome = p
        .update(Coord::new(0, 0), Some(Direction::Down), Coord::new(5, 5), &[])
        .unwrap();
    assert_eq!(outcome.emergency, None);
}

#[test]
fn test_emergency_when_heading_into_wall() {
    let mut p = planner(10, 10, 1);
    let outcome = p
        .update(Coord::new(9, 4), Some(Direction::Right), Coord::new(5, 5), &[])
        .unwrap();
    assert!(matches!(
        outcome.emergency,
        Some(Direction::Up) | Some(Direction::Down)
    ));
}

#[test]
fn test_pocketed_target_is_replaced_and_reached() {
    let requested = Coord::new(5, 5);
    let obstacles = [Coord::new(4, 5), Coord::new(6, 5)];
    for seed in 0..50 {
        let mut p = planner(9, 9, seed);
        let outcome = p
            .update(Coord::new(1, 1), None, requested, &obstacles)
            .unwrap();

        let target = outcome.grid.target_position();
        assert_ne!(target, requested, "Seed {}", seed);
        assert_ne!(target, Coord::new(1, 1), "Seed {}: head picked as target", seed);
        assert!(outcome.grid.retarget_count() >= 1);
        assert!(outcome.primary.is_some(), "Seed {}: no move", seed);
        assert!(outcome.reached_target(), "Seed {}", seed);
    }
}

#[test]
fn test_repeated_updates_are_independent() {
    let mut p = planner(9, 9, 7);
    let head = Coord::new(3, 3);
    let target = Coord::new(3, 6);

    let first = p.update(head, Some(Direction::Up), target, &[]).unwrap();
    // A tick with a pocketed target must not leak into the next one
    let _ = p
        .update(head, None, Coord::new(6, 6), &[Coord::new(5, 6), Coord::new(7, 6)])
        .unwrap();
    let second = p.update(head, Some(Direction::Up), target, &[]).unwrap();

    assert_eq!(first.primary, Some(Direction::Down));
    assert_eq!(second.primary, Some(Direction::Down));
    assert_eq!(second.grid.target_position(), target);
    assert_eq!(second.grid.retarget_count(), 0);
    assert_eq!(
        first.terminal_node().and_then(|n| n.cost_from_origin),
        second.terminal_node().and_then(|n| n.cost_from_origin)
    );
}

#[test]
fn test_duplicate_pushes_allowed_still_plans() {
    let mut config = Config::with_arena(5, 5);
    config.search.suppress_duplicate_pushes = false;

    for seed in 0..20 {
        let mut p = Planner::with_rng(&config, StdRng::seed_from_u64(seed));
        let outcome = p
            .update(Coord::new(0, 0), None, Coord::new(4, 4), &[])
            .unwrap();
        assert!(
            matches!(outcome.primary, Some(Direction::Right) | Some(Direction::Down)),
            "Seed {}: expected right or down, got {:?}",
            seed,
            outcome.primary
        );
        assert!(outcome.reached_target(), "Seed {}", seed);

        let mut p = Planner::with_rng(&config, StdRng::seed_from_u64(seed));
        let boxed = p
            .update(
                Coord::new(2, 2),
                Some(Direction::Left),
                Coord::new(2, 0),
                &[Coord::new(1, 2), Coord::new(3, 2), Coord::new(2, 1)],
            )
            .unwrap();
        assert_eq!(boxed.primary, Some(Direction::Down), "Seed {}", seed);
    }
}
