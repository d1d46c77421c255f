// Per-tick path planner
//
// One call to `Planner::update` builds a fresh GridMap, runs a bounded
// best-first expansion from the head, and turns the first step of the
// reconstructed path into a move. Nothing survives between calls except the
// random source.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::config::{ArenaConfig, Config, EmergencyConfig, RediscoveryPolicy, SearchConfig};
use crate::error::PlanError;
use crate::grid::GridMap;
use crate::node::{NodeId, SearchNode};
use crate::priority::{DuplicatePolicy, PriorityQueue};
use crate::types::{Coord, Direction};

/// Result of one planning episode
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Move to issue, None means keep the current heading
    pub primary: Option<Direction>,
    /// Extra corrective move when the heading runs into a wall
    pub emergency: Option<Direction>,
    /// Node the search stopped on, None when the queue ran dry
    pub terminal: Option<NodeId>,
    /// Expansions performed
    pub iterations: u32,
    /// The episode's field, kept for diagnostics
    pub grid: GridMap,
}

impl PlanOutcome {
    pub fn terminal_node(&self) -> Option<&SearchNode> {
        self.terminal.and_then(|id| self.grid.node(id))
    }

    /// True when the search stopped on the target
    pub fn reached_target(&self) -> bool {
        self.terminal_node().map(|n| n.heuristic == 0).unwrap_or(false)
    }

    /// Planned cells from the head side to the terminal node
    pub fn planned_path(&self) -> Vec<Coord> {
        self.terminal
            .map(|id| self.grid.path_from(id))
            .unwrap_or_default()
    }
}

/// Path planner with static configuration and an explicit random source
pub struct Planner {
    arena: ArenaConfig,
    search: SearchConfig,
    emergency: EmergencyConfig,
    rng: StdRng,
}

impl Planner {
    /// Creates a planner seeded from `search.rng_seed`, or from OS entropy when unset
    pub fn new(config: &Config) -> Self {
        let rng = match config.search.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &Config, rng: StdRng) -> Self {
        Planner {
            arena: config.arena,
            search: config.search.clone(),
            emergency: config.emergency.clone(),
            rng,
        }
    }

    /// Plans one tick.
    ///
    /// # Arguments
    /// * `head` - Head cell, must lie inside the arena
    /// * `heading` - Current heading, None before the first move
    /// * `target` - Goal cell, must lie inside the arena
    /// * `obstacles` - Cells to avoid; may be empty
    ///
    /// # Returns
    /// * `Ok(PlanOutcome)` - Moves may be None; that is not an error
    /// * `Err(PlanError)` - Out-of-bounds input or no usable target
    pub fn update(
        &mut self,
        head: Coord,
        heading: Option<Direction>,
        target: Coord,
        obstacles: &[Coord],
    ) -> Result<PlanOutcome, PlanError> {
        let mut grid = GridMap::build(
            self.arena.width,
            self.arena.height,
            head,
            target,
            obstacles,
            self.search.max_retarget_attempts,
            &mut self.rng,
        )?;

        let emergency = self.emergency_move(head, heading);

        let start = grid.add_node(SearchNode::with_cost(
            head.x,
            head.y,
            grid.obstacle_value(),
            0,
        ));
        let (terminal, iterations) = self.search(&mut grid, start);

        let primary = match Self::first_step(&grid, terminal, head) {
            Some(dir) => Some(dir),
            None => {
                let fallback =
                    Self::fallback_move(&grid, head, heading, grid.target_position());
                debug!(
                    "search from {} made no progress after {} iterations, fallback {:?}",
                    head, iterations, fallback
                );
                fallback
            }
        };

        Ok(PlanOutcome {
            primary,
            emergency,
            terminal,
            iterations,
            grid,
        })
    }

    /// Bounded best-first expansion. Returns the node it stopped on.
    fn search(&mut self, grid: &mut GridMap, start: NodeId) -> (Option<NodeId>, u32) {
        let policy = if self.search.suppress_duplicate_pushes {
            DuplicatePolicy::Suppress
        } else {
            DuplicatePolicy::Allow
        };
        let mut queue = PriorityQueue::new(policy);
        let obstacle = grid.obstacle_value();
        let relax = self.search.rediscovery == RediscoveryPolicy::RelaxIfBetter;

        let mut current = Some(start);
        let mut iterations = 0;
        while let Some(id) = current {
            let Some(node) = grid.node(id) else { break };
            if node.heuristic == 0 || iterations >= self.search.max_iterations {
                break;
            }
            iterations += 1;
            let next_cost = node.cost_from_origin.unwrap_or(0) + 1;

            for coord in grid.neighbors_of(id, &mut self.rng) {
                let Some(neighbor_id) = grid.node_id_at(coord) else {
                    continue;
                };
                if neighbor_id == id {
                    continue;
                }
                let Some(neighbor) = grid.node_mut(neighbor_id) else {
                    continue;
                };
                if neighbor.heuristic == obstacle {
                    continue;
                }
                if relax && neighbor.cost_from_origin.is_some_and(|c| c <= next_cost) {
                    continue;
                }
                discover(neighbor, id, next_cost, start);
                let priority = next_cost + neighbor.heuristic;
                queue.push(priority as usize, neighbor_id);
            }

            current = queue.pop();
        }

        (current, iterations)
    }

    /// Walks predecessors back from `terminal` and maps the cell next to the
    /// origin onto a direction. None when that cell is not one step from `head`.
    fn first_step(grid: &GridMap, terminal: Option<NodeId>, head: Coord) -> Option<Direction> {
        let mut cursor = terminal?;
        let mut last = None;
        let mut budget = grid.cell_count();
        while budget > 0 {
            let Some(pred) = grid.node(cursor).and_then(|n| n.predecessor) else {
                break;
            };
            budget -= 1;
            last = Some(cursor);
            cursor = pred;
        }

        let node = grid.node(last?)?;
        Direction::from_delta(node.x - head.x, node.y - head.y)
    }

    /// Turn onto the other axis, towards the target. Needs a heading.
    fn fallback_move(
        grid: &GridMap,
        head: Coord,
        heading: Option<Direction>,
        target: Coord,
    ) -> Option<Direction> {
        let heading = heading?;
        let candidate = if heading.is_horizontal() {
            match (target.y - head.y).signum() {
                -1 => Direction::Up,
                1 => Direction::Down,
                _ => return None,
            }
        } else {
            match (target.x - head.x).signum() {
                -1 => Direction::Left,
                1 => Direction::Right,
                _ => return None,
            }
        };

        if Self::is_safe_move(grid, head, candidate) {
            Some(candidate)
        } else {
            None
        }
    }

    /// A move is unsafe when it leaves the arena or enters a hard obstacle
    pub fn is_safe_move(grid: &GridMap, head: Coord, dir: Direction) -> bool {
        match grid.heuristic_at(dir.apply(&head)) {
            Some(h) => h != grid.obstacle_value(),
            None => false,
        }
    }

    /// Perpendicular escape when the current heading is about to hit a wall.
    /// Independent of the search; None when there is nothing to correct.
    pub fn emergency_move(&mut self, head: Coord, heading: Option<Direction>) -> Option<Direction> {
        if !self.emergency.enabled {
            return None;
        }
        let heading = heading?;

        let safe: Vec<Direction> = Direction::all()
            .into_iter()
            .filter(|dir| !self.near_boundary(head, *dir))
            .collect();
        if safe.len() == 4 || safe.contains(&heading) {
            return None;
        }

        let candidates: Vec<Direction> = heading
            .perpendicular()
            .into_iter()
            .filter(|dir| safe.contains(dir))
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    fn near_boundary(&self, head: Coord, dir: Direction) -> bool {
        let margin = self.emergency.boundary_margin;
        match dir {
            Direction::Left => head.x <= margin,
            Direction::Right => head.x >= self.arena.width - 1 - margin,
            Direction::Up => head.y <= margin,
            Direction::Down => head.y >= self.arena.height - 1 - margin,
        }
    }
}

/// Records that `node` was reached from `from` at `cost`.
///
/// Callers decide whether the discovery is worth recording; under
/// `AlwaysOverwrite` every one is, so recorded costs are not shortest
/// distances. A predecessor pointing at the origin is never replaced, which
/// pins the first step.
fn discover(node: &mut SearchNode, from: NodeId, cost: u32, origin: NodeId) {
    node.cost_from_origin = Some(cost);
    if node.predecessor != Some(origin) {
        node.predecessor = Some(from);
    }
}
