// Search node records owned by a GridMap for one planning episode

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::Coord;

/// Index of a node inside its GridMap's arena
pub type NodeId = usize;

/// One cell of the search tree
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub x: i32,
    pub y: i32,
    /// Estimated distance to the target, or one of the obstacle/danger sentinels
    pub heuristic: u32,
    /// Cost accumulated from the search origin, None until discovered
    pub cost_from_origin: Option<u32>,
    /// Node this one was last reached from, used for path reconstruction
    pub predecessor: Option<NodeId>,
    neighbors: Option<Vec<Coord>>,
}

impl SearchNode {
    pub fn new(x: i32, y: i32, heuristic: u32) -> Self {
        SearchNode {
            x,
            y,
            heuristic,
            cost_from_origin: None,
            predecessor: None,
            neighbors: None,
        }
    }

    /// Creates an already-discovered node, used for the search origin
    pub fn with_cost(x: i32, y: i32, heuristic: u32, cost_from_origin: u32) -> Self {
        SearchNode {
            cost_from_origin: Some(cost_from_origin),
            ..SearchNode::new(x, y, heuristic)
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// Neighbor coordinates in random order, computed once and memoized.
    ///
    /// Keeps in-bounds cells only and drops the cell at `predecessor` (a one-step
    /// backtrack guard). The shuffle is the only tie-break between equal-priority
    /// moves. Since the result is memoized, `predecessor` only matters on the first
    /// call.
    pub fn neighbors<R: Rng + ?Sized>(
        &mut self,
        width: i32,
        height: i32,
        predecessor: Option<Coord>,
        rng: &mut R,
    ) -> &[Coord] {
        let here = self.coord();
        self.neighbors
            .get_or_insert_with(|| {
                let mut coords = here.orthogonal();
                coords.shuffle(rng);
                coords
                    .into_iter()
                    .filter(|c| c.in_bounds(width, height) && Some(*c) != predecessor)
                    .collect()
            })
            .as_slice()
    }
}
