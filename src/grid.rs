// Heuristic distance field over the arena for one planning episode
//
// Cells are written first-write-wins in this order:
// 1. obstacles, then a danger ring around each of them
// 2. the target (always 0, overrides whatever is there)
// 3. a danger ring along the arena border
// 4. pocket check on the target, re-selecting it when boxed in
// 5. Manhattan distance to the target for everything still empty

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::PlanError;
use crate::node::{NodeId, SearchNode};
use crate::types::Coord;

/// Owns every SearchNode of one episode, indexed by `x + width * y`.
/// Extra nodes (the search origin) are appended past the last cell.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    cells: Vec<Option<SearchNode>>,
    current_position: Coord,
    target_position: Coord,
    retargets: u32,
}

impl GridMap {
    /// Builds the field for `target`, re-selecting the target at most
    /// `max_retargets` times when it sits in a pocket.
    ///
    /// # Arguments
    /// * `current` - Head position, never picked as a replacement target
    /// * `target` - Requested goal cell
    /// * `obstacles` - Blocked cells; out-of-bounds entries are ignored
    ///
    /// # Returns
    /// * `Err(PlanError::OutOfBounds)` for a head or target outside the arena
    /// * `Err(PlanError::NoValidTarget)` when re-selection runs out of attempts
    ///   or of open cells
    pub fn build<R: Rng + ?Sized>(
        width: i32,
        height: i32,
        current: Coord,
        target: Coord,
        obstacles: &[Coord],
        max_retargets: u32,
        rng: &mut R,
    ) -> Result<Self, PlanError> {
        for (what, c) in [("head", current), ("target", target)] {
            if !c.in_bounds(width, height) {
                return Err(PlanError::OutOfBounds {
                    what,
                    x: c.x,
                    y: c.y,
                    width,
                    height,
                });
            }
        }

        let mut target = target;
        let mut attempt = 0;
        loop {
            let mut map = GridMap::mark(width, height, current, target, obstacles);
            if !map.is_pocketed() {
                map.retargets = attempt;
                map.fill_distances();
                return Ok(map);
            }
            if attempt >= max_retargets {
                debug!("target {} still pocketed after {} re-selections", target, attempt);
                return Err(PlanError::NoValidTarget { attempts: attempt });
            }

            let Some(next) = map.pick_open_cell(rng) else {
                debug!("no open cell left to replace pocketed target {}", target);
                return Err(PlanError::NoValidTarget { attempts: attempt });
            };
            debug!("target {} is pocketed, re-selecting {}", target, next);
            target = next;
            attempt += 1;
        }
    }

    /// Steps 1 to 3: obstacles, danger rings and the target
    fn mark(width: i32, height: i32, current: Coord, target: Coord, obstacles: &[Coord]) -> Self {
        let mut map = GridMap {
            width,
            height,
            cells: vec![None; (width * height) as usize],
            current_position: current,
            target_position: target,
            retargets: 0,
        };
        let obstacle = map.obstacle_value();
        let danger = map.danger_value();

        // All obstacles go in before any ring so a ring never hides an obstacle
        for c in obstacles {
            map.write(*c, obstacle);
        }
        for c in obstacles.iter().filter(|c| c.in_bounds(width, height)) {
            for n in c.orthogonal() {
                map.write_if_empty(n, danger);
            }
        }

        map.write(target, 0);

        for x in 0..width {
            map.write_if_empty(Coord::new(x, 0), danger);
            map.write_if_empty(Coord::new(x, height - 1), danger);
        }
        for y in 0..height {
            map.write_if_empty(Coord::new(0, y), danger);
            map.write_if_empty(Coord::new(width - 1, y), danger);
        }

        map
    }

    /// A target with hard obstacles on two or more sides is treated as unreachable
    fn is_pocketed(&self) -> bool {
        let obstacle = self.obstacle_value();
        self.target_position
            .orthogonal()
            .iter()
            .filter(|c| self.heuristic_at(**c) == Some(obstacle))
            .count()
            >= 2
    }

    /// Uniform pick among cells that are still empty or below the open threshold.
    /// No connectivity to the head is checked.
    fn pick_open_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        let limit = self.open_threshold();
        let candidates: Vec<Coord> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Coord::new(x, y)))
            .filter(|c| *c != self.target_position && *c != self.current_position)
            .filter(|c| match self.cell(*c) {
                Some(node) => node.heuristic < limit,
                None => true,
            })
            .collect();
        candidates.choose(rng).copied()
    }

    fn fill_distances(&mut self) {
        let target = self.target_position;
        for y in 0..self.height {
            for x in 0..self.width {
                let c = Coord::new(x, y);
                self.write_if_empty(c, c.manhattan(&target));
            }
        }
    }

    fn write(&mut self, c: Coord, heuristic: u32) {
        if let Some(i) = self.index(c) {
            self.cells[i] = Some(SearchNode::new(c.x, c.y, heuristic));
        }
    }

    fn write_if_empty(&mut self, c: Coord, heuristic: u32) {
        if let Some(i) = self.index(c) {
            if self.cells[i].is_none() {
                self.cells[i] = Some(SearchNode::new(c.x, c.y, heuristic));
            }
        }
    }

    fn cell(&self, c: Coord) -> Option<&SearchNode> {
        self.index(c).and_then(|i| self.cells[i].as_ref())
    }

    /// Hard-obstacle sentinel, `2 * W * H`
    pub fn obstacle_value(&self) -> u32 {
        2 * self.width as u32 * self.height as u32
    }

    /// Passable but penalized cells next to obstacles and walls
    pub fn danger_value(&self) -> u32 {
        self.obstacle_value() / 4
    }

    /// Cells below this count as open space for target re-selection
    pub fn open_threshold(&self) -> u32 {
        self.obstacle_value() / 5
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn current_position(&self) -> Coord {
        self.current_position
    }

    /// The target the field was built for, which differs from the requested one
    /// after a pocket re-selection
    pub fn target_position(&self) -> Coord {
        self.target_position
    }

    pub fn retarget_count(&self) -> u32 {
        self.retargets
    }

    pub fn index(&self, c: Coord) -> Option<usize> {
        if c.in_bounds(self.width, self.height) {
            Some((c.x + self.width * c.y) as usize)
        } else {
            None
        }
    }

    pub fn heuristic_at(&self, c: Coord) -> Option<u32> {
        self.cell(c).map(|node| node.heuristic)
    }

    pub fn is_obstacle(&self, c: Coord) -> bool {
        self.heuristic_at(c) == Some(self.obstacle_value())
    }

    /// Node id of the populated cell at `c`
    pub fn node_id_at(&self, c: Coord) -> Option<NodeId> {
        self.index(c).filter(|i| self.cells[*i].is_some())
    }

    pub fn node(&self, id: NodeId) -> Option<&SearchNode> {
        self.cells.get(id).and_then(|n| n.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SearchNode> {
        self.cells.get_mut(id).and_then(|n| n.as_mut())
    }

    /// Appends a node that is not reachable through cell lookup
    pub fn add_node(&mut self, node: SearchNode) -> NodeId {
        self.cells.push(Some(node));
        self.cells.len() - 1
    }

    /// Memoized, shuffled neighbor coordinates of node `id`
    pub fn neighbors_of<R: Rng + ?Sized>(&mut self, id: NodeId, rng: &mut R) -> Vec<Coord> {
        let predecessor = self
            .node(id)
            .and_then(|n| n.predecessor)
            .and_then(|p| self.node(p))
            .map(|p| p.coord());
        let (width, height) = (self.width, self.height);
        match self.node_mut(id) {
            Some(node) => node.neighbors(width, height, predecessor, rng).to_vec(),
            None => Vec::new(),
        }
    }

    /// Cells on the predecessor chain ending at `terminal`, in walking order from
    /// the head side. The origin itself is left out. Capped at `W * H` steps.
    pub fn path_from(&self, terminal: NodeId) -> Vec<Coord> {
        let mut path = Vec::new();
        let mut cursor = terminal;
        while path.len() < self.cell_count() {
            let Some(node) = self.node(cursor) else { break };
            let Some(pred) = node.predecessor else { break };
            path.push(node.coord());
            cursor = pred;
        }
        path.reverse();
        path
    }
}
