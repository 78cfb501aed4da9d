#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first path planner that prefers open space over tight corridors.
//!
//! The primary search only admits cells whose four neighbours are free, except
//! within the first few steps from the head where a bold move may be the only
//! option. When the goal cannot be reached under that rule the planner picks
//! the unexplored cell that is closest to the goal and most open, and routes
//! to it without the lookahead restriction.

use std::collections::{BTreeSet, VecDeque};

use snake_autoplay_core::{Direction, GridPosition, GridSize};

/// Paths holding fewer positions than this may enter cramped cells.
const BOLD_PATH_LENGTH: u32 = 3;

/// Describes which target a [`Route`] leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// The route reaches the requested goal through open cells.
    Direct,
    /// The goal was out of reach under the lookahead rule; the route leads to a refuge cell.
    Refuge,
}

/// Ordered cells from the start to the route target, both inclusive.
///
/// A route whose start already equals the goal has no waypoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    waypoints: Vec<GridPosition>,
    target: GridPosition,
    kind: RouteKind,
}

impl Route {
    /// Cells visited by the route, beginning with the start.
    #[must_use]
    pub fn waypoints(&self) -> &[GridPosition] {
        &self.waypoints
    }

    /// Cell the route ends at.
    #[must_use]
    pub const fn target(&self) -> GridPosition {
        self.target
    }

    /// Whether the route reaches the goal or a refuge.
    #[must_use]
    pub const fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Number of waypoints in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the route has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Direction of the first move, if the route holds at least two waypoints.
    #[must_use]
    pub fn first_step(&self) -> Option<Direction> {
        match self.waypoints.as_slice() {
            [from, to, ..] => Direction::between(*from, *to),
            _ => None,
        }
    }
}

/// Reusable breadth-first planner.
///
/// Scratch buffers are kept between calls so that planning once per tick does
/// not reallocate for a grid of unchanged size.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    blocked: Vec<bool>,
    visited: Vec<bool>,
    parents: Vec<Option<GridPosition>>,
    lengths: Vec<u32>,
    queue: VecDeque<GridPosition>,
}

impl PathPlanner {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans a route from `start` to `goal` avoiding `obstacles`.
    ///
    /// Obstacles outside the grid are ignored. The goal is accepted as soon as
    /// it is adjacent to an expanded cell, even if it is listed as an obstacle.
    /// Returns `None` when neither the goal nor a refuge can be reached.
    pub fn plan(
        &mut self,
        start: GridPosition,
        goal: GridPosition,
        obstacles: &BTreeSet<GridPosition>,
        size: GridSize,
    ) -> Option<Route> {
        if start == goal {
            return Some(Route {
                waypoints: Vec::new(),
                target: goal,
                kind: RouteKind::Direct,
            });
        }

        self.load_obstacles(obstacles, size);

        if let Some(waypoints) = self.search(start, goal, size, true) {
            return Some(Route {
                waypoints,
                target: goal,
                kind: RouteKind::Direct,
            });
        }

        let refuge = self.select_refuge(goal, size)?;
        let waypoints = self.search(start, refuge, size, false)?;
        Some(Route {
            waypoints,
            target: refuge,
            kind: RouteKind::Refuge,
        })
    }

    fn load_obstacles(&mut self, obstacles: &BTreeSet<GridPosition>, size: GridSize) {
        let cell_count = size.cell_count();
        self.blocked.clear();
        self.blocked.resize(cell_count, false);
        for index in obstacles.iter().filter_map(|cell| size.index(*cell)) {
            self.blocked[index] = true;
        }
    }

    fn reset_search(&mut self, size: GridSize) {
        let cell_count = size.cell_count();
        self.visited.clear();
        self.visited.resize(cell_count, false);
        self.parents.clear();
        self.parents.resize(cell_count, None);
        self.lengths.clear();
        self.lengths.resize(cell_count, 0);
        self.queue.clear();
    }

    fn search(
        &mut self,
        start: GridPosition,
        goal: GridPosition,
        size: GridSize,
        lookahead: bool,
    ) -> Option<Vec<GridPosition>> {
        self.reset_search(size);

        let start_index = size.index(start)?;
        self.visited[start_index] = true;
        self.lengths[start_index] = 1;
        self.queue.push_back(start);

        while let Some(current) = self.queue.pop_front() {
            let Some(current_index) = size.index(current) else {
                continue;
            };
            let length = self.lengths[current_index];

            for direction in Direction::ALL {
                let next = current.step(direction);
                let Some(next_index) = size.index(next) else {
                    continue;
                };

                if next == goal {
                    return Some(self.trace(current, goal, size));
                }

                if self.visited[next_index] || self.blocked[next_index] {
                    continue;
                }

                if lookahead && length >= BOLD_PATH_LENGTH && !self.is_open(next, size) {
                    continue;
                }

                self.visited[next_index] = true;
                self.parents[next_index] = Some(current);
                self.lengths[next_index] = length + 1;
                self.queue.push_back(next);
            }
        }

        None
    }

    fn trace(&self, last: GridPosition, goal: GridPosition, size: GridSize) -> Vec<GridPosition> {
        let mut waypoints = vec![goal, last];
        let mut cursor = last;
        while let Some(parent) = size.index(cursor).and_then(|index| self.parents[index]) {
            waypoints.push(parent);
            cursor = parent;
        }
        waypoints.reverse();
        waypoints
    }

    /// Cell whose four neighbours are inside the grid and unobstructed.
    fn is_open(&self, cell: GridPosition, size: GridSize) -> bool {
        self.free_neighbors(cell, size) == Direction::ALL.len()
    }

    fn free_neighbors(&self, cell: GridPosition, size: GridSize) -> usize {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| size.index(cell.step(direction)))
            .filter(|index| !self.blocked[*index])
            .count()
    }

    /// Unexplored free cell minimising `distance - 0.5 * free_neighbours`.
    ///
    /// Scores are doubled to stay in integers; ties go to the lowest column,
    /// then the lowest row.
    fn select_refuge(&self, goal: GridPosition, size: GridSize) -> Option<GridPosition> {
        size.positions()
            .filter(|cell| {
                size.index(*cell)
                    .is_some_and(|index| !self.visited[index] && !self.blocked[index])
            })
            .min_by_key(|cell| {
                let distance = i64::from(cell.manhattan_distance(goal));
                let free = i64::try_from(self.free_neighbors(*cell, size)).unwrap_or(0);
                (2 * distance - free, *cell)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cells: &[(i32, i32)]) -> BTreeSet<GridPosition> {
        cells
            .iter()
            .map(|&(column, row)| GridPosition::new(column, row))
            .collect()
    }

    #[test]
    fn free_neighbors_counts_walls_and_edges() {
        let mut planner = PathPlanner::new();
        let size = GridSize::new(4, 4);
        planner.load_obstacles(&set(&[(1, 0), (2, 1)]), size);

        assert_eq!(planner.free_neighbors(GridPosition::new(0, 0), size), 1);
        assert_eq!(planner.free_neighbors(GridPosition::new(1, 1), size), 2);
        assert_eq!(planner.free_neighbors(GridPosition::new(2, 2), size), 3);
        assert!(planner.is_open(GridPosition::new(1, 2), size));
        assert!(!planner.is_open(GridPosition::new(2, 2), size));
    }

    #[test]
    fn refuge_prefers_closer_then_more_open_cells() {
        let mut planner = PathPlanner::new();
        let size = GridSize::new(5, 5);
        planner.load_obstacles(&BTreeSet::new(), size);
        planner.reset_search(size);
        for cell in size.positions() {
            if cell.column() < 2 {
                if let Some(index) = size.index(cell) {
                    planner.visited[index] = true;
                }
            }
        }

        // Goal (4, 4) is a corner: it scores 0 - 2, its neighbours 2 - 3.
        assert_eq!(
            planner.select_refuge(GridPosition::new(4, 4), size),
            Some(GridPosition::new(4, 4))
        );
        // Three cells tie at 2 - 4 once the goal itself is explored.
        if let Some(index) = size.index(GridPosition::new(3, 2)) {
            planner.visited[index] = true;
        }
        assert_eq!(
            planner.select_refuge(GridPosition::new(3, 2), size),
            Some(GridPosition::new(2, 2))
        );
    }

    #[test]
    fn refuge_is_none_when_everything_is_explored_or_blocked() {
        let mut planner = PathPlanner::new();
        let size = GridSize::new(2, 1);
        planner.load_obstacles(&set(&[(1, 0)]), size);
        planner.reset_search(size);
        planner.visited[0] = true;

        assert_eq!(planner.select_refuge(GridPosition::new(1, 0), size), None);
    }
}
