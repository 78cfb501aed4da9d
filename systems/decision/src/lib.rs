#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick steering system that turns an observation into a direction.

use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng};
use snake_autoplay_core::{Direction, GridPosition, GridSize, Observation};
use snake_autoplay_system_pathfinding::{PathPlanner, RouteKind};
use tracing::debug;

/// Explains which rule produced a [`Decision`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecisionReason {
    /// Head or food was missing, so the current direction was held.
    Incomplete,
    /// The cell ahead was blocked and a random safe turn was taken.
    Evasive,
    /// Every turn was blocked; the engine requested a reversal.
    Cornered,
    /// The first step of a route to the food.
    Path,
    /// The first step of a route to a refuge cell.
    Refuge,
    /// No usable route; a random safe direction was taken.
    Wander,
    /// No usable route and no safe direction; the current direction was held.
    Stuck,
}

/// Direction requested for the next tick together with its justification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Requested direction, before dispatch applies the reversal rule.
    pub direction: Direction,
    /// Rule that produced the direction.
    pub reason: DecisionReason,
}

impl Decision {
    const fn new(direction: Direction, reason: DecisionReason) -> Self {
        Self { direction, reason }
    }
}

/// Steering system holding the random source used for tie-breaking.
#[derive(Debug)]
pub struct DecisionEngine<R> {
    rng: R,
    planner: PathPlanner,
}

impl<R: Rng> DecisionEngine<R> {
    /// Creates an engine that draws its random choices from `rng`.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            planner: PathPlanner::new(),
        }
    }

    /// Chooses the direction for the next tick.
    pub fn decide(
        &mut self,
        observation: &Observation,
        current: Direction,
        grid: GridSize,
    ) -> Decision {
        let (Some(head), Some(food)) = (observation.head(), observation.food()) else {
            return Decision::new(current, DecisionReason::Incomplete);
        };
        let body = observation.body();

        if collides(head.step(current), body, grid) {
            let candidates = safe_turns(head, current, body, grid, |direction| {
                direction != current
            });
            return match candidates.choose(&mut self.rng) {
                Some(direction) => {
                    debug!(
                        %head,
                        blocked = %current,
                        chosen = %direction,
                        "evading collision"
                    );
                    Decision::new(*direction, DecisionReason::Evasive)
                }
                None => {
                    debug!(%head, "cornered, requesting reversal");
                    Decision::new(current.reverse(), DecisionReason::Cornered)
                }
            };
        }

        if let Some(route) = self.planner.plan(head, food, body, grid) {
            if let Some(direction) = route.first_step() {
                let reason = match route.kind() {
                    RouteKind::Direct => DecisionReason::Path,
                    RouteKind::Refuge => {
                        debug!(
                            %food,
                            refuge = %route.target(),
                            "food out of reach, heading for refuge"
                        );
                        DecisionReason::Refuge
                    }
                };
                return Decision::new(direction, reason);
            }
        }

        let candidates = safe_turns(head, current, body, grid, |_| true);
        match candidates.choose(&mut self.rng) {
            Some(direction) => Decision::new(*direction, DecisionReason::Wander),
            None => Decision::new(current, DecisionReason::Stuck),
        }
    }
}

fn collides(cell: GridPosition, body: &BTreeSet<GridPosition>, grid: GridSize) -> bool {
    !grid.contains(cell) || body.contains(&cell)
}

/// Non-reverse directions accepted by `filter` whose next cell is free.
fn safe_turns(
    head: GridPosition,
    current: Direction,
    body: &BTreeSet<GridPosition>,
    grid: GridSize,
    filter: impl Fn(Direction) -> bool,
) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|direction| *direction != current.reverse() && filter(*direction))
        .filter(|direction| !collides(head.step(*direction), body, grid))
        .collect()
}
