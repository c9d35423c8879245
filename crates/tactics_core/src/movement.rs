//! Path following for free-roam movement.
//!
//! An entity asks the pathfinder for a route once, then advances along the
//! waypoints a fixed distance per tick, snapping onto each waypoint when it
//! is closer than one step.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::grid::{Grid, GridPos};
use crate::math::{fixed_sqrt, fixed_serde, Fixed, Vec2Fixed};
use crate::pathfinding::find_path;

/// Default speed in tiles per tick (0.1).
pub const DEFAULT_SPEED: Fixed = Fixed::from_bits(429_496_730);
/// Slowest allowed speed (0.01).
pub const MIN_SPEED: Fixed = Fixed::from_bits(42_949_673);
/// Fastest allowed speed (0.5).
pub const MAX_SPEED: Fixed = Fixed::from_bits(2_147_483_648);
/// Increment used by [`PathFollower::increase_speed`] (0.01).
pub const SPEED_STEP: Fixed = MIN_SPEED;

/// Result of a movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// A new path was planned.
    Started {
        /// Waypoints queued, including the tile the entity starts from.
        waypoints: usize,
    },
    /// Already following a path to this destination; nothing changed.
    AlreadyEnRoute,
    /// Destination is missing or blocked; no search was attempted.
    Rejected,
    /// The pathfinder found no route; the entity stays put.
    NoPath,
}

/// Queue of waypoints plus a per-tick speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFollower {
    path: VecDeque<GridPos>,
    #[serde(with = "fixed_serde")]
    speed: Fixed,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self {
            path: VecDeque::new(),
            speed: DEFAULT_SPEED,
        }
    }
}

impl PathFollower {
    /// Remaining waypoints.
    pub fn waypoints(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.path.iter().copied()
    }

    /// Final waypoint of the current path.
    #[must_use]
    pub fn destination(&self) -> Option<GridPos> {
        self.path.back().copied()
    }

    /// Whether waypoints remain.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        !self.path.is_empty()
    }

    /// Replace the current path.
    pub fn follow(&mut self, path: Vec<GridPos>) {
        self.path = path.into();
    }

    /// Drop the current path.
    pub fn clear(&mut self) {
        self.path.clear();
    }

    /// Current speed in tiles per tick.
    #[must_use]
    pub const fn speed(&self) -> Fixed {
        self.speed
    }

    /// Set the speed, clamped to `[MIN_SPEED, MAX_SPEED]`.
    pub fn set_speed(&mut self, speed: Fixed) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Raise speed by one step.
    pub fn increase_speed(&mut self) {
        self.set_speed(self.speed + SPEED_STEP);
    }

    /// Lower speed by one step.
    pub fn decrease_speed(&mut self) {
        self.set_speed(self.speed - SPEED_STEP);
    }

    /// Whether any remaining waypoint is blocked on `grid`.
    #[must_use]
    pub fn is_blocked(&self, grid: &Grid) -> bool {
        self.path.iter().any(|&pos| !grid.is_walkable(pos))
    }

    /// Advance `position` one tick toward the next waypoint.
    ///
    /// Returns the waypoint when it was reached this tick.
    pub fn step(&mut self, position: &mut Vec2Fixed) -> Option<GridPos> {
        let target = *self.path.front()?;
        let target_pos = Vec2Fixed::from_tile(target);
        let delta = target_pos - *position;
        let distance = fixed_sqrt(delta.dot(delta));

        if distance < self.speed {
            *position = target_pos;
            self.path.pop_front();
            return Some(target);
        }

        *position = *position + delta.normalize().scale(self.speed);
        None
    }
}

impl Entity {
    /// Plan a path to `goal` and start following it.
    ///
    /// A blocked or missing destination is rejected before any search runs.
    /// Requesting the destination already being walked to keeps the current
    /// path untouched.
    pub fn move_to(&mut self, grid: &Grid, goal: GridPos) -> MoveOutcome {
        if !grid.is_walkable(goal) {
            return MoveOutcome::Rejected;
        }
        if self.movement.destination() == Some(goal) {
            return MoveOutcome::AlreadyEnRoute;
        }

        let start = self.position.round_to_tile();
        match find_path(grid, start, goal) {
            Some(path) => {
                let waypoints = path.len();
                self.movement.follow(path);
                tracing::debug!(entity = self.id, ?start, ?goal, waypoints, "Path planned");
                MoveOutcome::Started { waypoints }
            }
            None => MoveOutcome::NoPath,
        }
    }

    /// Plan again to the current destination from where the entity stands.
    pub fn replan(&mut self, grid: &Grid) -> MoveOutcome {
        let Some(goal) = self.movement.destination() else {
            return MoveOutcome::NoPath;
        };
        self.movement.clear();
        let outcome = self.move_to(grid, goal);
        if !matches!(outcome, MoveOutcome::Started { .. }) {
            self.tile = self.position.round_to_tile();
        }
        outcome
    }

    /// Advance along the path by one tick.
    pub fn update_movement(&mut self) {
        if let Some(reached) = self.movement.step(&mut self.position) {
            self.tile = reached;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roster;

    fn mage_at(x: i32, y: i32) -> Entity {
        Entity::from_profile(&roster::mage(), GridPos::new(x, y))
    }

    fn run_until_idle(entity: &mut Entity, max_ticks: usize) -> usize {
        for tick in 0..max_ticks {
            if !entity.movement.is_moving() {
                return tick;
            }
            entity.update_movement();
        }
        max_ticks
    }

    #[test]
    fn test_speed_constants() {
        assert!((DEFAULT_SPEED - Fixed::from_num(0.1)).abs() <= Fixed::DELTA);
        assert!(MIN_SPEED < DEFAULT_SPEED && DEFAULT_SPEED < MAX_SPEED);
        assert_eq!(MAX_SPEED, Fixed::from_num(0.5));
    }

    #[test]
    fn test_speed_clamped() {
        let mut follower = PathFollower::default();
        for _ in 0..100 {
            follower.increase_speed();
        }
        assert_eq!(follower.speed(), MAX_SPEED);
        for _ in 0..100 {
            follower.decrease_speed();
        }
        assert_eq!(follower.speed(), MIN_SPEED);
    }

    #[test]
    fn test_move_and_arrive() {
        let grid = Grid::rectangle(6, 6);
        let mut mage = mage_at(0, 0);
        assert!(matches!(
            mage.move_to(&grid, GridPos::new(4, 2)),
            MoveOutcome::Started { .. }
        ));

        let ticks = run_until_idle(&mut mage, 1000);
        assert!(ticks < 1000);
        assert_eq!(mage.tile, GridPos::new(4, 2));
        assert_eq!(mage.position, Vec2Fixed::from_tile(GridPos::new(4, 2)));
    }

    #[test]
    fn test_move_to_blocked_is_rejected() {
        let mut grid = Grid::rectangle(4, 4);
        grid.add_obstacle(GridPos::new(3, 3));
        let mut mage = mage_at(0, 0);
        assert_eq!(mage.move_to(&grid, GridPos::new(3, 3)), MoveOutcome::Rejected);
        assert_eq!(mage.move_to(&grid, GridPos::new(9, 9)), MoveOutcome::Rejected);
        assert!(!mage.movement.is_moving());
    }

    #[test]
    fn test_move_to_unreachable() {
        let mut grid = Grid::rectangle(5, 5);
        for y in 0..5 {
            grid.add_obstacle(GridPos::new(2, y));
        }
        let mut mage = mage_at(0, 0);
        assert_eq!(mage.move_to(&grid, GridPos::new(4, 4)), MoveOutcome::NoPath);
        assert_eq!(mage.tile, GridPos::new(0, 0));
    }

    #[test]
    fn test_move_to_is_idempotent() {
        let grid = Grid::rectangle(8, 8);
        let mut mage = mage_at(0, 0);
        mage.move_to(&grid, GridPos::new(6, 3));
        for _ in 0..7 {
            mage.update_movement();
        }
        let before: Vec<_> = mage.movement.waypoints().collect();
        assert_eq!(
            mage.move_to(&grid, GridPos::new(6, 3)),
            MoveOutcome::AlreadyEnRoute
        );
        let after: Vec<_> = mage.movement.waypoints().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_replan_around_new_obstacle() {
        let mut grid = Grid::rectangle(8, 8);
        let mut mage = mage_at(0, 0);
        mage.move_to(&grid, GridPos::new(7, 0));
        assert!(mage.movement.waypoints().any(|p| p == GridPos::new(4, 0)));

        grid.add_obstacle(GridPos::new(4, 0));
        assert!(mage.movement.is_blocked(&grid));
        assert!(matches!(mage.replan(&grid), MoveOutcome::Started { .. }));
        assert!(!mage.movement.is_blocked(&grid));
        assert_eq!(mage.movement.destination(), Some(GridPos::new(7, 0)));

        run_until_idle(&mut mage, 2000);
        assert_eq!(mage.tile, GridPos::new(7, 0));
    }

    #[test]
    fn test_snap_when_closer_than_speed() {
        let mut follower = PathFollower::default();
        follower.follow(vec![GridPos::new(1, 0)]);
        let mut position = Vec2Fixed::new(Fixed::from_num(0.95), Fixed::ZERO);
        assert_eq!(follower.step(&mut position), Some(GridPos::new(1, 0)));
        assert_eq!(position, Vec2Fixed::from_tile(GridPos::new(1, 0)));
        assert!(!follower.is_moving());
    }
}
