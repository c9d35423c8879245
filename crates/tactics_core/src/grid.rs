//! Tile grid and obstacle model.
//!
//! A [`Grid`] is a sparse map of materialized tiles. Only materialized,
//! non-obstacle tiles are walkable; everything outside the map is treated
//! as a wall by pathfinding and monster movement.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Discrete tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared Euclidean distance in tiles.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Manhattan distance in tiles.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance in tiles.
    #[must_use]
    pub fn chebyshev(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Sprite-sheet tile identifier (index into the 11×11 tileset).
pub type TileTypeId = u16;

/// Tile type used when a tile is materialized without one.
pub const DEFAULT_TILE_TYPE: TileTypeId = 37;

/// Tile type used for freshly placed obstacles.
pub const DEFAULT_OBSTACLE_TYPE: TileTypeId = 15;

/// Link from a border tile to a neighbouring map on the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLink {
    /// World-map column of the destination grid.
    pub grid_x: i32,
    /// World-map row of the destination grid.
    pub grid_y: i32,
}

/// A single materialized tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Tile coordinate.
    pub pos: GridPos,
    /// Sprite type.
    pub tile_type: TileTypeId,
    /// Blocks movement when set.
    pub obstacle: bool,
    /// Optional transition to another grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_grid: Option<GridLink>,
}

impl Tile {
    /// Create a walkable tile of the default type.
    #[must_use]
    pub const fn new(pos: GridPos) -> Self {
        Self {
            pos,
            tile_type: DEFAULT_TILE_TYPE,
            obstacle: false,
            next_grid: None,
        }
    }

    /// Flip the obstacle flag, returning the new value.
    pub fn toggle_obstacle(&mut self) -> bool {
        self.obstacle = !self.obstacle;
        self.obstacle
    }
}

/// Sparse tile map.
///
/// Persist it through [`GridLayout`](crate::layout::GridLayout).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    tiles: HashMap<GridPos, Tile>,
}

impl Grid {
    /// Create an empty grid (nothing walkable).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fully walkable `width × height` rectangle anchored at `(0, 0)`.
    #[must_use]
    pub fn rectangle(width: u32, height: u32) -> Self {
        let mut grid = Self::new();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                grid.materialize(GridPos::new(x, y));
            }
        }
        grid
    }

    /// Create the diamond-shaped demo field.
    ///
    /// Rows `1..=total_rows` expand then contract around row `ceil(total_rows / 2)`;
    /// each row spans `-w..=w` columns with `w` capped at `max_columns / 2`.
    #[must_use]
    pub fn diamond(total_rows: u32, max_columns: u32) -> Self {
        let mut grid = Self::new();
        let total = total_rows as i32;
        let mid = (total + 1) / 2;
        let cap = (max_columns / 2) as i32;

        for row in 1..=total {
            let half = if row <= mid { row } else { total - row + 1 };
            let width = half.min(cap);
            for col in -width..=width {
                grid.materialize(GridPos::new(row, col));
            }
        }
        grid
    }

    /// Number of materialized tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tile has been materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Materialize a tile if it does not exist yet and return it.
    pub fn materialize(&mut self, pos: GridPos) -> &mut Tile {
        self.tiles.entry(pos).or_insert_with(|| Tile::new(pos))
    }

    /// Insert or replace a tile.
    pub fn insert(&mut self, tile: Tile) {
        self.tiles.insert(tile.pos, tile);
    }

    /// Get a tile.
    #[must_use]
    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    /// Get a tile mutably.
    pub fn tile_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        self.tiles.get_mut(&pos)
    }

    /// Check whether `(x, y)` is materialized.
    #[must_use]
    pub fn tile_exists(&self, x: i32, y: i32) -> bool {
        self.tiles.contains_key(&GridPos::new(x, y))
    }

    /// Check whether `(x, y)` holds an obstacle.
    ///
    /// Missing tiles are not obstacles; use [`is_walkable`](Self::is_walkable)
    /// for movement checks.
    #[must_use]
    pub fn has_obstacle(&self, x: i32, y: i32) -> bool {
        self.tiles
            .get(&GridPos::new(x, y))
            .is_some_and(|tile| tile.obstacle)
    }

    /// Check whether a tile exists and is free of obstacles.
    #[must_use]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.tiles.get(&pos).is_some_and(|tile| !tile.obstacle)
    }

    /// Mark a tile as an obstacle, materializing it if needed.
    pub fn add_obstacle(&mut self, pos: GridPos) {
        let tile = self.materialize(pos);
        tile.obstacle = true;
        tile.tile_type = DEFAULT_OBSTACLE_TYPE;
    }

    /// Clear the obstacle flag of an existing tile.
    pub fn remove_obstacle(&mut self, pos: GridPos) {
        if let Some(tile) = self.tiles.get_mut(&pos) {
            tile.obstacle = false;
        }
    }

    /// Toggle the obstacle flag of an existing tile.
    pub fn toggle_obstacle(&mut self, pos: GridPos) -> Result<bool> {
        self.tiles
            .get_mut(&pos)
            .map(Tile::toggle_obstacle)
            .ok_or(GameError::InvalidTileEdit {
                x: pos.x,
                y: pos.y,
                reason: "tile does not exist",
            })
    }

    /// Set type and obstacle flag of a tile, materializing it if needed.
    pub fn set_tile(&mut self, pos: GridPos, tile_type: TileTypeId, obstacle: bool) {
        let tile = self.materialize(pos);
        tile.tile_type = tile_type;
        tile.obstacle = obstacle;
    }

    /// Attach or clear a next-grid link on an existing tile.
    pub fn set_next_grid(&mut self, pos: GridPos, link: Option<GridLink>) -> Result<()> {
        let tile = self.tiles.get_mut(&pos).ok_or(GameError::InvalidTileEdit {
            x: pos.x,
            y: pos.y,
            reason: "tile does not exist",
        })?;
        tile.next_grid = link;
        Ok(())
    }

    /// All tiles in deterministic (row-major by `y`, then `x`) order.
    #[must_use]
    pub fn sorted_tiles(&self) -> Vec<&Tile> {
        let mut tiles: Vec<_> = self.tiles.values().collect();
        tiles.sort_unstable_by_key(|tile| (tile.pos.y, tile.pos.x));
        tiles
    }

    /// Tiles carrying a next-grid link.
    pub fn transitions(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values().filter(|tile| tile.next_grid.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tiles_are_not_walkable() {
        let grid = Grid::new();
        assert!(!grid.tile_exists(0, 0));
        assert!(!grid.has_obstacle(0, 0));
        assert!(!grid.is_walkable(GridPos::new(0, 0)));
    }

    #[test]
    fn test_rectangle() {
        let grid = Grid::rectangle(4, 3);
        assert_eq!(grid.len(), 12);
        assert!(grid.is_walkable(GridPos::new(3, 2)));
        assert!(!grid.tile_exists(4, 0));
    }

    #[test]
    fn test_obstacles() {
        let mut grid = Grid::rectangle(3, 3);
        grid.add_obstacle(GridPos::new(1, 1));
        assert!(grid.has_obstacle(1, 1));
        assert!(!grid.is_walkable(GridPos::new(1, 1)));

        grid.remove_obstacle(GridPos::new(1, 1));
        assert!(grid.is_walkable(GridPos::new(1, 1)));

        assert!(grid.toggle_obstacle(GridPos::new(1, 1)).unwrap());
        assert!(grid.toggle_obstacle(GridPos::new(9, 9)).is_err());
    }

    #[test]
    fn test_add_obstacle_materializes() {
        let mut grid = Grid::new();
        grid.add_obstacle(GridPos::new(5, 5));
        assert!(grid.tile_exists(5, 5));
        assert!(grid.has_obstacle(5, 5));
    }

    #[test]
    fn test_set_tile() {
        let mut grid = Grid::new();
        grid.set_tile(GridPos::new(2, 3), 4, false);
        let tile = grid.tile(GridPos::new(2, 3)).unwrap();
        assert_eq!(tile.tile_type, 4);
        assert!(!tile.obstacle);
    }

    #[test]
    fn test_next_grid_link() {
        let mut grid = Grid::rectangle(2, 2);
        let link = GridLink {
            grid_x: 1,
            grid_y: 0,
        };
        grid.set_next_grid(GridPos::new(1, 1), Some(link)).unwrap();
        assert_eq!(grid.transitions().count(), 1);
        assert!(grid.set_next_grid(GridPos::new(7, 7), Some(link)).is_err());
    }

    #[test]
    fn test_diamond_shape() {
        let grid = Grid::diamond(23, 23);
        // Row 1 has 3 tiles, row 12 (the middle) is capped at 11 per side.
        assert!(grid.tile_exists(1, -1) && grid.tile_exists(1, 1));
        assert!(!grid.tile_exists(1, 2));
        assert!(grid.tile_exists(12, -11) && grid.tile_exists(12, 11));
        assert!(!grid.tile_exists(12, 12));
        assert!(grid.tile_exists(23, 1) && !grid.tile_exists(23, 2));
        assert!(!grid.tile_exists(0, 0));
    }

    #[test]
    fn test_sorted_tiles_order() {
        let grid = Grid::rectangle(2, 2);
        let order: Vec<_> = grid.sorted_tiles().iter().map(|t| t.pos).collect();
        assert_eq!(
            order,
            vec![
                GridPos::new(0, 0),
                GridPos::new(1, 0),
                GridPos::new(0, 1),
                GridPos::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_distances() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(3, -4);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(a.chebyshev(b), 4);
    }
}
