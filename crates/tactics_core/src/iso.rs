//! Isometric projection between tile and screen coordinates.
//!
//! Presentation helpers only; no combat or pathfinding logic depends on it.

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

/// Default on-screen tile width in pixels (tiles keep a 2:1 ratio).
pub const DEFAULT_TILE_WIDTH: f32 = 128.0;

/// 2:1 isometric projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoProjection {
    /// Tile width in pixels.
    pub tile_width: f32,
    /// Tile height in pixels.
    pub tile_height: f32,
    /// Screen x of tile `(0, 0)`.
    pub origin_x: f32,
    /// Screen y of tile `(0, 0)`.
    pub origin_y: f32,
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_WIDTH, 0.0, 0.0)
    }
}

impl IsoProjection {
    /// Projection with a 2:1 tile of the given width.
    #[must_use]
    pub fn new(tile_width: f32, origin_x: f32, origin_y: f32) -> Self {
        Self {
            tile_width,
            tile_height: tile_width / 2.0,
            origin_x,
            origin_y,
        }
    }

    /// Screen position of a (possibly fractional) tile coordinate.
    #[must_use]
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.origin_x + (x - y) * self.tile_width / 2.0,
            self.origin_y + (x + y) * self.tile_height / 2.0,
        )
    }

    /// Tile under a screen position.
    #[must_use]
    pub fn to_grid(&self, screen_x: f32, screen_y: f32) -> GridPos {
        let rel_x = (screen_x - self.origin_x) / (self.tile_width / 2.0);
        let rel_y = (screen_y - self.origin_y) / (self.tile_height / 2.0);
        let x = (rel_x + rel_y) / 2.0;
        let y = (rel_y - rel_x) / 2.0;
        GridPos::new(x.round() as i32, y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_screen() {
        let iso = IsoProjection::new(128.0, 400.0, 50.0);
        assert_eq!(iso.to_screen(0.0, 0.0), (400.0, 50.0));
        assert_eq!(iso.to_screen(1.0, 0.0), (464.0, 82.0));
        assert_eq!(iso.to_screen(0.0, 1.0), (336.0, 82.0));
    }

    #[test]
    fn test_round_trip() {
        let iso = IsoProjection::new(128.0, 400.0, 50.0);
        for x in -5..5 {
            for y in -5..5 {
                let (sx, sy) = iso.to_screen(x as f32, y as f32);
                assert_eq!(iso.to_grid(sx, sy), GridPos::new(x, y));
            }
        }
    }
}
