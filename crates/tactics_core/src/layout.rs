//! Named grid layouts and the persistence port that stores them.
//!
//! The core never touches storage directly. Callers inject a
//! [`LayoutStore`]; the core encodes layouts as RON text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::{Grid, Tile};

/// Key-value port for persisted layouts.
pub trait LayoutStore {
    /// Load the encoded layout stored under `name`.
    fn load(&self, name: &str) -> Result<Option<String>>;

    /// Store an encoded layout under `name`, replacing any previous one.
    fn save(&mut self, name: &str, encoded: &str) -> Result<()>;

    /// Delete the layout stored under `name`. Returns whether it existed.
    fn delete(&mut self, name: &str) -> Result<bool>;

    /// Names of all stored layouts, sorted.
    fn names(&self) -> Result<Vec<String>>;
}

/// In-memory [`LayoutStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryLayoutStore {
    entries: BTreeMap<String, String>,
}

impl MemoryLayoutStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn load(&self, name: &str) -> Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }

    fn save(&mut self, name: &str, encoded: &str) -> Result<()> {
        self.entries.insert(name.to_owned(), encoded.to_owned());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<bool> {
        Ok(self.entries.remove(name).is_some())
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Serializable snapshot of a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Tiles in row-major order.
    pub tiles: Vec<Tile>,
}

impl GridLayout {
    /// Snapshot a grid.
    #[must_use]
    pub fn capture(grid: &Grid) -> Self {
        Self {
            tiles: grid.sorted_tiles().into_iter().cloned().collect(),
        }
    }

    /// Rebuild a grid from this layout.
    #[must_use]
    pub fn to_grid(&self) -> Grid {
        let mut grid = Grid::new();
        for tile in &self.tiles {
            grid.insert(tile.clone());
        }
        grid
    }

    /// Encode as RON.
    pub fn encode(&self) -> Result<String> {
        ron::ser::to_string(self).map_err(|e| GameError::SerializeError {
            what: "grid layout",
            message: e.to_string(),
        })
    }

    /// Decode from RON.
    pub fn decode(encoded: &str) -> Result<Self> {
        ron::from_str(encoded).map_err(|e| GameError::DataParseError {
            what: "grid layout",
            message: e.to_string(),
        })
    }
}

impl Grid {
    /// Persist this grid under `name`.
    pub fn save_layout(&self, store: &mut dyn LayoutStore, name: &str) -> Result<()> {
        let encoded = GridLayout::capture(self).encode()?;
        store.save(name, &encoded)?;
        tracing::debug!(name, tiles = self.len(), "Saved grid layout");
        Ok(())
    }

    /// Replace this grid's tiles with the layout stored under `name`.
    pub fn load_layout(&mut self, store: &dyn LayoutStore, name: &str) -> Result<()> {
        let encoded = store
            .load(name)?
            .ok_or_else(|| GameError::LayoutNotFound(name.to_owned()))?;
        *self = GridLayout::decode(&encoded)?.to_grid();
        tracing::debug!(name, tiles = self.len(), "Loaded grid layout");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridLink, GridPos};

    #[test]
    fn test_save_and_load_layout() {
        let mut grid = Grid::rectangle(3, 3);
        grid.add_obstacle(GridPos::new(1, 1));
        grid.set_next_grid(
            GridPos::new(2, 2),
            Some(GridLink {
                grid_x: 0,
                grid_y: 1,
            }),
        )
        .unwrap();

        let mut store = MemoryLayoutStore::new();
        grid.save_layout(&mut store, "arena").unwrap();

        let mut restored = Grid::new();
        restored.load_layout(&store, "arena").unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_missing_layout() {
        let store = MemoryLayoutStore::new();
        let mut grid = Grid::rectangle(2, 2);
        let err = grid.load_layout(&store, "nope").unwrap_err();
        assert!(matches!(err, GameError::LayoutNotFound(_)));
        // Grid untouched on failure.
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn test_store_names_and_delete() {
        let mut store = MemoryLayoutStore::new();
        store.save("b", "x").unwrap();
        store.save("a", "y").unwrap();
        assert_eq!(store.names().unwrap(), vec!["a", "b"]);
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(GridLayout::decode("not ron at all (").is_err());
    }
}
