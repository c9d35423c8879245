//! Entity storage and the free-roam world.
//!
//! The [`World`] owns the grid and every entity. Combat borrows entities
//! from it by id; only defeated monsters are ever removed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::EntityProfile;
use crate::entity::{Entity, EntityId, Role};
use crate::error::{GameError, Result};
use crate::grid::{Grid, GridPos, TileTypeId, DEFAULT_OBSTACLE_TYPE};
use crate::movement::MoveOutcome;

/// Storage for all entities.
///
/// Ids are assigned sequentially starting at 1 and never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStorage {
    entities: HashMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert an entity and return its new id.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get an entity mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Borrow two distinct entities mutably at once.
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        if a == b {
            return None;
        }
        let mut first = None;
        let mut second = None;
        for (&id, entity) in &mut self.entities {
            if id == a {
                first = Some(entity);
            } else if id == b {
                second = Some(entity);
            }
        }
        Some((first?, second?))
    }

    /// Whether an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Sorted ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of one role.
    #[must_use]
    pub fn ids_with_role(&self, role: Role) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .values()
            .filter(|entity| entity.role == role)
            .map(|entity| entity.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Grid plus entities: everything outside of combat state.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Tile map.
    pub grid: Grid,
    /// All entities.
    pub entities: EntityStorage,
    player: Option<EntityId>,
}

impl World {
    /// Create a world on `grid` with no entities.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            entities: EntityStorage::new(),
            player: None,
        }
    }

    /// Spawn an entity from a profile on a walkable tile.
    ///
    /// The first player-role entity becomes the controlled player.
    pub fn spawn(&mut self, profile: &EntityProfile, tile: GridPos) -> Result<EntityId> {
        if !self.grid.is_walkable(tile) {
            return Err(GameError::InvalidTileEdit {
                x: tile.x,
                y: tile.y,
                reason: "spawn tile is not walkable",
            });
        }
        let id = self.entities.insert(Entity::from_profile(profile, tile));
        if profile.role == Role::Player && self.player.is_none() {
            self.player = Some(id);
        }
        tracing::debug!(id, profile = %profile.id, ?tile, "Spawned entity");
        Ok(id)
    }

    /// Id of the controlled player.
    #[must_use]
    pub const fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// Change the controlled player.
    pub fn set_player(&mut self, id: EntityId) -> Result<()> {
        match self.entities.get(id) {
            Some(entity) if entity.role == Role::Player => {
                self.player = Some(id);
                Ok(())
            }
            Some(_) => Err(GameError::InvalidTarget(id)),
            None => Err(GameError::EntityNotFound(id)),
        }
    }

    /// The controlled player.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(id))
    }

    /// The controlled player, mutably.
    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.player.and_then(|id| self.entities.get_mut(id))
    }

    /// Sorted monster ids.
    #[must_use]
    pub fn monsters(&self) -> Vec<EntityId> {
        self.entities.ids_with_role(Role::Monster)
    }

    /// Sorted ids of visible monsters.
    #[must_use]
    pub fn visible_monsters(&self) -> Vec<EntityId> {
        self.monsters()
            .into_iter()
            .filter(|&id| self.entities.get(id).is_some_and(|m| m.visible))
            .collect()
    }

    /// Hide every monster not in `keep`. Returns the ids hidden.
    pub fn hide_monsters_except(&mut self, keep: &[EntityId]) -> Vec<EntityId> {
        let mut hidden = Vec::new();
        for id in self.monsters() {
            if keep.contains(&id) {
                continue;
            }
            if let Some(monster) = self.entities.get_mut(id) {
                if monster.visible {
                    monster.visible = false;
                    hidden.push(id);
                }
            }
        }
        hidden
    }

    /// Make every monster visible.
    pub fn show_all_monsters(&mut self) {
        for id in self.monsters() {
            if let Some(monster) = self.entities.get_mut(id) {
                monster.visible = true;
            }
        }
    }

    /// Remove an entity from the world.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if self.player == Some(id) {
            self.player = None;
        }
        self.entities.remove(id)
    }

    /// Tiles held by living entities, excluding `except`.
    #[must_use]
    pub fn occupied_tiles(&self, except: &[EntityId]) -> Vec<GridPos> {
        self.entities
            .sorted_ids()
            .into_iter()
            .filter(|id| !except.contains(id))
            .filter_map(|id| self.entities.get(id))
            .filter(|entity| entity.is_alive())
            .map(|entity| entity.tile)
            .collect()
    }

    /// Ask the player to walk to `goal`.
    pub fn move_player(&mut self, goal: GridPos) -> Result<MoveOutcome> {
        let id = self.player.ok_or_else(|| GameError::InvalidState("no player".into()))?;
        let player = self
            .entities
            .get_mut(id)
            .ok_or(GameError::EntityNotFound(id))?;
        Ok(player.move_to(&self.grid, goal))
    }

    /// Advance free-roam movement of every entity by one tick.
    pub fn tick(&mut self) {
        for id in self.entities.sorted_ids() {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.update_movement();
            }
        }
    }

    /// Place an obstacle, re-planning the player if it blocks their route.
    ///
    /// # Errors
    ///
    /// Refused on the tile the player stands on.
    pub fn place_obstacle(&mut self, pos: GridPos) -> Result<()> {
        self.set_tile(pos, DEFAULT_OBSTACLE_TYPE, true)
    }

    /// Set a tile's type and obstacle flag, materializing it when needed.
    pub fn set_tile(&mut self, pos: GridPos, tile_type: TileTypeId, obstacle: bool) -> Result<()> {
        if obstacle && self.player_stands_on(pos) {
            return Err(GameError::InvalidTileEdit {
                x: pos.x,
                y: pos.y,
                reason: "player stands on this tile",
            });
        }
        self.grid.set_tile(pos, tile_type, obstacle);
        self.replan_if_blocked();
        Ok(())
    }

    /// Toggle an existing tile's obstacle flag. Returns the new flag.
    pub fn toggle_obstacle(&mut self, pos: GridPos) -> Result<bool> {
        let now_obstacle = !self.grid.has_obstacle(pos.x, pos.y);
        if now_obstacle && self.player_stands_on(pos) {
            return Err(GameError::InvalidTileEdit {
                x: pos.x,
                y: pos.y,
                reason: "player stands on this tile",
            });
        }
        let flag = self.grid.toggle_obstacle(pos)?;
        self.replan_if_blocked();
        Ok(flag)
    }

    fn player_stands_on(&self, pos: GridPos) -> bool {
        self.player()
            .is_some_and(|player| player.position.round_to_tile() == pos || player.tile == pos)
    }

    fn replan_if_blocked(&mut self) {
        let grid = &self.grid;
        let Some(player) = self.player.and_then(|id| self.entities.get_mut(id)) else {
            return;
        };
        if player.movement.is_blocked(grid) {
            let outcome = player.replan(grid);
            tracing::debug!(?outcome, "Player route blocked, re-planned");
        }
    }
}
