//! Combat sides.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, Role};
use crate::error::{GameError, Result};
use crate::world::EntityStorage;

/// Ordered members of one side.
///
/// The role is fixed by the first member; entities of the other role are
/// refused. Members are ids into an [`EntityStorage`]; an id missing from the
/// storage counts as dead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    role: Option<Role>,
    members: Vec<EntityId>,
}

impl Team {
    /// Create an empty team.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Role of the team, once it has a member.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the team has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` belongs to the team.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// Add a member.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidTeamComposition`] when `entity` has the other
    /// role. The member list is left unchanged.
    pub fn add_entity(&mut self, entity: &Entity) -> Result<()> {
        match self.role {
            Some(role) if role != entity.role => Err(GameError::InvalidTeamComposition {
                team: role,
                entity: entity.role,
            }),
            _ => {
                self.role = Some(entity.role);
                if !self.members.contains(&entity.id) {
                    self.members.push(entity.id);
                }
                Ok(())
            }
        }
    }

    /// Members with health above zero.
    #[must_use]
    pub fn living(&self, entities: &EntityStorage) -> Vec<EntityId> {
        self.members
            .iter()
            .copied()
            .filter(|&id| entities.get(id).is_some_and(Entity::is_alive))
            .collect()
    }

    /// Members with no health left (or no longer in the world).
    #[must_use]
    pub fn dead(&self, entities: &EntityStorage) -> Vec<EntityId> {
        self.members
            .iter()
            .copied()
            .filter(|&id| !entities.get(id).is_some_and(Entity::is_alive))
            .collect()
    }

    /// True iff no member is alive.
    #[must_use]
    pub fn is_defeated(&self, entities: &EntityStorage) -> bool {
        !self
            .members
            .iter()
            .any(|&id| entities.get(id).is_some_and(Entity::is_alive))
    }

    /// Refill AP and MP of every member. Health is untouched.
    pub fn reset_team(&self, entities: &mut EntityStorage) {
        for &id in &self.members {
            if let Some(entity) = entities.get_mut(id) {
                entity.reset_turn_resources();
            }
        }
    }
}

/// Interleave two sides one-for-one, then append the rest of the longer side.
#[must_use]
pub fn interleave(first: &Team, second: &Team) -> Vec<EntityId> {
    let (a, b) = (first.members(), second.members());
    let mut order = Vec::with_capacity(a.len() + b.len());
    for i in 0..a.len().max(b.len()) {
        if let Some(&id) = a.get(i) {
            order.push(id);
        }
        if let Some(&id) = b.get(i) {
            order.push(id);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roster;
    use crate::grid::GridPos;

    fn storage_with(profiles: &[crate::data::EntityProfile]) -> (EntityStorage, Vec<EntityId>) {
        let mut storage = EntityStorage::new();
        let ids = profiles
            .iter()
            .map(|p| storage.insert(Entity::from_profile(p, GridPos::default())))
            .collect();
        (storage, ids)
    }

    #[test]
    fn test_role_fixed_by_first_member() {
        let (storage, ids) = storage_with(&[roster::mage(), roster::dragon()]);
        let mut team = Team::new();
        assert_eq!(team.role(), None);

        team.add_entity(storage.get(ids[0]).unwrap()).unwrap();
        assert_eq!(team.role(), Some(Role::Player));

        let err = team.add_entity(storage.get(ids[1]).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidTeamComposition {
                team: Role::Player,
                entity: Role::Monster
            }
        ));
        assert!(!err.is_recoverable());
        assert_eq!(team.members(), &[ids[0]]);
    }

    #[test]
    fn test_living_and_dead() {
        let (mut storage, ids) = storage_with(&[roster::dragon(), roster::minotaur()]);
        let mut team = Team::new();
        for &id in &ids {
            team.add_entity(storage.get(id).unwrap()).unwrap();
        }
        assert!(!team.is_defeated(&storage));

        storage.get_mut(ids[0]).unwrap().take_damage(1000);
        assert_eq!(team.living(&storage), vec![ids[1]]);
        assert_eq!(team.dead(&storage), vec![ids[0]]);

        storage.remove(ids[1]);
        assert!(team.is_defeated(&storage));
    }

    #[test]
    fn test_empty_team_is_defeated() {
        let storage = EntityStorage::new();
        assert!(Team::new().is_defeated(&storage));
    }

    #[test]
    fn test_reset_team_keeps_health() {
        let (mut storage, ids) = storage_with(&[roster::rogue()]);
        let mut team = Team::new();
        team.add_entity(storage.get(ids[0]).unwrap()).unwrap();
        {
            let rogue = storage.get_mut(ids[0]).unwrap();
            rogue.use_ap(5).unwrap();
            rogue.use_mp(2).unwrap();
            rogue.take_damage(20);
        }
        team.reset_team(&mut storage);
        let rogue = storage.get(ids[0]).unwrap();
        assert_eq!(rogue.current_ap(), 7);
        assert_eq!(rogue.current_mp(), 4);
        assert_eq!(rogue.health(), 70);
    }

    #[test]
    fn test_interleave_uneven() {
        let (storage, ids) = storage_with(&[
            roster::mage(),
            roster::dragon(),
            roster::minotaur(),
        ]);
        let mut players = Team::new();
        players.add_entity(storage.get(ids[0]).unwrap()).unwrap();
        let mut monsters = Team::new();
        monsters.add_entity(storage.get(ids[1]).unwrap()).unwrap();
        monsters.add_entity(storage.get(ids[2]).unwrap()).unwrap();

        assert_eq!(interleave(&players, &monsters), vec![ids[0], ids[1], ids[2]]);
        assert_eq!(interleave(&monsters, &players), vec![ids[1], ids[0], ids[2]]);
    }
}
