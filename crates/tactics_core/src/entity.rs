//! Unified character/monster stat block.
//!
//! Players and monsters share one [`Entity`] structure. What differs between
//! a Mage and a Dragon is data (an [`EntityProfile`]) plus two small enums:
//! [`AttackStyle`] for attack resolution and [`MonsterBehavior`] for the
//! turn policy.
//!
//! [`EntityProfile`]: crate::data::EntityProfile
//! [`MonsterBehavior`]: crate::ai::MonsterBehavior

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::MonsterBehavior;
use crate::combat::{check_range, scale_damage};
use crate::data::EntityProfile;
use crate::error::{GameError, Result};
use crate::grid::GridPos;
use crate::math::Vec2Fixed;
use crate::movement::PathFollower;

/// Unique identifier for entities.
pub type EntityId = u64;

/// Which side an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Player-controlled character.
    Player,
    /// AI-controlled monster.
    Monster,
}

/// Damage element of a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Element {
    /// Weapon damage. No attribute scaling.
    #[default]
    Physical,
    /// Raw magic. No attribute scaling.
    Arcane,
    /// Scales with intelligence.
    Fire,
    /// Scales with luck.
    Water,
    /// Scales with strength.
    Earth,
    /// Scales with agility.
    Air,
}

/// Primary attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Earth scaling.
    pub strength: u32,
    /// Air scaling.
    pub agility: u32,
    /// Fire scaling.
    pub intelligence: u32,
    /// Water scaling.
    pub luck: u32,
    /// Flat bonus added to every element.
    pub power: u32,
}

impl Attributes {
    /// Attribute that scales damage of `element` (0 for physical/arcane).
    #[must_use]
    pub const fn scaling_for(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.intelligence,
            Element::Water => self.luck,
            Element::Earth => self.strength,
            Element::Air => self.agility,
            Element::Physical | Element::Arcane => 0,
        }
    }
}

/// Elemental resistances in percent (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    /// Fire resistance.
    pub fire: u8,
    /// Water resistance.
    pub water: u8,
    /// Earth resistance.
    pub earth: u8,
    /// Air resistance.
    pub air: u8,
}

impl Resistances {
    /// Resistance against `element`, clamped to 100.
    #[must_use]
    pub fn for_element(&self, element: Element) -> u8 {
        let raw = match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Earth => self.earth,
            Element::Air => self.air,
            Element::Physical | Element::Arcane => 0,
        };
        raw.min(100)
    }

    /// Largest configured resistance (used for validation).
    #[must_use]
    pub fn max(&self) -> u8 {
        self.fire.max(self.water).max(self.earth).max(self.air)
    }
}

/// A named attack option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    /// Display name.
    pub name: String,
    /// Lowest base damage.
    pub min_damage: u32,
    /// Highest base damage.
    pub max_damage: u32,
    /// Action point cost.
    pub ap_cost: u32,
    /// Maximum Euclidean distance in tiles.
    pub range: u32,
    /// Damage element.
    pub element: Element,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
}

/// How an entity turns a spell into damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Random base in the spell's range, scaled by attributes and resistances.
    #[default]
    Scaled,
    /// The entity's flat `attack_damage`, reduced only by resistances.
    Flat,
}

/// A character or monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier, assigned by the world.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Class or species identifier the entity was built from.
    pub profile_id: String,
    /// Side.
    pub role: Role,
    /// Logical tile.
    pub tile: GridPos,
    /// Interpolated position in tiles.
    pub position: Vec2Fixed,
    /// Path being followed in free roam.
    pub movement: PathFollower,
    /// Hidden entities are not drawn and cannot be engaged.
    pub visible: bool,
    /// Turn policy (monsters only).
    pub behavior: Option<MonsterBehavior>,
    /// Distance (Chebyshev, tiles) at which a monster notices the player.
    pub detection_range: u32,
    /// Attack resolution.
    pub attack_style: AttackStyle,
    /// Damage of [`AttackStyle::Flat`] attacks.
    pub attack_damage: u32,
    /// Every 10 points block 1 incoming damage.
    pub defense: u32,
    /// Primary attributes.
    pub attributes: Attributes,
    /// Elemental resistances.
    pub resistances: Resistances,
    spells: Vec<Spell>,
    health: u32,
    max_health: u32,
    current_ap: u32,
    max_ap: u32,
    current_mp: u32,
    max_mp: u32,
    pub(crate) level: u32,
    pub(crate) experience: u32,
}

impl Entity {
    /// Build an entity from a profile, standing on `tile` with full resources.
    ///
    /// The id is 0 until the entity is inserted into a world.
    #[must_use]
    pub fn from_profile(profile: &EntityProfile, tile: GridPos) -> Self {
        let mut movement = PathFollower::default();
        movement.set_speed(profile.move_speed);

        Self {
            id: 0,
            name: profile.name.clone(),
            profile_id: profile.id.clone(),
            role: profile.role,
            tile,
            position: Vec2Fixed::from_tile(tile),
            movement,
            visible: true,
            behavior: profile.behavior,
            detection_range: profile.detection_range,
            attack_style: profile.attack_style,
            attack_damage: profile.attack_damage,
            defense: profile.defense,
            attributes: profile.attributes,
            resistances: profile.resistances,
            spells: profile.spells.clone(),
            health: profile.max_health,
            max_health: profile.max_health,
            current_ap: profile.max_ap,
            max_ap: profile.max_ap,
            current_mp: profile.max_mp,
            max_mp: profile.max_mp,
            level: profile.level.max(1),
            experience: 0,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current action points.
    #[must_use]
    pub const fn current_ap(&self) -> u32 {
        self.current_ap
    }

    /// Maximum action points.
    #[must_use]
    pub const fn max_ap(&self) -> u32 {
        self.max_ap
    }

    /// Current movement points.
    #[must_use]
    pub const fn current_mp(&self) -> u32 {
        self.current_mp
    }

    /// Maximum movement points.
    #[must_use]
    pub const fn max_mp(&self) -> u32 {
        self.max_mp
    }

    /// Character level (1-20).
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Accumulated experience.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Known spells.
    #[must_use]
    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    /// Spell by index.
    #[must_use]
    pub fn spell(&self, index: usize) -> Option<&Spell> {
        self.spells.get(index)
    }

    /// Alive iff health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Set health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    /// Refill health.
    pub fn restore_health(&mut self) {
        self.health = self.max_health;
    }

    /// Apply incoming damage after defense. Returns the damage taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let reduced = amount.saturating_sub(self.defense / 10);
        let taken = reduced.min(self.health);
        self.health -= taken;
        taken
    }

    /// Spend action points. Spends nothing when short.
    pub fn use_ap(&mut self, amount: u32) -> Result<()> {
        if self.current_ap < amount {
            return Err(GameError::InsufficientActionPoints {
                required: amount,
                available: self.current_ap,
            });
        }
        self.current_ap -= amount;
        Ok(())
    }

    /// Spend movement points. Spends nothing when short.
    pub fn use_mp(&mut self, amount: u32) -> Result<()> {
        if self.current_mp < amount {
            return Err(GameError::InsufficientMovementPoints {
                required: amount,
                available: self.current_mp,
            });
        }
        self.current_mp -= amount;
        Ok(())
    }

    /// Refill AP and MP (start of the entity's turn).
    pub fn reset_turn_resources(&mut self) {
        self.current_ap = self.max_ap;
        self.current_mp = self.max_mp;
    }

    pub(crate) fn grow(&mut self, health: u32, attack_damage: u32, power: u32) {
        self.max_health += health;
        self.attack_damage += attack_damage;
        self.attributes.power += power;
    }

    /// Place the entity on a tile, dropping any path in progress.
    pub fn teleport(&mut self, tile: GridPos) {
        self.tile = tile;
        self.position = Vec2Fixed::from_tile(tile);
        self.movement.clear();
    }

    /// Whether `target` lies within `range` tiles (Euclidean, inclusive).
    #[must_use]
    pub fn in_range(&self, target: GridPos, range: u32) -> bool {
        check_range(self.tile, target, range).is_ok()
    }

    /// Roll damage for an attack of `element` against `target` resistances.
    ///
    /// The base is uniform in `[min_damage, max_damage]` for
    /// [`AttackStyle::Scaled`] and `attack_damage` for [`AttackStyle::Flat`].
    pub fn compute_damage<R: Rng + ?Sized>(
        &self,
        min_damage: u32,
        max_damage: u32,
        element: Element,
        target: &Resistances,
        rng: &mut R,
    ) -> u32 {
        let resistance = target.for_element(element);
        match self.attack_style {
            AttackStyle::Scaled => {
                let (low, high) = if min_damage <= max_damage {
                    (min_damage, max_damage)
                } else {
                    (max_damage, min_damage)
                };
                let base = rng.gen_range(low..=high);
                scale_damage(
                    base,
                    self.attributes.scaling_for(element),
                    self.attributes.power,
                    resistance,
                )
            }
            AttackStyle::Flat => scale_damage(self.attack_damage, 0, 0, resistance),
        }
    }

    /// Cast spell `index` at a target with the given resistances.
    ///
    /// Spends the spell's AP and returns the rolled damage; the caller applies
    /// it. Returns 0 without spending anything when AP is short or the spell
    /// does not exist.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        target: &Resistances,
        rng: &mut R,
    ) -> u32 {
        let Some(spell) = self.spells.get(index) else {
            return 0;
        };
        let (min, max, element, cost) = (
            spell.min_damage,
            spell.max_damage,
            spell.element,
            spell.ap_cost,
        );
        if self.use_ap(cost).is_err() {
            return 0;
        }
        self.compute_damage(min, max, element, target, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roster;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_from_profile_starts_full() {
        let mage = Entity::from_profile(&roster::mage(), GridPos::new(2, 3));
        assert_eq!(mage.health(), 80);
        assert_eq!(mage.current_ap(), 6);
        assert_eq!(mage.current_mp(), 3);
        assert_eq!(mage.level(), 1);
        assert_eq!(mage.role, Role::Player);
        assert_eq!(mage.position.round_to_tile(), GridPos::new(2, 3));
        assert_eq!(mage.spells().len(), 5);
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut dragon = Entity::from_profile(&roster::dragon(), GridPos::default());
        assert_eq!(dragon.take_damage(500), 30);
        assert_eq!(dragon.health(), 0);
        assert!(!dragon.is_alive());
    }

    #[test]
    fn test_defense_reduces_damage() {
        let mut warrior = Entity::from_profile(&roster::warrior(), GridPos::default());
        // Defense 20 blocks 2 per hit.
        assert_eq!(warrior.take_damage(10), 8);
        assert_eq!(warrior.health(), 112);
        assert_eq!(warrior.take_damage(1), 0);
    }

    #[test]
    fn test_set_health_clamps() {
        let mut mage = Entity::from_profile(&roster::mage(), GridPos::default());
        mage.set_health(9999);
        assert_eq!(mage.health(), mage.max_health());
    }

    #[test]
    fn test_use_resources() {
        let mut rogue = Entity::from_profile(&roster::rogue(), GridPos::default());
        rogue.use_ap(3).unwrap();
        rogue.use_ap(3).unwrap();
        assert!(matches!(
            rogue.use_ap(3),
            Err(GameError::InsufficientActionPoints {
                required: 3,
                available: 1
            })
        ));
        assert_eq!(rogue.current_ap(), 1);

        rogue.use_mp(4).unwrap();
        assert!(matches!(
            rogue.use_mp(1),
            Err(GameError::InsufficientMovementPoints {
                required: 1,
                available: 0
            })
        ));
        assert_eq!(rogue.current_mp(), 0);

        rogue.reset_turn_resources();
        assert_eq!(rogue.current_ap(), 7);
        assert_eq!(rogue.current_mp(), 4);
    }

    #[test]
    fn test_element_scaling() {
        let attrs = Attributes {
            strength: 1,
            agility: 2,
            intelligence: 3,
            luck: 4,
            power: 5,
        };
        assert_eq!(attrs.scaling_for(Element::Fire), 3);
        assert_eq!(attrs.scaling_for(Element::Water), 4);
        assert_eq!(attrs.scaling_for(Element::Earth), 1);
        assert_eq!(attrs.scaling_for(Element::Air), 2);
        assert_eq!(attrs.scaling_for(Element::Physical), 0);
        assert_eq!(attrs.scaling_for(Element::Arcane), 0);
    }

    #[test]
    fn test_resistance_clamped() {
        let res = Resistances {
            fire: 250,
            ..Resistances::default()
        };
        assert_eq!(res.for_element(Element::Fire), 100);
        assert_eq!(res.for_element(Element::Physical), 0);
    }

    #[test]
    fn test_compute_damage_within_range() {
        let rogue = Entity::from_profile(&roster::rogue(), GridPos::default());
        let mut rng = rng();
        for _ in 0..200 {
            let dmg = rogue.compute_damage(5, 9, Element::Physical, &Resistances::default(), &mut rng);
            assert!((5..=9).contains(&dmg));
        }
    }

    #[test]
    fn test_full_resistance_blocks_all() {
        let mage = Entity::from_profile(&roster::mage(), GridPos::default());
        let immune = Resistances {
            fire: 100,
            ..Resistances::default()
        };
        let mut rng = rng();
        assert_eq!(mage.compute_damage(5, 9, Element::Fire, &immune, &mut rng), 0);
    }

    #[test]
    fn test_flat_attack() {
        let mut warrior = Entity::from_profile(&roster::warrior(), GridPos::default());
        let mut rng = rng();
        assert_eq!(warrior.attack(0, &Resistances::default(), &mut rng), 30);
        assert_eq!(warrior.current_ap(), 0);
        // Out of AP: no damage, no state change.
        assert_eq!(warrior.attack(0, &Resistances::default(), &mut rng), 0);
        assert_eq!(warrior.current_ap(), 0);
    }

    #[test]
    fn test_attack_unknown_spell() {
        let mut mage = Entity::from_profile(&roster::mage(), GridPos::default());
        let mut rng = rng();
        assert_eq!(mage.attack(99, &Resistances::default(), &mut rng), 0);
        assert_eq!(mage.current_ap(), mage.max_ap());
    }

    #[test]
    fn test_in_range_is_inclusive_euclidean() {
        let mage = Entity::from_profile(&roster::mage(), GridPos::new(0, 0));
        assert!(mage.in_range(GridPos::new(1, 0), 1));
        assert!(!mage.in_range(GridPos::new(1, 1), 1));
        assert!(mage.in_range(GridPos::new(3, 4), 5));
        assert!(!mage.in_range(GridPos::new(4, 4), 5));
    }
}
