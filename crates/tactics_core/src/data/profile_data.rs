//! Entity profile data structures for data-driven classes and species.

use serde::{Deserialize, Serialize};

use crate::ai::MonsterBehavior;
use crate::entity::{AttackStyle, Attributes, Resistances, Role, Spell};
use crate::error::{GameError, Result};
use crate::math::{fixed_decimal_serde, Fixed};
use crate::movement::DEFAULT_SPEED;

/// Data-driven class (player) or species (monster) definition.
///
/// # Example RON
///
/// ```ron
/// EntityProfile(
///     id: "dragon",
///     name: "Dragon",
///     role: Monster,
///     max_health: 30,
///     max_ap: 6,
///     max_mp: 3,
///     spells: [
///         Spell(
///             name: "Bite",
///             min_damage: 9,
///             max_damage: 11,
///             ap_cost: 6,
///             range: 1,
///             element: Water,
///         ),
///     ],
///     behavior: Some(Charger),
///     detection_range: 3,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Unique identifier (`"mage"`, `"dragon"`).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Side the entity fights for.
    pub role: Role,

    /// Maximum health.
    pub max_health: u32,

    /// Action points per turn.
    pub max_ap: u32,

    /// Movement points per turn.
    pub max_mp: u32,

    /// Starting level.
    #[serde(default = "default_level")]
    pub level: u32,

    /// Primary attributes.
    #[serde(default)]
    pub attributes: Attributes,

    /// Elemental resistances, each at most 100.
    #[serde(default)]
    pub resistances: Resistances,

    /// Attack options.
    pub spells: Vec<Spell>,

    /// Attack resolution.
    #[serde(default)]
    pub attack_style: AttackStyle,

    /// Flat attack damage.
    #[serde(default)]
    pub attack_damage: u32,

    /// Damage reduction (every 10 points block 1 damage).
    #[serde(default)]
    pub defense: u32,

    /// Turn policy; required for monsters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<MonsterBehavior>,

    /// Chebyshev distance at which a monster engages the player.
    #[serde(default)]
    pub detection_range: u32,

    /// Free-roam speed in tiles per tick.
    #[serde(with = "fixed_decimal_serde", default = "default_move_speed")]
    pub move_speed: Fixed,
}

const fn default_level() -> u32 {
    1
}

const fn default_move_speed() -> Fixed {
    DEFAULT_SPEED
}

impl EntityProfile {
    /// Check the invariants the combat code relies on.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| {
            Err(GameError::InvalidProfile {
                id: self.id.clone(),
                message,
            })
        };

        if self.id.is_empty() {
            return fail("empty id".to_string());
        }
        if self.max_health == 0 {
            return fail("max_health must be positive".to_string());
        }
        if self.max_ap == 0 {
            return fail("max_ap must be positive".to_string());
        }
        if self.resistances.max() > 100 {
            return fail(format!(
                "resistance {} exceeds 100",
                self.resistances.max()
            ));
        }
        if self.role == Role::Monster && self.behavior.is_none() {
            return fail("monsters need a behavior".to_string());
        }
        for spell in &self.spells {
            if spell.min_damage > spell.max_damage {
                return fail(format!(
                    "spell '{}' has min_damage {} above max_damage {}",
                    spell.name, spell.min_damage, spell.max_damage
                ));
            }
        }
        Ok(())
    }

    /// Spell with the lowest AP cost.
    #[must_use]
    pub fn cheapest_spell_cost(&self) -> Option<u32> {
        self.spells.iter().map(|spell| spell.ap_cost).min()
    }
}

/// Collection of profiles loaded from one data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    /// Profiles in file order.
    pub profiles: Vec<EntityProfile>,
}

impl ProfileSet {
    /// Parse and validate a RON profile file.
    pub fn from_ron(source: &str) -> Result<Self> {
        let set: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            what: "profile set",
            message: e.to_string(),
        })?;
        set.validate()?;
        Ok(set)
    }

    /// Validate every profile and reject duplicate ids.
    pub fn validate(&self) -> Result<()> {
        for (index, profile) in self.profiles.iter().enumerate() {
            profile.validate()?;
            if self.profiles[..index].iter().any(|p| p.id == profile.id) {
                return Err(GameError::InvalidProfile {
                    id: profile.id.clone(),
                    message: "duplicate id".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Look a profile up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EntityProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// Profile ids of one role.
    pub fn ids_for(&self, role: Role) -> impl Iterator<Item = &str> {
        self.profiles
            .iter()
            .filter(move |profile| profile.role == role)
            .map(|profile| profile.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roster;
    use crate::entity::Element;

    #[test]
    fn test_builtin_profiles_are_valid() {
        roster::builtin().validate().unwrap();
    }

    #[test]
    fn test_resistance_over_100_rejected() {
        let mut profile = roster::dragon();
        profile.resistances.fire = 150;
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, GameError::InvalidProfile { .. }));
    }

    #[test]
    fn test_inverted_damage_range_rejected() {
        let mut profile = roster::mage();
        profile.spells[0].min_damage = 10;
        profile.spells[0].max_damage = 2;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_monster_needs_behavior() {
        let mut profile = roster::dragon();
        profile.behavior = None;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let set = ProfileSet {
            profiles: vec![roster::mage(), roster::mage()],
        };
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_parse_minimal_profile() {
        let source = r#"
            ProfileSet(
                profiles: [
                    EntityProfile(
                        id: "slime",
                        name: "Slime",
                        role: Monster,
                        max_health: 12,
                        max_ap: 4,
                        max_mp: 2,
                        spells: [
                            Spell(
                                name: "Splash",
                                min_damage: 1,
                                max_damage: 3,
                                ap_cost: 2,
                                range: 1,
                                element: Water,
                            ),
                        ],
                        behavior: Some(Sentinel),
                        move_speed: 0.05,
                    ),
                ],
            )
        "#;
        let set = ProfileSet::from_ron(source).unwrap();
        let slime = set.get("slime").unwrap();
        assert_eq!(slime.level, 1);
        assert_eq!(slime.spells[0].element, Element::Water);
        assert_eq!(slime.move_speed, Fixed::from_num(0.05));
        assert_eq!(slime.cheapest_spell_cost(), Some(2));
    }

    #[test]
    fn test_parse_error_reported() {
        let err = ProfileSet::from_ron("ProfileSet(profiles: [oops])").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }

    #[test]
    fn test_ids_for_role() {
        let set = roster::builtin();
        let players: Vec<_> = set.ids_for(Role::Player).collect();
        assert_eq!(players, vec!["mage", "warrior", "rogue"]);
    }
}
