//! Built-in classes and species.
//!
//! `data/profiles.ron` at the workspace root holds the same roster in data
//! form.

use super::{EntityProfile, ProfileSet};
use crate::ai::MonsterBehavior;
use crate::entity::{AttackStyle, Attributes, Element, Resistances, Role, Spell};
use crate::movement::DEFAULT_SPEED;

fn spell(
    name: &str,
    (min_damage, max_damage): (u32, u32),
    ap_cost: u32,
    range: u32,
    element: Element,
    description: &str,
) -> Spell {
    Spell {
        name: name.to_string(),
        min_damage,
        max_damage,
        ap_cost,
        range,
        element,
        description: description.to_string(),
    }
}

fn base(id: &str, name: &str, role: Role, max_health: u32, max_ap: u32, max_mp: u32) -> EntityProfile {
    EntityProfile {
        id: id.to_string(),
        name: name.to_string(),
        role,
        max_health,
        max_ap,
        max_mp,
        level: 1,
        attributes: Attributes::default(),
        resistances: Resistances::default(),
        spells: Vec::new(),
        attack_style: AttackStyle::Scaled,
        attack_damage: 0,
        defense: 0,
        behavior: None,
        detection_range: 0,
        move_speed: DEFAULT_SPEED,
    }
}

/// Elemental caster.
#[must_use]
pub fn mage() -> EntityProfile {
    EntityProfile {
        attributes: Attributes {
            intelligence: 10,
            ..Attributes::default()
        },
        spells: vec![
            spell("Magic Bolt", (3, 6), 2, 5, Element::Arcane, "A bolt of pure arcane energy."),
            spell("Fireball", (5, 9), 3, 5, Element::Fire, "Hurls a ball of flame."),
            spell("Ice Blast", (4, 8), 2, 5, Element::Water, "A freezing burst of ice."),
            spell("Lightning Strike", (6, 10), 4, 6, Element::Air, "Calls lightning on the target."),
            spell("Earth Spike", (4, 7), 3, 4, Element::Earth, "Raises a spike of stone."),
        ],
        ..base("mage", "Mage", Role::Player, 80, 6, 3)
    }
}

/// Heavy melee fighter with flat damage.
#[must_use]
pub fn warrior() -> EntityProfile {
    EntityProfile {
        attributes: Attributes {
            strength: 10,
            ..Attributes::default()
        },
        spells: vec![spell("Slash", (30, 30), 6, 1, Element::Physical, "A heavy sword strike.")],
        attack_style: AttackStyle::Flat,
        attack_damage: 30,
        defense: 20,
        ..base("warrior", "Warrior", Role::Player, 120, 6, 3)
    }
}

/// Agile skirmisher.
#[must_use]
pub fn rogue() -> EntityProfile {
    EntityProfile {
        attributes: Attributes {
            agility: 10,
            ..Attributes::default()
        },
        spells: vec![spell("Quick Strike", (5, 9), 3, 1, Element::Air, "Two fast dagger cuts.")],
        ..base("rogue", "Rogue", Role::Player, 90, 7, 4)
    }
}

/// Small dragon that charges and bites.
#[must_use]
pub fn dragon() -> EntityProfile {
    EntityProfile {
        spells: vec![spell("Bite", (9, 11), 6, 1, Element::Water, "A freezing bite.")],
        resistances: Resistances {
            water: 25,
            ..Resistances::default()
        },
        behavior: Some(MonsterBehavior::Charger),
        detection_range: 3,
        ..base("dragon", "Dragon", Role::Monster, 30, 6, 3)
    }
}

/// Fast brute.
#[must_use]
pub fn minotaur() -> EntityProfile {
    EntityProfile {
        spells: vec![spell("Gore", (10, 14), 5, 1, Element::Earth, "Charges horns first.")],
        resistances: Resistances {
            earth: 20,
            ..Resistances::default()
        },
        defense: 10,
        behavior: Some(MonsterBehavior::Charger),
        detection_range: 4,
        ..base("minotaur", "Minotaur", Role::Monster, 45, 6, 4)
    }
}

/// Every built-in profile.
#[must_use]
pub fn builtin() -> ProfileSet {
    ProfileSet {
        profiles: vec![mage(), warrior(), rogue(), dragon(), minotaur()],
    }
}
