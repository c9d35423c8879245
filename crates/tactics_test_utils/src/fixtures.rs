//! Test fixtures and helpers.
//!
//! Pre-built worlds, profiles and a battle driver for consistent testing.

use tactics_core::ai::autopilot_command;
use tactics_core::clock::SimTime;
use tactics_core::data::{roster, EntityProfile};
use tactics_core::engine::{CombatEngine, CombatPhase, CombatSummary};
use tactics_core::entity::{Attributes, Element, EntityId, Resistances, Role, Spell};
use tactics_core::grid::{Grid, GridPos};
use tactics_core::ui::CombatUi;
use tactics_core::world::World;

/// A single-spell profile.
#[must_use]
pub fn simple_profile(
    id: &str,
    role: Role,
    max_health: u32,
    max_ap: u32,
    spell: Spell,
) -> EntityProfile {
    let mut profile = match role {
        Role::Player => roster::rogue(),
        Role::Monster => roster::dragon(),
    };
    profile.id = id.to_string();
    profile.name = id.to_string();
    profile.max_health = max_health;
    profile.max_ap = max_ap;
    profile.attributes = Attributes::default();
    profile.resistances = Resistances::default();
    profile.defense = 0;
    profile.spells = vec![spell];
    profile
}

/// A physical spell.
#[must_use]
pub fn physical_spell(name: &str, min_damage: u32, max_damage: u32, ap_cost: u32, range: u32) -> Spell {
    Spell {
        name: name.to_string(),
        min_damage,
        max_damage,
        ap_cost,
        range,
        element: Element::Physical,
        description: String::new(),
    }
}

/// Level 1 fighter: 100 HP, one 6 AP spell dealing 5-8 physical damage.
#[must_use]
pub fn duelist() -> EntityProfile {
    simple_profile("duelist", Role::Player, 100, 6, physical_spell("Strike", 5, 8, 6, 5))
}

/// Level 1 monster with 10 HP, no resistances, that never moves or hits back.
#[must_use]
pub fn training_dummy() -> EntityProfile {
    let mut dummy = simple_profile("dummy", Role::Monster, 10, 6, physical_spell("Flail", 1, 1, 6, 1));
    dummy.behavior = Some(tactics_core::ai::MonsterBehavior::Sentinel);
    dummy
}

/// `width × height` arena with a player and one monster.
pub fn arena(
    width: u32,
    height: u32,
    player: (&EntityProfile, GridPos),
    monster: (&EntityProfile, GridPos),
) -> (World, EntityId, EntityId) {
    let mut world = World::new(Grid::rectangle(width, height));
    let player_id = world
        .spawn(player.0, player.1)
        .unwrap_or_else(|e| panic!("player spawn failed: {e}"));
    let monster_id = world
        .spawn(monster.0, monster.1)
        .unwrap_or_else(|e| panic!("monster spawn failed: {e}"));
    (world, player_id, monster_id)
}

/// Mage versus dragon on a 12×12 field.
#[must_use]
pub fn mage_vs_dragon() -> (World, EntityId, EntityId) {
    arena(
        12,
        12,
        (&roster::mage(), GridPos::new(1, 5)),
        (&roster::dragon(), GridPos::new(6, 5)),
    )
}

/// Drive a started combat to the end with the autopilot.
///
/// Player commands are issued every `step_ms`; returns `None` if the fight
/// is still running after `max_steps`.
pub fn play_out<U: CombatUi>(
    engine: &mut CombatEngine<U>,
    world: &mut World,
    mut now: SimTime,
    step_ms: u64,
    max_steps: usize,
) -> Option<CombatSummary> {
    for _ in 0..max_steps {
        let Some(session) = engine.session() else {
            return engine.last_summary().cloned();
        };
        if matches!(
            session.phase(),
            CombatPhase::Preparation | CombatPhase::PlayerTurn { .. }
        ) {
            let command = autopilot_command(world, session);
            let _ = engine.handle(world, command, now);
        }
        now += step_ms;
        engine.update(world, now);
    }
    engine
        .session()
        .is_none()
        .then(|| engine.last_summary().cloned())
        .flatten()
}
