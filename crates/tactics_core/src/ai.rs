//! Monster turn policies.
//!
//! Policies are greedy and reactive: a monster walks one rounded-direction
//! step at a time toward its target and gives up moving at the first blocked
//! step. It never plans around obstacles.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{CombatPhase, CombatSession, PlayerCommand};
use crate::entity::Entity;
use crate::grid::{Grid, GridPos};
use crate::world::World;

/// How a monster spends its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MonsterBehavior {
    /// Close the distance, then attack while AP allows.
    #[default]
    Charger,
    /// Hold position; attack only what is already in range.
    Sentinel,
}

/// One attack made during a monster turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterAction {
    /// Spell used.
    pub spell: String,
    /// Damage the target actually took.
    pub damage: u32,
}

/// Everything a monster did on its turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterTurnReport {
    /// Tiles stepped onto, in order.
    pub steps: Vec<GridPos>,
    /// Attacks made, in order.
    pub actions: Vec<MonsterAction>,
}

impl MonsterTurnReport {
    /// Total damage dealt.
    #[must_use]
    pub fn total_damage(&self) -> u32 {
        self.actions.iter().map(|action| action.damage).sum()
    }
}

/// Unit step from `from` toward `to`, rounding the direction vector.
///
/// A component is non-zero when it makes up at least half of the unit
/// direction (`|cos| >= 0.5`, i.e. `3dx² >= dy²`).
#[must_use]
pub fn step_toward(from: GridPos, to: GridPos) -> (i32, i32) {
    let dx = i64::from(to.x) - i64::from(from.x);
    let dy = i64::from(to.y) - i64::from(from.y);
    let component = |main: i64, other: i64| -> i32 {
        if main != 0 && 3 * main * main >= other * other {
            if main > 0 {
                1
            } else {
                -1
            }
        } else {
            0
        }
    };
    (component(dx, dy), component(dy, dx))
}

/// Run one monster turn against `target`.
///
/// `occupied` lists tiles held by other combatants; the monster will not step
/// onto them or onto the target's tile. AP/MP are spent from the monster's
/// current pool; resetting them is the caller's job.
pub fn perform_turn<R: Rng + ?Sized>(
    monster: &mut Entity,
    target: &mut Entity,
    grid: &Grid,
    occupied: &[GridPos],
    rng: &mut R,
) -> MonsterTurnReport {
    let mut report = MonsterTurnReport::default();
    let behavior = monster.behavior.unwrap_or_default();

    if behavior == MonsterBehavior::Charger {
        let reach = monster
            .spells()
            .iter()
            .filter(|spell| spell.ap_cost <= monster.max_ap())
            .map(|spell| spell.range)
            .max()
            .unwrap_or(0);

        while !monster.in_range(target.tile, reach) && monster.current_mp() > 0 {
            let (dx, dy) = step_toward(monster.tile, target.tile);
            if (dx, dy) == (0, 0) {
                break;
            }
            let next = monster.tile.offset(dx, dy);
            if !grid.is_walkable(next) || next == target.tile || occupied.contains(&next) {
                tracing::debug!(monster = monster.id, ?next, "Monster step blocked");
                break;
            }
            if let Err(err) = monster.use_mp(1) {
                tracing::debug!(monster = monster.id, %err, "Monster cannot move");
                break;
            }
            monster.teleport(next);
            report.steps.push(next);
        }
    }

    while target.is_alive() {
        let Some(index) = monster.spells().iter().position(|spell| {
            spell.ap_cost <= monster.current_ap() && monster.in_range(target.tile, spell.range)
        }) else {
            break;
        };
        let (name, cost) = {
            let spell = &monster.spells()[index];
            (spell.name.clone(), spell.ap_cost)
        };
        let damage = monster.attack(index, &target.resistances, rng);
        let taken = target.take_damage(damage);
        report.actions.push(MonsterAction {
            spell: name,
            damage: taken,
        });
        if cost == 0 {
            break;
        }
    }

    tracing::debug!(
        monster = monster.id,
        steps = report.steps.len(),
        attacks = report.actions.len(),
        "Monster turn finished"
    );
    report
}

/// Simple player policy for unattended battles.
///
/// Takes the first offered starting tile, then each turn casts the affordable
/// in-range spell with the highest maximum damage at the nearest living
/// monster, and ends the turn when nothing is castable.
#[must_use]
pub fn autopilot_command(world: &World, session: &CombatSession) -> PlayerCommand {
    match *session.phase() {
        CombatPhase::Preparation => match (session.selected_start(), session.start_candidates().first()) {
            (None, Some(&start)) => PlayerCommand::SelectStart(start),
            _ => PlayerCommand::Ready,
        },
        CombatPhase::PlayerTurn { actor } => {
            let Some(caster) = world.entities.get(actor) else {
                return PlayerCommand::EndTurn;
            };
            let target = session
                .monsters()
                .living(&world.entities)
                .into_iter()
                .filter_map(|id| world.entities.get(id))
                .min_by_key(|monster| (caster.tile.distance_squared(monster.tile), monster.id));
            let Some(target) = target else {
                return PlayerCommand::EndTurn;
            };
            caster
                .spells()
                .iter()
                .enumerate()
                .filter(|(_, spell)| {
                    spell.ap_cost <= caster.current_ap() && caster.in_range(target.tile, spell.range)
                })
                .max_by_key(|(index, spell)| (spell.max_damage, std::cmp::Reverse(*index)))
                .map_or(PlayerCommand::EndTurn, |(index, _)| PlayerCommand::CastSpell {
                    spell: index,
                    target: target.id,
                })
        }
        _ => PlayerCommand::EndTurn,
    }
}
