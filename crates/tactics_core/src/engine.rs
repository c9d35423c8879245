//! Turn-based combat engine.
//!
//! # Phases
//!
//! ```text
//! Idle -> Preparation -> PlayerTurn <-> MonsterTurn -> Resolved -> Idle
//! ```
//!
//! [`CombatEngine::start_combat`] builds the two teams and the initiative
//! order and opens the preparation phase. The player picks a starting tile
//! and confirms (or lets the preparation timer run out), then actors take
//! turns in initiative order. Player input arrives as [`PlayerCommand`]s;
//! monster turns and all deadlines are driven by [`CombatEngine::update`].
//!
//! # Time
//!
//! Deadlines are processed at the time they fall due, not at the time
//! `update` happens to be called, so one large jump in [`SimTime`] replays the
//! same sequence as many small ones. When a team is defeated the session is
//! dropped together with every pending deadline.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{self, MonsterTurnReport};
use crate::clock::{SimTime, TurnTimer};
use crate::combat::check_range;
use crate::config::CombatConfig;
use crate::entity::{Element, Entity, EntityId, Role};
use crate::error::{GameError, Result};
use crate::grid::GridPos;
use crate::progression::experience_for_defeat;
use crate::team::{interleave, Team};
use crate::ui::{CombatUi, NullUi};
use crate::world::World;

/// How a combat ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// Every monster was defeated.
    Victory,
    /// Every player was defeated.
    Defeat,
}

/// Current phase of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    /// No combat running.
    Idle,
    /// Choosing a starting tile.
    Preparation,
    /// A player entity is acting.
    PlayerTurn {
        /// Acting entity.
        actor: EntityId,
    },
    /// A monster is acting.
    MonsterTurn {
        /// Acting entity.
        actor: EntityId,
    },
    /// A side was defeated. Only observed by the UI before returning to Idle.
    Resolved(CombatOutcome),
}

impl CombatPhase {
    /// Short name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Preparation => "Preparation",
            Self::PlayerTurn { .. } => "PlayerTurn",
            Self::MonsterTurn { .. } => "MonsterTurn",
            Self::Resolved(_) => "Resolved",
        }
    }
}

/// Player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Pick one of the offered starting tiles (preparation only).
    SelectStart(GridPos),
    /// Leave preparation and start the first turn.
    Ready,
    /// Cast spell `spell` of the acting player at `target`.
    CastSpell {
        /// Index into the caster's spell list.
        spell: usize,
        /// Targeted monster.
        target: EntityId,
    },
    /// End the acting player's turn.
    EndTurn,
}

/// A spell as offered to the player this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellOption {
    /// Index to use in [`PlayerCommand::CastSpell`].
    pub index: usize,
    /// Spell name.
    pub name: String,
    /// AP cost.
    pub ap_cost: u32,
    /// Range in tiles.
    pub range: u32,
    /// Element.
    pub element: Element,
    /// Whether the caster has enough AP right now.
    pub affordable: bool,
}

impl SpellOption {
    /// Options for every spell of `caster`.
    #[must_use]
    pub fn list(caster: &Entity) -> Vec<Self> {
        caster
            .spells()
            .iter()
            .enumerate()
            .map(|(index, spell)| Self {
                index,
                name: spell.name.clone(),
                ap_cost: spell.ap_cost,
                range: spell.range,
                element: spell.element,
                affordable: spell.ap_cost <= caster.current_ap(),
            })
            .collect()
    }
}

/// One entry of the combat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Acting entity.
    pub attacker: EntityId,
    /// Its display name.
    pub attacker_name: String,
    /// Entity hit.
    pub target: EntityId,
    /// Its display name.
    pub target_name: String,
    /// Spell used.
    pub spell: String,
    /// Damage taken by the target.
    pub damage: u32,
    /// Turn counter at the time of the action.
    pub turn: u32,
    /// Simulation time of the action.
    pub timestamp: SimTime,
}

/// What a finished combat produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSummary {
    /// Winner.
    pub outcome: CombatOutcome,
    /// Turn counter when the combat ended.
    pub turns: u32,
    /// Experience granted to the player.
    pub experience: u32,
    /// Levels gained from that experience.
    pub levels_gained: u32,
    /// Monsters removed from the world.
    pub removed: Vec<EntityId>,
    /// Full action log.
    pub history: Vec<ActionRecord>,
    /// Simulation time of the resolution.
    pub ended_at: SimTime,
}

/// Upper bound on deadlines a single [`CombatEngine::update`] call fires.
pub const MAX_DEADLINES_PER_UPDATE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheduled {
    MonsterAct(EntityId),
    Advance,
}

/// Working state of one combat.
#[derive(Debug, Clone)]
pub struct CombatSession {
    phase: CombatPhase,
    enemy: EntityId,
    players: Team,
    monsters: Team,
    initiative: Vec<EntityId>,
    current: Option<usize>,
    turn: u32,
    start_candidates: Vec<GridPos>,
    selected_start: Option<GridPos>,
    timer: Option<TurnTimer>,
    scheduled: Option<(SimTime, Scheduled)>,
    history: Vec<ActionRecord>,
}

impl CombatSession {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &CombatPhase {
        &self.phase
    }

    /// Monster that triggered the combat.
    #[must_use]
    pub const fn enemy(&self) -> EntityId {
        self.enemy
    }

    /// Player side.
    #[must_use]
    pub const fn players(&self) -> &Team {
        &self.players
    }

    /// Monster side.
    #[must_use]
    pub const fn monsters(&self) -> &Team {
        &self.monsters
    }

    /// Fixed turn order.
    #[must_use]
    pub fn initiative(&self) -> &[EntityId] {
        &self.initiative
    }

    /// Entity whose turn it is.
    #[must_use]
    pub fn current_actor(&self) -> Option<EntityId> {
        self.current.and_then(|index| self.initiative.get(index).copied())
    }

    /// Turn counter, starting at 1; grows each time initiative wraps.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Starting tiles offered during preparation.
    #[must_use]
    pub fn start_candidates(&self) -> &[GridPos] {
        &self.start_candidates
    }

    /// Starting tile chosen so far.
    #[must_use]
    pub const fn selected_start(&self) -> Option<GridPos> {
        self.selected_start
    }

    /// Action log.
    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// Time left on the running countdown.
    #[must_use]
    pub fn timer_remaining(&self, now: SimTime) -> Option<u64> {
        self.timer.map(|timer| timer.remaining(now))
    }

    fn next_due(&self) -> Option<SimTime> {
        match self.phase {
            CombatPhase::Preparation | CombatPhase::PlayerTurn { .. } => self
                .timer
                .filter(|timer| !timer.has_fired())
                .map(|timer| timer.deadline()),
            CombatPhase::MonsterTurn { .. } => self.scheduled.map(|(at, _)| at),
            CombatPhase::Idle | CombatPhase::Resolved(_) => None,
        }
    }

    fn is_resolved(&self) -> bool {
        matches!(self.phase, CombatPhase::Resolved(_))
    }

    fn acting_player(&self) -> Result<EntityId> {
        match self.phase {
            CombatPhase::PlayerTurn { actor } => Ok(actor),
            ref phase => Err(GameError::WrongPhase { phase: phase.name() }),
        }
    }
}

/// Drives combat sessions over a [`World`].
#[derive(Debug)]
pub struct CombatEngine<U: CombatUi = NullUi> {
    config: CombatConfig,
    ui: U,
    rng: ChaCha8Rng,
    session: Option<CombatSession>,
    last_summary: Option<CombatSummary>,
}

impl Default for CombatEngine<NullUi> {
    fn default() -> Self {
        Self::new(CombatConfig::default(), NullUi)
    }
}

impl<U: CombatUi> CombatEngine<U> {
    /// Create an idle engine. The RNG is seeded from `config.rng_seed`.
    #[must_use]
    pub fn new(config: CombatConfig, ui: U) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            ui,
            rng,
            session: None,
            last_summary: None,
        }
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Presentation sink.
    #[must_use]
    pub const fn ui(&self) -> &U {
        &self.ui
    }

    /// Presentation sink, mutably.
    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Running session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&CombatSession> {
        self.session.as_ref()
    }

    /// Current phase ([`CombatPhase::Idle`] without a session).
    #[must_use]
    pub fn phase(&self) -> CombatPhase {
        self.session
            .as_ref()
            .map_or(CombatPhase::Idle, |session| session.phase.clone())
    }

    /// Whether a combat is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Summary of the most recent finished combat.
    #[must_use]
    pub const fn last_summary(&self) -> Option<&CombatSummary> {
        self.last_summary.as_ref()
    }

    /// Engage `enemy` with the world's player.
    pub fn start_combat(&mut self, world: &mut World, enemy: EntityId, now: SimTime) -> Result<()> {
        self.start_combat_with(world, &[enemy], now)
    }

    /// Engage a group of monsters. The first one anchors the starting tiles.
    ///
    /// # Errors
    ///
    /// [`GameError::WrongPhase`] if a combat is already running,
    /// [`GameError::InvalidState`] without a living player,
    /// [`GameError::InvalidTarget`] for missing, dead or hidden monsters and
    /// [`GameError::InvalidTeamComposition`] if a player is listed.
    pub fn start_combat_with(
        &mut self,
        world: &mut World,
        enemies: &[EntityId],
        now: SimTime,
    ) -> Result<()> {
        if let Some(session) = &self.session {
            return Err(GameError::WrongPhase {
                phase: session.phase.name(),
            });
        }
        let player_id = world
            .player_id()
            .ok_or_else(|| GameError::InvalidState("no player to fight with".to_string()))?;
        let &anchor = enemies
            .first()
            .ok_or_else(|| GameError::InvalidState("no enemy to fight".to_string()))?;

        let mut players = Team::new();
        let player = world
            .entities
            .get(player_id)
            .ok_or(GameError::EntityNotFound(player_id))?;
        if !player.is_alive() {
            return Err(GameError::InvalidState(
                "a defeated player cannot start combat".to_string(),
            ));
        }
        players.add_entity(player)?;

        let mut monsters = Team::new();
        for &id in enemies {
            let monster = world.entities.get(id).ok_or(GameError::EntityNotFound(id))?;
            if !monster.is_alive() || !monster.visible {
                return Err(GameError::InvalidTarget(id));
            }
            monsters.add_entity(monster)?;
        }
        if monsters.role() != Some(Role::Monster) {
            return Err(GameError::InvalidTarget(anchor));
        }

        for &id in players.members().iter().chain(monsters.members()) {
            if let Some(entity) = world.entities.get_mut(id) {
                entity.restore_health();
                entity.movement.clear();
            }
        }
        world.hide_monsters_except(monsters.members());

        let initiative = interleave(&players, &monsters);
        let start_candidates = self.start_candidates(world, anchor);

        let session = CombatSession {
            phase: CombatPhase::Preparation,
            enemy: anchor,
            players,
            monsters,
            initiative,
            current: None,
            turn: 0,
            start_candidates,
            selected_start: None,
            timer: Some(TurnTimer::start(now, self.config.preparation_time_ms)),
            scheduled: None,
            history: Vec::new(),
        };

        tracing::info!(
            player = player_id,
            enemies = ?enemies,
            initiative = ?session.initiative,
            "Combat started"
        );

        self.ui.show();
        self.ui.update_phase(&session.phase);
        if let Some(monster) = world.entities.get(anchor) {
            self.ui.update_monster_stats(monster);
        }
        self.ui.update_timer(self.config.preparation_time_ms);
        self.session = Some(session);
        Ok(())
    }

    /// Apply a player command.
    ///
    /// Rejected commands leave the session unchanged.
    pub fn handle(&mut self, world: &mut World, command: PlayerCommand, now: SimTime) -> Result<()> {
        let result = self.with_session(world, now, |engine, world, session| match command {
            PlayerCommand::SelectStart(pos) => engine.select_start(session, pos),
            PlayerCommand::Ready => match session.phase {
                CombatPhase::Preparation => {
                    engine.begin_battle(world, session, now);
                    Ok(())
                }
                ref phase => Err(GameError::WrongPhase { phase: phase.name() }),
            },
            PlayerCommand::CastSpell { spell, target } => {
                engine.cast_spell(world, session, spell, target, now)
            }
            PlayerCommand::EndTurn => {
                let actor = session.acting_player()?;
                tracing::debug!(actor, "Player ended turn");
                engine.advance(world, session, now);
                Ok(())
            }
        });
        if let Err(err) = &result {
            tracing::warn!(?command, %err, "Command rejected");
            if err.is_recoverable() {
                self.ui.notify(&err.to_string());
            }
        }
        result
    }

    /// Process every deadline due at or before `now` and refresh the timer.
    ///
    /// At most [`MAX_DEADLINES_PER_UPDATE`] deadlines fire per call; the next
    /// call picks up the rest.
    pub fn update(&mut self, world: &mut World, now: SimTime) {
        let _ = self.with_session(world, now, |engine, world, session| {
            let mut fired = 0;
            while let Some(due) = session.next_due() {
                if due > now || session.is_resolved() {
                    break;
                }
                if fired == MAX_DEADLINES_PER_UPDATE {
                    tracing::warn!(due, now, "Deadline backlog, deferring to next update");
                    break;
                }
                engine.fire(world, session, due);
                fired += 1;
            }
            if !session.is_resolved() {
                if let Some(remaining) = session.timer_remaining(now) {
                    engine.ui.update_timer(remaining);
                }
            }
            Ok(())
        });
    }

    fn with_session<T>(
        &mut self,
        world: &mut World,
        now: SimTime,
        op: impl FnOnce(&mut Self, &mut World, &mut CombatSession) -> Result<T>,
    ) -> Result<T> {
        let mut session = self.session.take().ok_or(GameError::WrongPhase { phase: "Idle" })?;
        let result = op(self, world, &mut session);
        if let CombatPhase::Resolved(outcome) = session.phase {
            self.finish(world, session, outcome, now);
        } else {
            self.session = Some(session);
        }
        result
    }

    /// Walkable, unoccupied tiles at the configured offsets from `anchor`.
    fn start_candidates(&self, world: &World, anchor: EntityId) -> Vec<GridPos> {
        let Some(enemy) = world.entities.get(anchor) else {
            return Vec::new();
        };
        let player: Vec<EntityId> = world.player_id().into_iter().collect();
        let occupied = world.occupied_tiles(&player);
        self.config
            .start_offsets
            .iter()
            .map(|&(dx, dy)| enemy.tile.offset(dx, dy))
            .filter(|&pos| world.grid.is_walkable(pos) && !occupied.contains(&pos))
            .collect()
    }

    fn select_start(&mut self, session: &mut CombatSession, pos: GridPos) -> Result<()> {
        if session.phase != CombatPhase::Preparation {
            return Err(GameError::WrongPhase {
                phase: session.phase.name(),
            });
        }
        if !session.start_candidates.contains(&pos) {
            return Err(GameError::InvalidStartingPosition { x: pos.x, y: pos.y });
        }
        session.selected_start = Some(pos);
        tracing::debug!(?pos, "Starting position selected");
        Ok(())
    }

    fn begin_battle(&mut self, world: &mut World, session: &mut CombatSession, at: SimTime) {
        if let Some(start) = session.selected_start {
            for &id in session.players.members() {
                if let Some(player) = world.entities.get_mut(id) {
                    player.teleport(start);
                }
            }
        }
        session.players.reset_team(&mut world.entities);
        session.monsters.reset_team(&mut world.entities);
        session.timer = None;
        session.current = None;
        session.turn = 1;
        tracing::debug!(start = ?session.selected_start, "Battle begins");
        self.advance(world, session, at);
    }

    /// Check for defeat, then hand the turn to the next living actor.
    fn advance(&mut self, world: &mut World, session: &mut CombatSession, at: SimTime) {
        session.timer = None;
        session.scheduled = None;

        if session.monsters.is_defeated(&world.entities) {
            session.phase = CombatPhase::Resolved(CombatOutcome::Victory);
            return;
        }
        if session.players.is_defeated(&world.entities) {
            session.phase = CombatPhase::Resolved(CombatOutcome::Defeat);
            return;
        }

        let len = session.initiative.len();
        let mut index = session.current;
        let actor = loop {
            let next = index.map_or(0, |i| i + 1);
            let next = if next >= len {
                session.turn = session.turn.saturating_add(1);
                0
            } else {
                next
            };
            index = Some(next);
            let id = session.initiative[next];
            if world.entities.get(id).is_some_and(Entity::is_alive) {
                break id;
            }
        };
        session.current = index;
        self.start_turn(world, session, actor, at);
    }

    fn start_turn(&mut self, world: &mut World, session: &mut CombatSession, actor: EntityId, at: SimTime) {
        let Some(entity) = world.entities.get_mut(actor) else {
            return;
        };
        entity.reset_turn_resources();

        match entity.role {
            Role::Player => {
                session.phase = CombatPhase::PlayerTurn { actor };
                session.timer = Some(TurnTimer::start(at, self.config.turn_time_limit_ms.max(1)));
                let options = SpellOption::list(entity);
                self.ui.update_phase(&session.phase);
                self.ui.update_spell_list(entity, &options);
                self.ui.update_timer(self.config.turn_time_limit_ms);
            }
            Role::Monster => {
                session.phase = CombatPhase::MonsterTurn { actor };
                session.scheduled = Some((
                    at.saturating_add(self.config.monster_think_delay_ms),
                    Scheduled::MonsterAct(actor),
                ));
                self.ui.update_phase(&session.phase);
                self.ui.update_monster_stats(entity);
            }
        }
        tracing::debug!(actor, turn = session.turn, phase = session.phase.name(), "Turn started");
    }

    fn fire(&mut self, world: &mut World, session: &mut CombatSession, due: SimTime) {
        match session.phase {
            CombatPhase::Preparation => {
                if session.timer.as_mut().is_some_and(|timer| timer.poll(due)) {
                    self.ui.set_timer_expired();
                    tracing::debug!("Preparation timer expired");
                    self.begin_battle(world, session, due);
                }
            }
            CombatPhase::PlayerTurn { actor } => {
                if session.timer.as_mut().is_some_and(|timer| timer.poll(due)) {
                    self.ui.set_timer_expired();
                    tracing::debug!(actor, "Turn timer expired");
                    self.advance(world, session, due);
                }
            }
            CombatPhase::MonsterTurn { .. } => match session.scheduled.take() {
                Some((_, Scheduled::MonsterAct(actor))) => {
                    self.monster_act(world, session, actor, due);
                    if session.players.is_defeated(&world.entities) {
                        session.phase = CombatPhase::Resolved(CombatOutcome::Defeat);
                    } else {
                        session.scheduled = Some((
                            due.saturating_add(self.config.monster_end_turn_delay_ms),
                            Scheduled::Advance,
                        ));
                    }
                }
                Some((_, Scheduled::Advance)) => self.advance(world, session, due),
                None => {}
            },
            CombatPhase::Idle | CombatPhase::Resolved(_) => {}
        }
    }

    fn cast_spell(
        &mut self,
        world: &mut World,
        session: &mut CombatSession,
        index: usize,
        target: EntityId,
        now: SimTime,
    ) -> Result<()> {
        let actor = session.acting_player()?;
        if !session.monsters.contains(target) {
            return Err(GameError::InvalidTarget(target));
        }

        let (caster, victim) = world
            .entities
            .pair_mut(actor, target)
            .ok_or(GameError::EntityNotFound(target))?;
        if !victim.is_alive() {
            return Err(GameError::InvalidTarget(target));
        }
        let spell = caster.spell(index).ok_or(GameError::UnknownSpell {
            entity: actor,
            index,
        })?;
        check_range(caster.tile, victim.tile, spell.range)?;
        if spell.ap_cost > caster.current_ap() {
            return Err(GameError::InsufficientActionPoints {
                required: spell.ap_cost,
                available: caster.current_ap(),
            });
        }
        let spell_name = spell.name.clone();

        let damage = caster.attack(index, &victim.resistances, &mut self.rng);
        let taken = victim.take_damage(damage);
        let record = ActionRecord {
            attacker: actor,
            attacker_name: caster.name.clone(),
            target,
            target_name: victim.name.clone(),
            spell: spell_name,
            damage: taken,
            turn: session.turn,
            timestamp: now,
        };
        tracing::debug!(
            attacker = actor,
            target,
            spell = %record.spell,
            damage = taken,
            remaining = victim.health(),
            "Spell cast"
        );
        session.history.push(record);

        self.ui.update_history(&session.history);
        self.ui.update_monster_stats(victim);
        let options = SpellOption::list(caster);
        self.ui.update_spell_list(caster, &options);

        if session.monsters.is_defeated(&world.entities) {
            session.timer = None;
            session.phase = CombatPhase::Resolved(CombatOutcome::Victory);
        }
        Ok(())
    }

    fn monster_act(&mut self, world: &mut World, session: &mut CombatSession, actor: EntityId, at: SimTime) {
        let Some(&target) = session.players.living(&world.entities).first() else {
            return;
        };
        let occupied = world.occupied_tiles(&[actor, target]);
        let Some((monster, player)) = world.entities.pair_mut(actor, target) else {
            return;
        };
        let report: MonsterTurnReport =
            ai::perform_turn(monster, player, &world.grid, &occupied, &mut self.rng);

        for action in report.actions {
            session.history.push(ActionRecord {
                attacker: actor,
                attacker_name: monster.name.clone(),
                target,
                target_name: player.name.clone(),
                spell: action.spell,
                damage: action.damage,
                turn: session.turn,
                timestamp: at,
            });
        }
        self.ui.update_history(&session.history);
        self.ui.update_monster_stats(monster);
    }

    fn finish(&mut self, world: &mut World, session: CombatSession, outcome: CombatOutcome, at: SimTime) {
        let mut experience = 0;
        let mut levels_gained = 0;
        let mut removed = Vec::new();

        if outcome == CombatOutcome::Victory {
            let winner = world
                .player_id()
                .filter(|&id| session.players.contains(id))
                .filter(|&id| world.entities.get(id).is_some_and(Entity::is_alive))
                .or_else(|| session.players.living(&world.entities).first().copied());
            let winner_level = winner
                .and_then(|id| world.entities.get(id))
                .map_or(1, Entity::level);

            for id in session.monsters.dead(&world.entities) {
                if let Some(monster) = world.despawn(id) {
                    experience += experience_for_defeat(
                        self.config.base_experience,
                        monster.level(),
                        winner_level,
                    );
                    removed.push(id);
                }
            }

            if let Some(player) = winner.and_then(|id| world.entities.get_mut(id)) {
                levels_gained = player.gain_experience(experience);
                player.restore_health();
            }
        }
        world.show_all_monsters();

        let message = match outcome {
            CombatOutcome::Victory => format!("Victory! Gained {experience} experience."),
            CombatOutcome::Defeat => "Defeat! You have been slain.".to_string(),
        };
        tracing::info!(
            ?outcome,
            turns = session.turn,
            experience,
            removed = ?removed,
            "Combat resolved"
        );

        self.ui.update_phase(&CombatPhase::Resolved(outcome));
        self.ui.notify(&message);
        self.ui.hide();
        self.ui.update_phase(&CombatPhase::Idle);

        self.last_summary = Some(CombatSummary {
            outcome,
            turns: session.turn,
            experience,
            levels_gained,
            removed,
            history: session.history,
            ended_at: at,
        });
    }
}
