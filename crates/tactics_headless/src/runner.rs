//! Auto-battle runner.
//!
//! Walks through every monster of a scenario: engage the nearest one, let
//! the autopilot pick the player's commands, advance the clock in fixed
//! steps and record what each combat produced.

use serde::{Deserialize, Serialize};

use tactics_core::ai::autopilot_command;
use tactics_core::clock::SimTime;
use tactics_core::config::CombatConfig;
use tactics_core::engine::{CombatOutcome, CombatPhase, CombatSummary};
use tactics_core::entity::EntityId;
use tactics_core::game::Game;
use tactics_core::world::World;

/// Runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Simulation time advanced per step.
    pub step_ms: u64,
    /// Give up once the clock passes this.
    pub max_time_ms: SimTime,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_ms: 250,
            max_time_ms: 30 * 60 * 1000,
        }
    }
}

/// One combat of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Monster that was engaged.
    pub monster: EntityId,
    /// Its display name.
    pub monster_name: String,
    /// Simulation time the combat started.
    pub started_at: SimTime,
    /// What the engine reported.
    pub summary: CombatSummary,
}

/// Result of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Seed of the combat RNG.
    pub seed: u64,
    /// Whether the player is alive at the end.
    pub survived: bool,
    /// Whether the run hit the time limit.
    pub timed_out: bool,
    /// Player level at the end.
    pub player_level: u32,
    /// Player health at the end.
    pub player_health: u32,
    /// Monsters still in the world at the end.
    pub monsters_left: usize,
    /// Final simulation time.
    pub elapsed_ms: SimTime,
    /// Every combat, in order.
    pub battles: Vec<BattleReport>,
}

impl RunReport {
    /// Number of battles won.
    #[must_use]
    pub fn victories(&self) -> usize {
        self.battles
            .iter()
            .filter(|b| b.summary.outcome == CombatOutcome::Victory)
            .count()
    }

    /// Total experience earned.
    #[must_use]
    pub fn total_experience(&self) -> u32 {
        self.battles.iter().map(|b| b.summary.experience).sum()
    }
}

struct Engagement {
    monster: EntityId,
    monster_name: String,
    started_at: SimTime,
}

/// Plays a world to completion with the autopilot.
pub struct AutoBattleRunner {
    name: String,
    game: Game,
    config: RunnerConfig,
}

impl AutoBattleRunner {
    /// Create a runner. Engagement is driven by the runner, not by detection range.
    #[must_use]
    pub fn new(name: &str, world: World, combat: CombatConfig, config: RunnerConfig) -> Self {
        let mut game = Game::headless(world, combat);
        game.set_auto_engage(false);
        Self {
            name: name.to_string(),
            game,
            config,
        }
    }

    /// The underlying game.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Run until the player dies, no monster is left or time runs out.
    pub fn run(mut self) -> RunReport {
        let step_ms = self.config.step_ms.max(1);
        let mut battles = Vec::new();
        let mut engagement: Option<Engagement> = None;
        let mut timed_out = false;

        tracing::info!(scenario = %self.name, "Starting auto-battle run");

        loop {
            if !self.game.engine().is_active() {
                if let Some(done) = engagement.take() {
                    if let Some(summary) = self.game.engine().last_summary() {
                        tracing::info!(
                            monster = %done.monster_name,
                            outcome = ?summary.outcome,
                            turns = summary.turns,
                            "Battle finished"
                        );
                        battles.push(BattleReport {
                            monster: done.monster,
                            monster_name: done.monster_name,
                            started_at: done.started_at,
                            summary: summary.clone(),
                        });
                    }
                }
                if self.game.is_game_over() {
                    break;
                }
                let Some(monster) = self.nearest_monster() else {
                    break;
                };
                let monster_name = self
                    .game
                    .world()
                    .entities
                    .get(monster)
                    .map(|m| m.name.clone())
                    .unwrap_or_default();
                if let Err(err) = self.game.engage(monster) {
                    tracing::warn!(monster, %err, "Could not engage");
                    break;
                }
                engagement = Some(Engagement {
                    monster,
                    monster_name,
                    started_at: self.game.now(),
                });
            }

            self.issue_player_command();

            if self.game.now() >= self.config.max_time_ms {
                tracing::warn!(elapsed_ms = self.game.now(), "Run timed out");
                timed_out = true;
                break;
            }
            self.game.tick(step_ms);
        }

        let world = self.game.world();
        let player = world.player();
        RunReport {
            scenario: self.name,
            seed: self.game.engine().config().rng_seed,
            survived: player.is_some_and(|p| p.is_alive()),
            timed_out,
            player_level: player.map_or(0, |p| p.level()),
            player_health: player.map_or(0, |p| p.health()),
            monsters_left: world.monsters().len(),
            elapsed_ms: self.game.now(),
            battles,
        }
    }

    fn issue_player_command(&mut self) {
        let Some(session) = self.game.engine().session() else {
            return;
        };
        if !matches!(
            session.phase(),
            CombatPhase::Preparation | CombatPhase::PlayerTurn { .. }
        ) {
            return;
        }
        let command = autopilot_command(self.game.world(), session);
        if let Err(err) = self.game.command(command) {
            tracing::debug!(?command, %err, "Autopilot command rejected");
        }
    }

    /// Closest living monster by Chebyshev distance, lowest id on ties.
    fn nearest_monster(&self) -> Option<EntityId> {
        let world = self.game.world();
        let player_tile = world.player()?.tile;
        world
            .monsters()
            .into_iter()
            .filter_map(|id| {
                let monster = world.entities.get(id)?;
                monster
                    .is_alive()
                    .then(|| (monster.tile.chebyshev(player_tile), id))
            })
            .min()
            .map(|(_, id)| id)
    }
}
