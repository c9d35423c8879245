//! Free-roam façade tying the world, the combat engine and the clock.

use crate::clock::SimTime;
use crate::config::CombatConfig;
use crate::engine::{CombatEngine, CombatPhase, PlayerCommand};
use crate::entity::EntityId;
use crate::error::{GameError, Result};
use crate::grid::GridPos;
use crate::movement::MoveOutcome;
use crate::ui::{CombatUi, NullUi};
use crate::world::World;

/// One running game.
///
/// Outside combat each [`tick`](Self::tick) advances free-roam movement and,
/// with auto-engage on, starts a fight when the player walks into a
/// monster's detection range. During combat ticks drive the engine's
/// deadlines instead and movement requests are refused.
#[derive(Debug)]
pub struct Game<U: CombatUi = NullUi> {
    world: World,
    engine: CombatEngine<U>,
    now: SimTime,
    auto_engage: bool,
}

impl Game<NullUi> {
    /// Game without a presentation layer.
    #[must_use]
    pub fn headless(world: World, config: CombatConfig) -> Self {
        Self::new(world, config, NullUi)
    }
}

impl<U: CombatUi> Game<U> {
    /// Create a game at time 0 with auto-engage on.
    #[must_use]
    pub fn new(world: World, config: CombatConfig, ui: U) -> Self {
        Self {
            world,
            engine: CombatEngine::new(config, ui),
            now: 0,
            auto_engage: true,
        }
    }

    /// Turn automatic engagement on or off.
    pub fn set_auto_engage(&mut self, enabled: bool) {
        self.auto_engage = enabled;
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably (map edits, spawning).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The combat engine.
    #[must_use]
    pub const fn engine(&self) -> &CombatEngine<U> {
        &self.engine
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Current combat phase.
    #[must_use]
    pub fn phase(&self) -> CombatPhase {
        self.engine.phase()
    }

    /// Whether the player is gone or dead.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        !self.world.player().is_some_and(crate::entity::Entity::is_alive)
    }

    /// Walk the player to `goal`. Refused during combat.
    pub fn move_player(&mut self, goal: GridPos) -> Result<MoveOutcome> {
        if self.engine.is_active() {
            return Err(GameError::WrongPhase {
                phase: self.engine.phase().name(),
            });
        }
        self.world.move_player(goal)
    }

    /// Start combat with `monster`.
    pub fn engage(&mut self, monster: EntityId) -> Result<()> {
        self.engine.start_combat(&mut self.world, monster, self.now)
    }

    /// Forward a player command to the combat engine.
    pub fn command(&mut self, command: PlayerCommand) -> Result<()> {
        self.engine.handle(&mut self.world, command, self.now)
    }

    /// Advance time by `elapsed_ms` and run one update.
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.now = self.now.saturating_add(elapsed_ms);

        if self.engine.is_active() {
            self.engine.update(&mut self.world, self.now);
            return;
        }
        if self.is_game_over() {
            return;
        }

        self.world.tick();

        if self.auto_engage {
            if let Some(monster) = self.monster_in_detection_range() {
                tracing::info!(monster, "Monster noticed the player");
                if let Err(err) = self.engage(monster) {
                    tracing::warn!(%err, "Auto-engage failed");
                }
            }
        }
    }

    /// Lowest-id visible monster whose detection range covers the player.
    #[must_use]
    pub fn monster_in_detection_range(&self) -> Option<EntityId> {
        let player = self.world.player()?;
        self.world.visible_monsters().into_iter().find(|&id| {
            self.world.entities.get(id).is_some_and(|monster| {
                monster.is_alive()
                    && monster.detection_range > 0
                    && monster.tile.chebyshev(player.tile) <= monster.detection_range
            })
        })
    }
}
