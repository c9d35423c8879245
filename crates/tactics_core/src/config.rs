//! Combat tuning loaded from RON.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Timers, rewards and randomness for the combat engine.
///
/// Every field has a default, so a RON file only needs the values it changes:
///
/// ```ron
/// CombatConfig(
///     turn_time_limit_ms: 15000,
///     rng_seed: 42,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Length of a player turn.
    pub turn_time_limit_ms: u64,
    /// Length of the preparation phase.
    pub preparation_time_ms: u64,
    /// Pause before a monster acts.
    pub monster_think_delay_ms: u64,
    /// Pause after a monster acted, before the next turn.
    pub monster_end_turn_delay_ms: u64,
    /// Base experience per defeated monster.
    pub base_experience: u32,
    /// Offsets from the enemy offered as starting tiles.
    pub start_offsets: Vec<(i32, i32)>,
    /// Seed of the combat RNG.
    pub rng_seed: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            turn_time_limit_ms: 30_000,
            preparation_time_ms: 30_000,
            monster_think_delay_ms: 1_000,
            monster_end_turn_delay_ms: 1_000,
            base_experience: 100,
            start_offsets: vec![(-3, 0), (3, 0), (0, -3)],
            rng_seed: 0,
        }
    }
}

impl CombatConfig {
    /// Parse and validate a RON config.
    pub fn from_ron(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            what: "combat config",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the engine cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.turn_time_limit_ms == 0 {
            return Err(GameError::InvalidState(
                "turn_time_limit_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
