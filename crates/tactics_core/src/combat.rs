//! Damage arithmetic and range checks.
//!
//! Damage is computed in integer percent so results are exact:
//! `floor(base * (100 + attribute + power) * (100 - resistance) / 10000)`.

use crate::error::{GameError, Result};
use crate::grid::GridPos;

/// Resistances are capped so damage can never go negative.
pub const MAX_RESISTANCE: u8 = 100;

/// Scale a base damage roll by attacker bonuses and target resistance.
#[must_use]
pub fn scale_damage(base: u32, attribute: u32, power: u32, resistance: u8) -> u32 {
    let multiplier = 100 + u64::from(attribute) + u64::from(power);
    let remaining = 100 - u64::from(resistance.min(MAX_RESISTANCE));
    let damage = u64::from(base) * multiplier * remaining / 10_000;
    u32::try_from(damage).unwrap_or(u32::MAX)
}

/// Reject an attack whose target lies beyond `range` tiles.
///
/// Distance is Euclidean and the boundary is inclusive.
pub fn check_range(attacker: GridPos, target: GridPos, range: u32) -> Result<()> {
    let distance_squared = attacker.distance_squared(target);
    let limit = i64::from(range) * i64::from(range);
    if distance_squared > limit {
        return Err(GameError::OutOfRange {
            distance_squared,
            range,
        });
    }
    Ok(())
}
