//! Experience and leveling.

use crate::entity::Entity;

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 20;

/// Total experience required to reach level `index + 1`.
pub const EXPERIENCE_TABLE: [u32; MAX_LEVEL as usize] = [
    0, 100, 300, 600, 1000, 1500, 2100, 2800, 3600, 4500, 5500, 6600, 7800, 9100, 10500, 12000,
    13600, 15300, 17100, 19000,
];

/// Max health gained per level.
pub const HEALTH_PER_LEVEL: u32 = 10;

/// Flat attack damage gained per level.
pub const ATTACK_DAMAGE_PER_LEVEL: u32 = 2;

/// Power gained per level.
pub const POWER_PER_LEVEL: u32 = 2;

/// Experience for defeating a level `defeated` enemy at level `winner`.
///
/// `floor(base * defeated * max(0.5, 1 + 0.1 * (defeated - winner)))`,
/// evaluated in tenths so the result is exact.
#[must_use]
pub fn experience_for_defeat(base: u32, defeated_level: u32, winner_level: u32) -> u32 {
    let diff = i64::from(defeated_level) - i64::from(winner_level);
    let multiplier_tenths = (10 + diff).max(5);
    let total = i64::from(base) * i64::from(defeated_level) * multiplier_tenths / 10;
    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Experience needed to go from `level` to `level + 1`, if any.
#[must_use]
pub fn next_threshold(level: u32) -> Option<u32> {
    if level >= MAX_LEVEL {
        return None;
    }
    EXPERIENCE_TABLE.get(level as usize).copied()
}

impl Entity {
    /// Add experience and apply every level-up it pays for.
    ///
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while let Some(threshold) = next_threshold(self.level) {
            if self.experience < threshold {
                break;
            }
            self.level_up();
            gained += 1;
        }
        gained
    }

    /// Raise the level by one, growing stats and refilling resources.
    pub fn level_up(&mut self) {
        if self.level >= MAX_LEVEL {
            return;
        }
        self.level += 1;
        self.grow(HEALTH_PER_LEVEL, ATTACK_DAMAGE_PER_LEVEL, POWER_PER_LEVEL);
        self.restore_health();
        self.reset_turn_resources();
        tracing::info!(entity = self.id, level = self.level, "Level up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::roster;
    use crate::grid::GridPos;

    #[test]
    fn test_experience_formula() {
        assert_eq!(experience_for_defeat(100, 1, 1), 100);
        assert_eq!(experience_for_defeat(100, 3, 1), 360);
        // Floor of 0.5 for much weaker enemies.
        assert_eq!(experience_for_defeat(100, 1, 10), 50);
        assert_eq!(experience_for_defeat(100, 2, 5), 140);
    }

    #[test]
    fn test_table_is_increasing() {
        assert!(EXPERIENCE_TABLE.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(next_threshold(1), Some(100));
        assert_eq!(next_threshold(MAX_LEVEL), None);
    }

    #[test]
    fn test_level_up_grows_stats() {
        let mut warrior = Entity::from_profile(&roster::warrior(), GridPos::default());
        warrior.take_damage(50);
        warrior.use_ap(6).unwrap();

        warrior.level_up();
        assert_eq!(warrior.level(), 2);
        assert_eq!(warrior.max_health(), 130);
        assert_eq!(warrior.health(), 130);
        assert_eq!(warrior.attack_damage, 32);
        assert_eq!(warrior.attributes.power, 2);
        assert_eq!(warrior.current_ap(), 6);
    }

    #[test]
    fn test_gain_experience_multiple_levels() {
        let mut mage = Entity::from_profile(&roster::mage(), GridPos::default());
        assert_eq!(mage.gain_experience(99), 0);
        assert_eq!(mage.level(), 1);
        assert_eq!(mage.gain_experience(1), 1);
        assert_eq!(mage.level(), 2);
        assert_eq!(mage.gain_experience(500), 2);
        assert_eq!(mage.level(), 4);
        assert_eq!(mage.experience(), 600);
    }

    #[test]
    fn test_level_capped() {
        let mut mage = Entity::from_profile(&roster::mage(), GridPos::default());
        mage.gain_experience(u32::MAX);
        assert_eq!(mage.level(), MAX_LEVEL);
        mage.level_up();
        assert_eq!(mage.level(), MAX_LEVEL);
    }
}
