//! Presentation port for the combat engine.
//!
//! The engine pushes state into a [`CombatUi`] and never reads from it.
//! Player choices come back through
//! [`PlayerCommand`](crate::engine::PlayerCommand).

use serde::{Deserialize, Serialize};

use crate::engine::{ActionRecord, CombatPhase, SpellOption};
use crate::entity::Entity;

/// Sink for combat presentation updates. Every method defaults to a no-op.
pub trait CombatUi {
    /// Combat started; show the panel.
    fn show(&mut self) {}

    /// Combat over; hide the panel.
    fn hide(&mut self) {}

    /// Phase changed.
    fn update_phase(&mut self, _phase: &CombatPhase) {}

    /// Enemy stats changed.
    fn update_monster_stats(&mut self, _monster: &Entity) {}

    /// Spell list of the acting player with affordability flags.
    fn update_spell_list(&mut self, _caster: &Entity, _spells: &[SpellOption]) {}

    /// Time left in the current turn or preparation.
    fn update_timer(&mut self, _remaining_ms: u64) {}

    /// The running timer reached zero.
    fn set_timer_expired(&mut self) {}

    /// Full action history.
    fn update_history(&mut self, _entries: &[ActionRecord]) {}

    /// Informational message (victory, defeat, rejected command).
    fn notify(&mut self, _message: &str) {}
}

/// UI that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUi;

impl CombatUi for NullUi {}

/// One recorded UI call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    /// [`CombatUi::show`].
    Show,
    /// [`CombatUi::hide`].
    Hide,
    /// [`CombatUi::update_phase`].
    Phase(CombatPhase),
    /// [`CombatUi::update_monster_stats`]: monster health.
    MonsterStats {
        /// Health left.
        health: u32,
        /// Maximum health.
        max_health: u32,
    },
    /// [`CombatUi::update_spell_list`].
    SpellList(Vec<SpellOption>),
    /// [`CombatUi::update_timer`].
    Timer(u64),
    /// [`CombatUi::set_timer_expired`].
    TimerExpired,
    /// [`CombatUi::update_history`]: number of entries.
    History(usize),
    /// [`CombatUi::notify`].
    Notice(String),
}

/// UI that records every call, for tests and the headless runner.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    /// Calls in order. Timer ticks are only recorded when they change.
    pub events: Vec<UiEvent>,
}

impl RecordingUi {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded notices.
    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            UiEvent::Notice(message) => Some(message.as_str()),
            _ => None,
        })
    }

    /// Recorded phases.
    pub fn phases(&self) -> impl Iterator<Item = &CombatPhase> {
        self.events.iter().filter_map(|event| match event {
            UiEvent::Phase(phase) => Some(phase),
            _ => None,
        })
    }
}

impl CombatUi for RecordingUi {
    fn show(&mut self) {
        self.events.push(UiEvent::Show);
    }

    fn hide(&mut self) {
        self.events.push(UiEvent::Hide);
    }

    fn update_phase(&mut self, phase: &CombatPhase) {
        self.events.push(UiEvent::Phase(phase.clone()));
    }

    fn update_monster_stats(&mut self, monster: &Entity) {
        self.events.push(UiEvent::MonsterStats {
            health: monster.health(),
            max_health: monster.max_health(),
        });
    }

    fn update_spell_list(&mut self, _caster: &Entity, spells: &[SpellOption]) {
        self.events.push(UiEvent::SpellList(spells.to_vec()));
    }

    fn update_timer(&mut self, remaining_ms: u64) {
        if self.events.last() != Some(&UiEvent::Timer(remaining_ms)) {
            self.events.push(UiEvent::Timer(remaining_ms));
        }
    }

    fn set_timer_expired(&mut self) {
        self.events.push(UiEvent::TimerExpired);
    }

    fn update_history(&mut self, entries: &[ActionRecord]) {
        self.events.push(UiEvent::History(entries.len()));
    }

    fn notify(&mut self, message: &str) {
        self.events.push(UiEvent::Notice(message.to_string()));
    }
}
