//! # Tactics Core
//!
//! Deterministic core of an isometric tactics game.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No file or network IO
//! - No system clock (time is passed in as [`clock::SimTime`])
//! - No unseeded randomness
//!
//! Presentation and storage plug in through the [`ui::CombatUi`] and
//! [`layout::LayoutStore`] traits.
//!
//! ## Crate Structure
//!
//! - [`grid`] / [`pathfinding`] - Tile map and A* search
//! - [`entity`] / [`movement`] / [`progression`] - Stat blocks, path following, leveling
//! - [`team`] / [`engine`] / [`ai`] - Combat sides, turn engine, monster policies
//! - [`world`] / [`game`] - Entity storage and the free-roam façade
//! - [`data`] - Class and species profiles

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod clock;
pub mod combat;
pub mod config;
pub mod data;
pub mod engine;
pub mod entity;
pub mod error;
pub mod game;
pub mod grid;
pub mod iso;
pub mod layout;
pub mod math;
pub mod movement;
pub mod pathfinding;
pub mod progression;
pub mod team;
pub mod ui;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{MonsterBehavior, MonsterTurnReport};
    pub use crate::clock::{SimTime, TurnTimer};
    pub use crate::config::CombatConfig;
    pub use crate::data::{EntityProfile, ProfileSet};
    pub use crate::engine::{
        ActionRecord, CombatEngine, CombatOutcome, CombatPhase, CombatSummary, PlayerCommand,
        SpellOption,
    };
    pub use crate::entity::{AttackStyle, Attributes, Element, Entity, EntityId, Resistances, Role, Spell};
    pub use crate::error::{GameError, Result};
    pub use crate::game::Game;
    pub use crate::grid::{Grid, GridPos, Tile};
    pub use crate::layout::{GridLayout, LayoutStore, MemoryLayoutStore};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::movement::MoveOutcome;
    pub use crate::pathfinding::{find_path, Heuristic};
    pub use crate::team::Team;
    pub use crate::ui::{CombatUi, NullUi, RecordingUi};
    pub use crate::world::World;
}
