//! Error types for the tactics core.

use thiserror::Error;

use crate::entity::{EntityId, Role};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all tactics core errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Attempted to mix players and monsters in one team.
    #[error("Invalid team composition: a {team:?} team cannot accept a {entity:?} member")]
    InvalidTeamComposition {
        /// Role already fixed for the team.
        team: Role,
        /// Role of the rejected entity.
        entity: Role,
    },

    /// Not enough action points for the requested action.
    #[error("Insufficient action points: need {required}, have {available}")]
    InsufficientActionPoints {
        /// AP cost of the action.
        required: u32,
        /// AP currently available.
        available: u32,
    },

    /// Not enough movement points for the requested step.
    #[error("Insufficient movement points: need {required}, have {available}")]
    InsufficientMovementPoints {
        /// MP cost of the step.
        required: u32,
        /// MP currently available.
        available: u32,
    },

    /// Target lies outside the spell's declared range.
    #[error("Target out of range: distance² {distance_squared} exceeds range {range}")]
    OutOfRange {
        /// Squared Euclidean distance between attacker and target.
        distance_squared: i64,
        /// Declared spell range in tiles.
        range: u32,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Spell index does not exist on the caster.
    #[error("Unknown spell index {index} for entity {entity}")]
    UnknownSpell {
        /// Caster.
        entity: EntityId,
        /// Requested spell index.
        index: usize,
    },

    /// Target is not a living member of the opposing team.
    #[error("Invalid target: {0}")]
    InvalidTarget(EntityId),

    /// Command not accepted in the current combat phase.
    #[error("Command not allowed during {phase}")]
    WrongPhase {
        /// Human-readable phase name.
        phase: &'static str,
    },

    /// Selected starting tile is not one of the offered candidates.
    #[error("Invalid starting position ({x}, {y})")]
    InvalidStartingPosition {
        /// Tile x.
        x: i32,
        /// Tile y.
        y: i32,
    },

    /// Tile edit rejected.
    #[error("Invalid tile edit at ({x}, {y}): {reason}")]
    InvalidTileEdit {
        /// Tile x.
        x: i32,
        /// Tile y.
        y: i32,
        /// Why the edit was refused.
        reason: &'static str,
    },

    /// The layout store failed.
    #[error("Layout storage error: {0}")]
    Storage(String),

    /// Stored layout does not exist.
    #[error("Layout not found: {0}")]
    LayoutNotFound(String),

    /// Profile data failed validation.
    #[error("Invalid profile '{id}': {message}")]
    InvalidProfile {
        /// Profile identifier.
        id: String,
        /// What is wrong with it.
        message: String,
    },

    /// Data parsing error.
    #[error("Failed to parse {what}: {message}")]
    DataParseError {
        /// What was being parsed.
        what: &'static str,
        /// Error message.
        message: String,
    },

    /// Data serialization error.
    #[error("Failed to serialize {what}: {message}")]
    SerializeError {
        /// What was being serialized.
        what: &'static str,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Whether the caller may simply pick another action and carry on.
    ///
    /// Recoverable errors are player feedback (range, resources, phase);
    /// everything else indicates a bug or bad data.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientActionPoints { .. }
                | Self::InsufficientMovementPoints { .. }
                | Self::OutOfRange { .. }
                | Self::WrongPhase { .. }
                | Self::InvalidStartingPosition { .. }
                | Self::InvalidTarget(_)
                | Self::InvalidTileEdit { .. }
        )
    }
}
