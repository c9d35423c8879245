//! Scenario loading and world construction.
//!
//! Scenarios define the initial state of a headless run: the map, the
//! obstacles on it, the player's class and start tile, the monsters and the
//! combat tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tactics_core::config::CombatConfig;
use tactics_core::data::{roster, ProfileSet};
use tactics_core::entity::Role;
use tactics_core::error::GameError;
use tactics_core::grid::{Grid, GridPos};
use tactics_core::layout::LayoutStore;
use tactics_core::world::World;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A placement names a profile that is not loaded.
    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),
    /// A placement uses a profile of the wrong role.
    #[error("Profile '{id}' cannot be placed as a {expected:?}")]
    WrongRole {
        /// Profile id.
        id: String,
        /// Role the placement needs.
        expected: Role,
    },
    /// The core rejected the scenario.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Shape of the scenario map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapShape {
    /// Fully walkable rectangle anchored at `(0, 0)`.
    Rectangle {
        /// Columns.
        width: u32,
        /// Rows.
        height: u32,
    },
    /// The diamond demo field.
    Diamond {
        /// Number of rows.
        rows: u32,
        /// Widest row.
        columns: u32,
    },
    /// A layout stored under this name.
    Layout(String),
}

impl Default for MapShape {
    fn default() -> Self {
        Self::Diamond {
            rows: 23,
            columns: 22,
        }
    }
}

/// Where one entity starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Profile id.
    pub profile: String,
    /// Start tile.
    pub at: (i32, i32),
}

impl Placement {
    /// Create a placement.
    #[must_use]
    pub fn new(profile: &str, x: i32, y: i32) -> Self {
        Self {
            profile: profile.to_string(),
            at: (x, y),
        }
    }

    /// Start tile as a grid position.
    #[must_use]
    pub const fn tile(&self) -> GridPos {
        GridPos::new(self.at.0, self.at.1)
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map to build.
    #[serde(default)]
    pub map: MapShape,
    /// Obstacles added on top of the map.
    #[serde(default)]
    pub obstacles: Vec<(i32, i32)>,
    /// The controlled player.
    pub player: Placement,
    /// Monsters to fight.
    #[serde(default)]
    pub monsters: Vec<Placement>,
    /// Combat tuning.
    #[serde(default)]
    pub combat: CombatConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::mage_vs_dragon()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.combat.validate()?;
        Ok(scenario)
    }

    /// The demo duel: a mage against a single dragon on the diamond field.
    #[must_use]
    pub fn mage_vs_dragon() -> Self {
        Self {
            name: "Mage vs Dragon".to_string(),
            description: "One mage, one dragon, diamond field".to_string(),
            map: MapShape::default(),
            obstacles: Vec::new(),
            player: Placement::new("mage", 6, 0),
            monsters: vec![Placement::new("dragon", 12, 0)],
            combat: CombatConfig::default(),
        }
    }

    /// Build the grid described by [`Self::map`] and [`Self::obstacles`].
    pub fn build_grid(&self, layouts: &dyn LayoutStore) -> Result<Grid, ScenarioError> {
        let mut grid = match &self.map {
            MapShape::Rectangle { width, height } => Grid::rectangle(*width, *height),
            MapShape::Diamond { rows, columns } => Grid::diamond(*rows, *columns),
            MapShape::Layout(name) => {
                let mut grid = Grid::new();
                grid.load_layout(layouts, name)?;
                grid
            }
        };
        for &(x, y) in &self.obstacles {
            grid.add_obstacle(GridPos::new(x, y));
        }
        Ok(grid)
    }

    /// Build the world: grid, player and monsters.
    pub fn build_world(
        &self,
        profiles: &ProfileSet,
        layouts: &dyn LayoutStore,
    ) -> Result<World, ScenarioError> {
        let mut world = World::new(self.build_grid(layouts)?);

        let player = lookup(profiles, &self.player, Role::Player)?;
        world.spawn(player, self.player.tile())?;

        for placement in &self.monsters {
            let monster = lookup(profiles, placement, Role::Monster)?;
            world.spawn(monster, placement.tile())?;
        }

        tracing::debug!(
            scenario = %self.name,
            tiles = world.grid.len(),
            monsters = self.monsters.len(),
            "Scenario world built"
        );
        Ok(world)
    }
}

fn lookup<'a>(
    profiles: &'a ProfileSet,
    placement: &Placement,
    expected: Role,
) -> Result<&'a tactics_core::data::EntityProfile, ScenarioError> {
    let profile = profiles
        .get(&placement.profile)
        .ok_or_else(|| ScenarioError::UnknownProfile(placement.profile.clone()))?;
    if profile.role != expected {
        return Err(ScenarioError::WrongRole {
            id: profile.id.clone(),
            expected,
        });
    }
    Ok(profile)
}

/// Load a profile file, or the built-in roster when `path` is `None`.
pub fn load_profiles(path: Option<&Path>) -> Result<ProfileSet, ScenarioError> {
    let Some(path) = path else {
        return Ok(roster::builtin());
    };
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let profiles = ProfileSet::from_ron(&contents)?;
    tracing::debug!(path = %path.display(), count = profiles.profiles.len(), "Profiles loaded");
    Ok(profiles)
}
