//! Headless auto-battle runner for scenario testing and CI verification.
//!
//! This crate loads a scenario from RON, builds a [`World`](tactics_core::world::World)
//! and lets a simple player policy fight every monster on the map. The result
//! is a [`RunReport`] that serializes to JSON. This enables:
//!
//! - **Balance checks**: play a class against a set of monsters without a UI
//! - **CI verification**: the same scenario and seed always produce the same report
//! - **Map tooling**: layouts are stored as RON files in a directory
//!
//! # Example
//!
//! ```bash
//! # Play a scenario and print the report
//! cargo run -p tactics_headless -- run --scenario data/scenarios/mage_vs_dragon.ron
//!
//! # List the available profiles
//! cargo run -p tactics_headless -- profiles
//! ```

pub mod file_store;
pub mod runner;
pub mod scenario;

pub use file_store::DirectoryLayoutStore;
pub use runner::{AutoBattleRunner, BattleReport, RunReport, RunnerConfig};
pub use scenario::{load_profiles, MapShape, Placement, Scenario, ScenarioError};
