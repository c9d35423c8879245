//! Determinism testing utilities.
//!
//! Provides a harness for verifying that combat and movement produce
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A battle must replay exactly from its seed. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: continuous positions use fixed-point
//!   arithmetic via [`tactics_core::math::Fixed`]; damage and experience are
//!   integer-only.
//!
//! - **HashMap iteration order**: the world always iterates in sorted
//!   entity id order.
//!
//! - **System randomness**: every roll comes from the engine's seeded
//!   `ChaCha8Rng`.
//!
//! - **Wall-clock time**: deadlines use the simulation time passed in.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic runs).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup/step cycle multiple times and compare final hashes.
///
/// # Example
///
/// ```ignore
/// use tactics_test_utils::determinism::{hash_serialized, verify_determinism};
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     200, // 200 steps each
///     || build_game(),
///     |game| game.tick(16),
///     |game| {
///         let world = game.world();
///         let tiles: Vec<_> = world
///             .entities
///             .sorted_ids()
///             .into_iter()
///             .filter_map(|id| world.entities.get(id).map(|e| (id, e.tile, e.health())))
///             .collect();
///         hash_serialized(&tiles)
///     },
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Compute a hash of any hashable value.
#[must_use]
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash a value through its RON encoding.
///
/// `HashMap` iteration order differs between instances, so pass sorted
/// views of map-backed state.
///
/// # Panics
///
/// Panics if the value cannot be serialized.
#[must_use]
pub fn hash_serialized<T: Serialize>(value: &T) -> u64 {
    let encoded = ron::to_string(value).unwrap_or_else(|e| panic!("serialize failed: {e}"));
    compute_hash(&encoded)
}

/// Proptest strategies for grids, positions and combat stats.
pub mod strategies {
    use proptest::prelude::*;
    use tactics_core::entity::{Element, Resistances};
    use tactics_core::grid::{Grid, GridPos};

    /// A position inside a `width × height` rectangle.
    pub fn arb_pos_in(width: i32, height: i32) -> impl Strategy<Value = GridPos> {
        (0..width, 0..height).prop_map(|(x, y)| GridPos::new(x, y))
    }

    /// A rectangle of up to 16×16 with random obstacles, plus two walkable
    /// endpoints.
    pub fn arb_grid_with_endpoints() -> impl Strategy<Value = (Grid, GridPos, GridPos)> {
        (2i32..16, 2i32..16)
            .prop_flat_map(|(w, h)| {
                (
                    Just((w, h)),
                    proptest::collection::vec(arb_pos_in(w, h), 0..(w * h / 3) as usize),
                    arb_pos_in(w, h),
                    arb_pos_in(w, h),
                )
            })
            .prop_map(|((w, h), obstacles, start, goal)| {
                let mut grid = Grid::rectangle(w as u32, h as u32);
                for pos in obstacles {
                    if pos != start && pos != goal {
                        grid.add_obstacle(pos);
                    }
                }
                (grid, start, goal)
            })
    }

    /// Any element.
    pub fn arb_element() -> impl Strategy<Value = Element> {
        prop_oneof![
            Just(Element::Physical),
            Just(Element::Arcane),
            Just(Element::Fire),
            Just(Element::Water),
            Just(Element::Earth),
            Just(Element::Air),
        ]
    }

    /// Resistances in the valid 0-100 range.
    pub fn arb_resistances() -> impl Strategy<Value = Resistances> {
        (0u8..=100, 0u8..=100, 0u8..=100, 0u8..=100).prop_map(|(fire, water, earth, air)| {
            Resistances {
                fire,
                water,
                earth,
                air,
            }
        })
    }

    /// A damage range `(min, max)` with `min <= max`.
    pub fn arb_damage_range() -> impl Strategy<Value = (u32, u32)> {
        (0u32..200).prop_flat_map(|min| (Just(min), min..min + 200))
    }
}
