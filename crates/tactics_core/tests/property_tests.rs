//! Property tests for pathfinding, damage and team composition.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tactics_core::combat::scale_damage;
use tactics_core::data::roster;
use tactics_core::entity::{Entity, Resistances, Role};
use tactics_core::grid::{Grid, GridPos};
use tactics_core::pathfinding::{find_path, find_path_with, is_step_allowed, Heuristic};
use tactics_core::team::Team;
use tactics_core::world::World;
use tactics_test_utils::determinism::strategies::{
    arb_damage_range, arb_element, arb_grid_with_endpoints, arb_resistances,
};

proptest! {
    #[test]
    fn test_paths_are_legal((grid, start, goal) in arb_grid_with_endpoints()) {
        if let Some(path) = find_path(&grid, start, goal) {
            prop_assert_eq!(path.first(), Some(&start));
            prop_assert_eq!(path.last(), Some(&goal));
            for pair in path.windows(2) {
                let (dx, dy) = (pair[1].x - pair[0].x, pair[1].y - pair[0].y);
                prop_assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
                prop_assert!(is_step_allowed(&grid, pair[0], dx, dy));
            }
            let mut seen = path.clone();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), path.len(), "path revisits a tile");
        }
    }

    #[test]
    fn test_reachability_ignores_heuristic((grid, start, goal) in arb_grid_with_endpoints()) {
        let manhattan = find_path_with(&grid, start, goal, Heuristic::Manhattan);
        let chebyshev = find_path_with(&grid, start, goal, Heuristic::Chebyshev);
        prop_assert_eq!(manhattan.is_some(), chebyshev.is_some());
        if let (Some(m), Some(c)) = (manhattan, chebyshev) {
            // Chebyshev is admissible, so its path is never longer.
            prop_assert!(c.len() <= m.len());
        }
    }

    #[test]
    fn test_paths_are_deterministic((grid, start, goal) in arb_grid_with_endpoints()) {
        prop_assert_eq!(find_path(&grid, start, goal), find_path(&grid, start, goal));
    }

    #[test]
    fn test_damage_within_scaled_bounds(
        (min, max) in arb_damage_range(),
        element in arb_element(),
        resistances in arb_resistances(),
        intelligence in 0u32..50,
        power in 0u32..50,
        seed in any::<u64>(),
    ) {
        let mut profile = roster::mage();
        profile.attributes.intelligence = intelligence;
        profile.attributes.power = power;
        let caster = Entity::from_profile(&profile, GridPos::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let damage = caster.compute_damage(min, max, element, &resistances, &mut rng);
        let attribute = caster.attributes.scaling_for(element);
        let resistance = resistances.for_element(element);
        let low = scale_damage(min, attribute, power, resistance);
        let high = scale_damage(max, attribute, power, resistance);
        prop_assert!(low <= damage && damage <= high, "{low} <= {damage} <= {high}");
    }

    #[test]
    fn test_full_resistance_blocks_everything(
        (min, max) in arb_damage_range(),
        element in arb_element(),
        seed in any::<u64>(),
    ) {
        let caster = Entity::from_profile(&roster::mage(), GridPos::new(0, 0));
        let resistances = Resistances {
            fire: 100,
            water: 100,
            earth: 100,
            air: 100,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let damage = caster.compute_damage(min, max, element, &resistances, &mut rng);
        if resistances.for_element(element) == 100 {
            prop_assert_eq!(damage, 0);
        }
    }

    #[test]
    fn test_teams_stay_pure(roles in proptest::collection::vec(any::<bool>(), 1..12)) {
        let mut world = World::new(Grid::rectangle(16, 1));
        let mut team = Team::new();

        for (x, is_player) in roles.iter().enumerate() {
            let profile = if *is_player { roster::rogue() } else { roster::dragon() };
            let id = world.spawn(&profile, GridPos::new(x as i32, 0)).unwrap();
            let entity = world.entities.get(id).unwrap();
            let before = team.members().to_vec();

            let expected = if roles[0] { Role::Player } else { Role::Monster };
            match team.add_entity(entity) {
                Ok(()) => {
                    prop_assert_eq!(entity.role, expected);
                }
                Err(_) => {
                    prop_assert_ne!(entity.role, expected);
                    prop_assert_eq!(team.members(), before.as_slice());
                }
            }
        }

        let role = team.role();
        for &id in team.members() {
            prop_assert_eq!(Some(world.entities.get(id).unwrap().role), role);
        }
    }
}
