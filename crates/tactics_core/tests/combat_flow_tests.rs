//! End-to-end combat tests.
//!
//! These drive the engine through whole battles with the shared fixtures
//! and check turn order, timers and resolution.

use tactics_core::ai::autopilot_command;
use tactics_core::config::CombatConfig;
use tactics_core::engine::{CombatEngine, CombatOutcome, CombatPhase, PlayerCommand};
use tactics_core::entity::EntityId;
use tactics_core::game::Game;
use tactics_core::grid::GridPos;
use tactics_core::ui::{NullUi, RecordingUi, UiEvent};
use tactics_core::world::World;
use tactics_test_utils::determinism::{hash_serialized, verify_determinism};
use tactics_test_utils::fixtures::{arena, duelist, mage_vs_dragon, play_out, training_dummy};

fn duel() -> (World, EntityId, EntityId) {
    arena(
        12,
        12,
        (&duelist(), GridPos::new(1, 5)),
        (&training_dummy(), GridPos::new(6, 5)),
    )
}

/// Start a duel and leave preparation at `t = 0` without moving the player.
fn duel_in_battle() -> (CombatEngine<RecordingUi>, World, EntityId, EntityId) {
    let (mut world, player, dummy) = duel();
    let mut engine = CombatEngine::new(CombatConfig::default(), RecordingUi::new());
    engine.start_combat(&mut world, dummy, 0).unwrap();
    engine.handle(&mut world, PlayerCommand::Ready, 0).unwrap();
    (engine, world, player, dummy)
}

// =============================================================================
// Full battles
// =============================================================================

#[test]
fn test_duelist_beats_dummy_in_two_hits() {
    let (mut world, player, dummy) = duel();
    let mut engine = CombatEngine::new(CombatConfig::default(), NullUi);
    engine.start_combat(&mut world, dummy, 0).unwrap();

    let summary = play_out(&mut engine, &mut world, 0, 100, 10_000).expect("combat finished");

    assert_eq!(summary.outcome, CombatOutcome::Victory);
    assert_eq!(summary.history.len(), 2);
    assert!(summary.history.iter().all(|r| r.attacker == player));
    assert_eq!(summary.history[0].turn, 1);
    assert_eq!(summary.history[1].turn, 2);
    assert_eq!(summary.experience, 100);
    assert_eq!(summary.removed, vec![dummy]);

    assert!(!world.entities.contains(dummy));
    let survivor = world.entities.get(player).unwrap();
    assert_eq!(survivor.health(), survivor.max_health());
    assert_eq!(survivor.experience(), 100);
    assert_eq!(engine.phase(), CombatPhase::Idle);
}

#[test]
fn test_resolution_ui_sequence() {
    let (mut world, _, dummy) = duel();
    let mut engine = CombatEngine::new(CombatConfig::default(), RecordingUi::new());
    engine.start_combat(&mut world, dummy, 0).unwrap();
    play_out(&mut engine, &mut world, 0, 100, 10_000).expect("combat finished");

    let events = &engine.ui().events;
    let tail: Vec<&UiEvent> = events.iter().rev().take(4).rev().collect();
    assert!(matches!(
        tail[0],
        UiEvent::Phase(CombatPhase::Resolved(CombatOutcome::Victory))
    ));
    assert!(matches!(tail[1], UiEvent::Notice(msg) if msg.contains("Victory")));
    assert!(matches!(tail[2], UiEvent::Hide));
    assert!(matches!(tail[3], UiEvent::Phase(CombatPhase::Idle)));
}

// =============================================================================
// Timers
// =============================================================================

#[test]
fn test_turn_timer_expiry_advances_exactly_once() {
    let (mut engine, mut world, player, dummy) = duel_in_battle();
    assert_eq!(engine.phase(), CombatPhase::PlayerTurn { actor: player });

    engine.update(&mut world, 29_999);
    assert_eq!(engine.phase(), CombatPhase::PlayerTurn { actor: player });

    engine.update(&mut world, 30_000);
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: dummy });

    // A repeated update at the same time changes nothing.
    engine.update(&mut world, 30_000);
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: dummy });

    let expired = engine
        .ui()
        .events
        .iter()
        .filter(|e| matches!(e, UiEvent::TimerExpired))
        .count();
    assert_eq!(expired, 1);
    assert_eq!(engine.session().unwrap().turn(), 1);
}

#[test]
fn test_late_update_catches_up_deadline_by_deadline() {
    let (mut engine, mut world, player, dummy) = duel_in_battle();

    // Player timer at 30s, dummy acts at 31s, hands over at 32s, the second
    // player turn times out at 62s.
    engine.update(&mut world, 62_000);

    let session = engine.session().unwrap();
    assert_eq!(session.phase(), &CombatPhase::MonsterTurn { actor: dummy });
    assert_eq!(session.turn(), 2);

    let player_turns = engine
        .ui()
        .phases()
        .filter(|p| **p == CombatPhase::PlayerTurn { actor: player })
        .count();
    assert_eq!(player_turns, 2);
}

#[test]
fn test_end_turn_cancels_timer() {
    let (mut engine, mut world, _, dummy) = duel_in_battle();
    engine.handle(&mut world, PlayerCommand::EndTurn, 5_000).unwrap();
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: dummy });

    // The old 30s deadline must not fire during the monster turn.
    engine.update(&mut world, 5_999);
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: dummy });
    assert!(!engine
        .ui()
        .events
        .iter()
        .any(|e| matches!(e, UiEvent::TimerExpired)));
}

// =============================================================================
// Turn order
// =============================================================================

#[test]
fn test_turn_order_one_player_two_monsters() {
    let (mut world, player, first) = duel();
    let second = world
        .spawn(&training_dummy(), GridPos::new(10, 10))
        .unwrap();

    let mut engine = CombatEngine::default();
    engine
        .start_combat_with(&mut world, &[first, second], 0)
        .unwrap();
    assert_eq!(
        engine.session().unwrap().initiative(),
        &[player, first, second]
    );

    engine.handle(&mut world, PlayerCommand::Ready, 0).unwrap();
    assert_eq!(engine.phase(), CombatPhase::PlayerTurn { actor: player });

    engine.handle(&mut world, PlayerCommand::EndTurn, 100).unwrap();
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: first });

    // Think delay plus end-turn delay per monster.
    engine.update(&mut world, 2_100);
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: second });

    engine.update(&mut world, 4_100);
    assert_eq!(engine.phase(), CombatPhase::PlayerTurn { actor: player });
    assert_eq!(engine.session().unwrap().turn(), 2);
}

#[test]
fn test_dead_monster_is_skipped() {
    let (mut world, player, first) = duel();
    let second = world
        .spawn(&training_dummy(), GridPos::new(10, 10))
        .unwrap();

    let mut engine = CombatEngine::default();
    engine
        .start_combat_with(&mut world, &[first, second], 0)
        .unwrap();
    engine.handle(&mut world, PlayerCommand::Ready, 0).unwrap();
    world.entities.get_mut(first).unwrap().set_health(0);

    engine.handle(&mut world, PlayerCommand::EndTurn, 0).unwrap();
    assert_eq!(engine.phase(), CombatPhase::MonsterTurn { actor: second });
    assert!(engine.session().unwrap().current_actor() != Some(player));
}

#[test]
fn test_hidden_monsters_return_after_combat() {
    let (mut world, _, dummy) = duel();
    let bystander = world.spawn(&training_dummy(), GridPos::new(0, 0)).unwrap();

    let mut engine = CombatEngine::default();
    engine.start_combat(&mut world, dummy, 0).unwrap();
    assert!(!world.entities.get(bystander).unwrap().visible);

    play_out(&mut engine, &mut world, 0, 100, 10_000).expect("combat finished");
    assert!(world.entities.get(bystander).unwrap().visible);
    assert_eq!(world.visible_monsters(), vec![bystander]);
}

#[test]
fn test_selected_start_moves_player() {
    let (mut world, player, dummy) = duel();
    let mut engine = CombatEngine::default();
    engine.start_combat(&mut world, dummy, 0).unwrap();

    let start = engine.session().unwrap().start_candidates()[1];
    assert_eq!(start, GridPos::new(9, 5));
    engine
        .handle(&mut world, PlayerCommand::SelectStart(start), 0)
        .unwrap();
    engine.handle(&mut world, PlayerCommand::Ready, 0).unwrap();

    assert_eq!(world.entities.get(player).unwrap().tile, start);
}

// =============================================================================
// Replay
// =============================================================================

/// Walk the mage into the dragon's detection range and let the autopilot fight.
fn roaming_game() -> Game {
    let (world, _, _) = mage_vs_dragon();
    let config = CombatConfig {
        rng_seed: 7,
        ..CombatConfig::default()
    };
    let mut game = Game::headless(world, config);
    game.move_player(GridPos::new(4, 5)).unwrap();
    game
}

fn autopilot_tick(game: &mut Game) {
    if let Some(session) = game.engine().session() {
        if matches!(
            session.phase(),
            CombatPhase::Preparation | CombatPhase::PlayerTurn { .. }
        ) {
            let command = autopilot_command(game.world(), session);
            let _ = game.command(command);
        }
    }
    game.tick(100);
}

fn game_hash(game: &Game) -> u64 {
    let world = game.world();
    let entities: Vec<_> = world
        .entities
        .sorted_ids()
        .into_iter()
        .filter_map(|id| {
            world
                .entities
                .get(id)
                .map(|e| (id, e.tile, e.health(), e.experience()))
        })
        .collect();
    hash_serialized(&(entities, game.engine().last_summary(), game.now()))
}

#[test]
fn test_free_roam_game_replays_identically() {
    let result = verify_determinism(3, 2_000, roaming_game, autopilot_tick, game_hash);
    result.assert_deterministic();

    // The replayed game did reach and win the fight.
    let mut game = roaming_game();
    for _ in 0..2_000 {
        autopilot_tick(&mut game);
    }
    let summary = game.engine().last_summary().expect("combat happened");
    assert_eq!(summary.outcome, CombatOutcome::Victory);
    assert!(game.world().visible_monsters().is_empty());
}
