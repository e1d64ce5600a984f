use nexus_2048::core::{Board, GameState, SimpleRng};
use nexus_2048::engine::{apply_actions, autoplay, has_legal_move};
use nexus_2048::types::{CoreEvent, Direction, GameAction, GameConfig, Phase};

#[test]
fn full_game_reaches_game_over_with_consistent_state() {
    let mut state = GameState::new(GameConfig::default().with_seed(77));
    state.start();
    let played = autoplay(&mut state, u32::MAX);

    assert_eq!(state.phase(), Phase::GameOver);
    assert_eq!(state.move_count(), played);
    assert!(!has_legal_move(state.board()));
    assert!(state.board().is_full());
    assert_eq!(state.highest_tile(), state.board().max_tile());
}

#[test]
fn score_equals_sum_of_move_deltas() {
    let mut state = GameState::new(GameConfig::default().with_seed(5));
    state.start();
    let mut total = 0;
    for i in 0..300 {
        total += state.apply_move(Direction::ALL[i % 4]).score_delta;
    }
    assert_eq!(state.score(), total);
}

#[test]
fn events_follow_move_order() {
    let board = Board::from_rows(&[[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    let mut state = GameState::from_board(GameConfig::default(), board, SimpleRng::new(4));
    state.apply_move(Direction::Left);

    let events = state.take_events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        CoreEvent::Moved {
            direction: Direction::Left,
            score_delta: 4,
            merges: 1,
        }
    );
    assert!(matches!(events[1], CoreEvent::Spawned { .. }));
}

#[test]
fn level_sets_board_size_and_target() {
    let mut state = GameState::new(GameConfig::for_level(25).with_seed(1));
    state.start();
    assert_eq!(state.board().side(), 6);
    assert_eq!(state.target_tile(), 1 << 16);
    assert_eq!(state.board().empty_count(), 34);
}

#[test]
fn batch_restart_recovers_a_finished_game() {
    let over = Board::from_rows(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]).unwrap();
    let mut state = GameState::from_board(GameConfig::default(), over, SimpleRng::new(9));
    assert!(apply_actions(&mut state, &[GameAction::Move(Direction::Left)]).is_err());

    let outcome = apply_actions(&mut state, &[GameAction::Restart]).unwrap();
    assert!(outcome.changed);
    assert_eq!(state.phase(), Phase::Playing);
    assert_eq!(state.board().empty_count(), 14);
}

#[test]
fn snapshots_replay_identically_for_same_seed() {
    let run = || {
        let mut state = GameState::new(GameConfig::for_level(10).with_seed(31337));
        state.start();
        autoplay(&mut state, 40);
        state.snapshot()
    };
    assert_eq!(run(), run());
}
