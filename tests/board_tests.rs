use nexus_2048::core::slide::slide_row_left;
use nexus_2048::core::{is_game_over, is_win, resolve_move, Board, BoardError};
use nexus_2048::types::{BoardSize, Direction, Tile};

fn board(rows: &[[Tile; 4]; 4]) -> Board {
    Board::from_rows(rows).unwrap()
}

fn is_power_of_two_or_empty(v: Tile) -> bool {
    v == 0 || (v >= 2 && v.is_power_of_two())
}

#[test]
fn row_merge_examples() {
    let mut row = [2, 2, 4, 4];
    let r = slide_row_left(&mut row);
    assert_eq!(row, [4, 8, 0, 0]);
    assert_eq!(r.score, 12);

    let mut row = [2, 2, 2, 2];
    slide_row_left(&mut row);
    assert_eq!(row, [4, 4, 0, 0]);

    let mut row = [4, 4, 8, 0];
    let r = slide_row_left(&mut row);
    // A merged 8 does not merge again with the existing 8.
    assert_eq!(row, [8, 8, 0, 0]);
    assert_eq!(r.merges, 1);
}

#[test]
fn every_direction_keeps_valid_values() {
    let start = board(&[[2, 2, 4, 0], [0, 4, 4, 8], [16, 0, 16, 2], [2, 2, 2, 2]]);
    for dir in Direction::ALL {
        let out = resolve_move(&start, dir);
        assert!(out.changed);
        assert!(out.board.cells().iter().all(|&v| is_power_of_two_or_empty(v)));
        // Merging only doubles pairs, so the sum is conserved.
        assert_eq!(out.board.tile_sum(), start.tile_sum());
    }
}

#[test]
fn compaction_only_move_conserves_values() {
    let start = board(&[[0, 2, 0, 4], [8, 0, 0, 0], [0, 0, 16, 0], [0, 32, 0, 64]]);
    let out = resolve_move(&start, Direction::Left);
    assert_eq!(out.score_delta, 0);
    let mut before: Vec<Tile> = start.cells().iter().copied().filter(|&v| v != 0).collect();
    let mut after: Vec<Tile> = out.board.cells().iter().copied().filter(|&v| v != 0).collect();
    before.sort_unstable();
    after.sort_unstable();
    assert_eq!(before, after);
}

#[test]
fn noop_move_is_a_fixed_point() {
    let start = board(&[[2, 4, 8, 16], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    let out = resolve_move(&start, Direction::Up);
    assert!(!out.changed);
    assert_eq!(out.board, start);
    assert!(!resolve_move(&out.board, Direction::Up).changed);
}

#[test]
fn vertical_moves_use_columns() {
    let start = board(&[[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0]]);
    let down = resolve_move(&start, Direction::Down);
    assert_eq!(down.board.get(3, 0), Some(4));
    assert_eq!(down.board.get(2, 0), Some(4));
    assert_eq!(down.board.get(1, 0), Some(0));
    assert_eq!(down.score_delta, 4);
}

#[test]
fn larger_boards_slide_across_full_width() {
    let mut start = Board::new(BoardSize::Six);
    start.set(2, 0, 8);
    start.set(2, 5, 8);
    let out = resolve_move(&start, Direction::Right);
    assert_eq!(out.board.get(2, 5), Some(16));
    assert_eq!(out.board.empty_count(), 35);
}

#[test]
fn win_and_game_over_detection() {
    let with_2048 = board(&[[2048, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    assert!(is_win(&with_2048, 2048));
    let with_1024 = board(&[[1024, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    assert!(!is_win(&with_1024, 2048));

    let checker = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    assert!(is_game_over(&checker));
    let one_pair = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]);
    assert!(!is_game_over(&one_pair));
}

#[test]
fn invalid_boards_are_rejected() {
    assert!(matches!(
        Board::from_rows(&[[2, 0, 0], [0, 0, 0], [0, 0, 0]]),
        Err(BoardError::UnsupportedSize(3))
    ));
    assert!(matches!(
        Board::from_rows(&[[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
        Err(BoardError::InvalidTile { value: 3, .. })
    ));
    let ragged: Vec<Vec<Tile>> = vec![vec![0; 4], vec![0; 3], vec![0; 4], vec![0; 4]];
    assert!(matches!(
        Board::from_rows(&ragged),
        Err(BoardError::RaggedRow { row: 1, .. })
    ));
}
