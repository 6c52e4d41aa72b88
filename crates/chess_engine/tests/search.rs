use chess_core::{Board, CastlingRights, GameState, Move};
use chess_engine::{
    find_best_move, negamax_score, search, ChessAI, EngineError, SearchConfig, SearchTask,
    TaskStatus, CHECKMATE,
};

fn setup(rows: &[&str; 8], white_to_move: bool) -> GameState {
    let board = Board::from_diagram(rows).unwrap();
    GameState::from_board(board, white_to_move, CastlingRights::none(), None).unwrap()
}

const WHITE_BACK_RANK_MATE: [&str; 8] = [
    "-- -- -- -- -- -- bK --",
    "-- -- -- -- -- bp bp bp",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- wp wp wp",
    "wR -- -- -- -- -- wK --",
];

const BLACK_BACK_RANK_MATE: [&str; 8] = [
    "bR -- -- -- -- -- bK --",
    "-- -- -- -- -- bp bp bp",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- wp wp wp",
    "-- -- -- -- -- -- wK --",
];

const HANGING_QUEEN: [&str; 8] = [
    "-- -- -- -- -- -- bK --",
    "-- -- -- -- -- bp bp bp",
    "-- -- -- -- -- -- -- --",
    "-- -- -- bQ -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- -- -- --",
    "-- -- -- -- -- wp wp wp",
    "-- -- -- wR -- -- wK --",
];

const KIWIPETE: [&str; 8] = [
    "bR -- -- -- bK -- -- bR",
    "bp -- bp bp bQ bp bB --",
    "bB bN -- -- bp bN bp --",
    "-- -- -- wp wN -- -- --",
    "-- bp -- -- wp -- -- --",
    "-- -- wN -- -- wQ -- bp",
    "wp wp wp wB wB wp wp wp",
    "wR -- -- -- wK -- -- wR",
];

fn best(state: &mut GameState, depth: u8, seed: u64) -> Option<Move> {
    let moves = state.get_valid_moves();
    find_best_move(state, &moves, &SearchConfig::new(depth).with_seed(seed))
}

#[test]
fn finds_mate_in_one_for_white() {
    for seed in 0..5 {
        let mut state = setup(&WHITE_BACK_RANK_MATE, true);
        let mv = best(&mut state, 1, seed).unwrap();
        assert_eq!(mv.to_coordinate(), "a1a8");
    }
}

#[test]
fn finds_mate_in_one_for_black() {
    for seed in 0..5 {
        let mut state = setup(&BLACK_BACK_RANK_MATE, false);
        let mv = best(&mut state, 2, seed).unwrap();
        assert_eq!(mv.to_coordinate(), "a8a1");
    }
}

#[test]
fn mate_scores_as_checkmate() {
    let mut state = setup(&WHITE_BACK_RANK_MATE, true);
    let moves = state.get_valid_moves();
    let outcome = search(&mut state, &moves, &SearchConfig::new(1));
    assert_eq!(outcome.score, CHECKMATE);
}

#[test]
fn mates_at_once_when_searching_deeper() {
    let queen_and_king = [
        "-- -- -- -- -- -- -- bK",
        "-- -- -- -- -- -- -- --",
        "-- -- -- -- -- -- wK --",
        "-- -- -- -- -- -- -- --",
        "-- -- -- -- -- -- -- --",
        "-- -- -- -- -- -- -- --",
        "-- -- -- -- -- -- -- --",
        "wQ -- -- -- -- -- -- --",
    ];
    for seed in 0..20 {
        let mut state = setup(&queen_and_king, true);
        let mv = best(&mut state, 3, seed).unwrap();
        state.make_move(mv);
        assert!(state.get_valid_moves().is_empty(), "seed {seed} played {mv}");
        assert!(state.checkmate(), "seed {seed} played {mv}");
    }
}

#[test]
fn nearer_mates_score_higher() {
    let mut state = setup(&WHITE_BACK_RANK_MATE, true);
    let moves = state.get_valid_moves();
    let outcome = search(&mut state, &moves, &SearchConfig::new(3).with_seed(4));
    assert_eq!(outcome.best_move.map(|mv| mv.to_coordinate()), Some("a1a8".to_string()));
    assert_eq!(outcome.score, CHECKMATE + 2);
}

#[test]
fn takes_the_hanging_queen() {
    let mut state = setup(&HANGING_QUEEN, true);
    let mv = best(&mut state, 2, 11).unwrap();
    assert_eq!(mv.to_coordinate(), "d1d5");
}

#[test]
fn pruning_never_changes_the_score() {
    let cases: Vec<(GameState, u8)> = vec![
        (GameState::new(), 3),
        (setup(&KIWIPETE, true), 2),
        (setup(&HANGING_QUEEN, true), 3),
        (setup(&BLACK_BACK_RANK_MATE, false), 3),
    ];

    for (mut state, depth) in cases {
        let reference = negamax_score(&mut state, depth);
        for seed in [1, 2, 3] {
            let moves = state.get_valid_moves();
            let outcome = search(&mut state, &moves, &SearchConfig::new(depth).with_seed(seed));
            assert_eq!(outcome.score, reference, "depth {depth} seed {seed}");
        }
        let moves = state.get_valid_moves();
        let ordered = search(&mut state, &moves, &SearchConfig::new(depth).deterministic());
        assert_eq!(ordered.score, reference);
    }
}

#[test]
fn search_leaves_the_game_untouched() {
    let mut state = setup(&KIWIPETE, true);
    let board = *state.board();
    let rights = state.castling_rights();
    let moves = state.get_valid_moves();

    search(&mut state, &moves, &SearchConfig::new(2));

    assert_eq!(*state.board(), board);
    assert_eq!(state.castling_rights(), rights);
    assert!(state.white_to_move());
    assert!(state.move_log().is_empty());
}

#[test]
fn ai_returns_a_legal_move() {
    let mut state = GameState::new();
    let mut ai = ChessAI::with_config(SearchConfig::new(2).with_seed(5));
    let mv = ai.get_move(&mut state).unwrap();
    assert!(state.get_valid_moves().contains(&mv));
}

#[test]
fn ai_has_nothing_to_say_when_mated() {
    let mut state = GameState::new();
    for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        let mv = Move::parse_coordinate(text, state.board()).unwrap();
        state.play(mv).unwrap();
    }
    let mut ai = ChessAI::new(2);
    assert_eq!(ai.get_move(&mut state), None);
}

#[test]
fn background_task_delivers_one_move() {
    let mut state = setup(&WHITE_BACK_RANK_MATE, true);
    let ai = ChessAI::with_config(SearchConfig::new(2).with_seed(3));
    let task = ai.spawn_search(&state);
    assert!(!task.is_stale_for(&state));

    let mv = task.wait().unwrap().unwrap();
    assert_eq!(mv.to_coordinate(), "a1a8");
    assert!(state.get_valid_moves().contains(&mv));
}

#[test]
fn cancelled_task_result_is_discarded() {
    let state = GameState::new();
    let task = SearchTask::spawn(state.clone(), SearchConfig::new(4));
    task.cancel();
    assert_eq!(task.poll(), Ok(TaskStatus::Cancelled));
    assert_eq!(task.wait(), Err(EngineError::Cancelled));
}

#[test]
fn task_goes_stale_when_the_game_moves_on() {
    let mut state = GameState::new();
    let task = SearchTask::spawn(state.clone(), SearchConfig::new(1).with_seed(9));

    let mv = Move::parse_coordinate("e2e4", state.board()).unwrap();
    state.play(mv).unwrap();
    assert!(task.is_stale_for(&state));

    // Undoing back to the same position makes it current again.
    state.undo_move();
    assert!(!task.is_stale_for(&state));
}
