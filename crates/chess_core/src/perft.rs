use crate::GameState;

/// Counts leaf nodes of the legal move tree to `depth` plies.
pub fn perft(state: &mut GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = state.get_valid_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        state.make_move(mv);
        nodes += perft(state, depth - 1);
        state.undo_move();
    }
    nodes
}

/// Per-root-move node counts, sorted by coordinate text. Handy when hunting
/// a generator bug against a reference engine.
pub fn perft_divide(state: &mut GameState, depth: u8) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = state
        .get_valid_moves()
        .into_iter()
        .map(|mv| {
            state.make_move(mv);
            let nodes = perft(state, depth.saturating_sub(1));
            state.undo_move();
            (mv.to_coordinate(), nodes)
        })
        .collect();
    counts.sort();
    counts
}
