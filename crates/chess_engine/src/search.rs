// Depth-limited negamax with alpha-beta pruning over the static evaluator.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chess_core::{GameState, Move, Terminal};
use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::evaluation::{evaluate_position, CHECKMATE};

// Search parameters
pub const MIN_DEPTH: u8 = 1;                 // Shallowest search we allow
pub const MAX_DEPTH: u8 = 6;                 // Deeper than this takes minutes
pub const DEFAULT_DEPTH: u8 = 3;
const INFINITY: i32 = CHECKMATE * 10;        // Wider than any reachable score

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub depth: u8,
    /// Shuffle the move list at every node before searching it.
    pub randomize: bool,
    /// Fixed RNG seed for reproducible games; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            randomize: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn new(depth: u8) -> Self {
        Self {
            depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn deterministic(mut self) -> Self {
        self.randomize = false;
        self
    }

    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best_move: Option<Move>,
    /// Score from the root side-to-move's point of view.
    pub score: i32,
    pub nodes: u64,
    pub cancelled: bool,
}

// Everything one root invocation accumulates. Nothing outlives the call.
struct SearchContext<'a> {
    max_depth: u8,
    best_move: Option<Move>,
    nodes: u64,
    rng: StdRng,
    randomize: bool,
    cancel: Option<&'a AtomicBool>,
}

impl SearchContext<'_> {
    fn cancelled(&self) -> bool {
        self.cancel
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    fn negamax_alpha_beta(
        &mut self,
        state: &mut GameState,
        mut moves: Vec<Move>,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        turn_multiplier: i32,
    ) -> i32 {
        self.nodes += 1;
        if self.cancelled() {
            return 0;
        }

        if depth == 0 || moves.is_empty() {
            return leaf_score(state, &moves, depth, turn_multiplier);
        }

        if self.randomize {
            moves.shuffle(&mut self.rng);
        }

        let mut max_score = -INFINITY;
        for mv in moves {
            state.make_move(mv);
            let replies = state.get_valid_moves();
            let score = -self.negamax_alpha_beta(
                state,
                replies,
                depth - 1,
                -beta,
                -alpha,
                -turn_multiplier,
            );
            state.undo_move();

            if score > max_score {
                max_score = score;
                if depth == self.max_depth {
                    self.best_move = Some(mv);
                }
            }
            alpha = alpha.max(max_score);
            if alpha >= beta {
                break;
            }
        }
        max_score
    }
}

// Terminal status of the node whose legal moves are `moves`.
fn node_terminal(state: &GameState, moves: &[Move]) -> Terminal {
    if !moves.is_empty() {
        Terminal::Ongoing
    } else if state.in_check() {
        Terminal::Checkmate
    } else {
        Terminal::Stalemate
    }
}

// Value of a node the search stops at, for the side to move. A mate found
// with more depth left is closer to the root and scores further from zero.
fn leaf_score(state: &GameState, moves: &[Move], depth: u8, turn_multiplier: i32) -> i32 {
    let terminal = node_terminal(state, moves);
    let score = turn_multiplier * evaluate_position(state, terminal);
    if terminal == Terminal::Checkmate {
        score - i32::from(depth)
    } else {
        score
    }
}

fn turn_multiplier(state: &GameState) -> i32 {
    if state.white_to_move() {
        1
    } else {
        -1
    }
}

/// Best move for the side to move, or `None` when `valid_moves` is empty.
pub fn find_best_move(
    state: &mut GameState,
    valid_moves: &[Move],
    config: &SearchConfig,
) -> Option<Move> {
    search(state, valid_moves, config).best_move
}

pub fn search(state: &mut GameState, valid_moves: &[Move], config: &SearchConfig) -> SearchOutcome {
    search_with_cancel(state, valid_moves, config, None)
}

/// Like [`search`], but gives up as soon as `cancel` is raised. A cancelled
/// outcome has `cancelled == true` and must not be played.
pub fn search_with_cancel(
    state: &mut GameState,
    valid_moves: &[Move],
    config: &SearchConfig,
    cancel: Option<&AtomicBool>,
) -> SearchOutcome {
    let start_time = Instant::now();
    let max_depth = config.depth.clamp(MIN_DEPTH, MAX_DEPTH);
    let mut context = SearchContext {
        max_depth,
        best_move: None,
        nodes: 0,
        rng: config.rng(),
        randomize: config.randomize,
        cancel,
    };

    if valid_moves.is_empty() {
        debug!("search called without legal moves");
        return SearchOutcome {
            best_move: None,
            score: leaf_score(state, valid_moves, max_depth, turn_multiplier(state)),
            nodes: 0,
            cancelled: false,
        };
    }

    let score = context.negamax_alpha_beta(
        state,
        valid_moves.to_vec(),
        max_depth,
        -INFINITY,
        INFINITY,
        turn_multiplier(state),
    );
    let cancelled = context.cancelled();

    debug!(
        "depth {} searched {} nodes in {:?}, score {}, best {:?}",
        max_depth,
        context.nodes,
        start_time.elapsed(),
        score,
        context.best_move.map(|mv| mv.to_string())
    );

    SearchOutcome {
        best_move: if cancelled { None } else { context.best_move },
        score,
        nodes: context.nodes,
        cancelled,
    }
}

/// Plain negamax without pruning or shuffling. Same scores as the pruned
/// search, only slower.
pub fn negamax_score(state: &mut GameState, depth: u8) -> i32 {
    fn negamax(state: &mut GameState, depth: u8, turn_multiplier: i32) -> i32 {
        let moves = state.get_valid_moves();
        if depth == 0 || moves.is_empty() {
            return leaf_score(state, &moves, depth, turn_multiplier);
        }
        let mut max_score = -INFINITY;
        for mv in moves {
            state.make_move(mv);
            let score = -negamax(state, depth - 1, -turn_multiplier);
            state.undo_move();
            max_score = max_score.max(score);
        }
        max_score
    }

    let multiplier = turn_multiplier(state);
    negamax(state, depth, multiplier)
}

/// Uniformly random legal move.
pub fn find_random_move<R: Rng + ?Sized>(valid_moves: &[Move], rng: &mut R) -> Option<Move> {
    valid_moves.choose(rng).copied()
}
