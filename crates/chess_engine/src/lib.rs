pub mod ai;
pub mod error;
pub mod evaluation;
pub mod search;

pub use ai::{ChessAI, SearchTask, TaskStatus};
pub use error::{EngineError, EngineResult};
pub use evaluation::{evaluate_position, score_board, CHECKMATE, STALEMATE};
pub use search::{
    find_best_move, find_random_move, negamax_score, search, search_with_cancel, SearchConfig,
    SearchOutcome,
};
