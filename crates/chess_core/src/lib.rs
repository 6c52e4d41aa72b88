// Rules engine: board model, check/pin analysis, move generation and the
// mutable game state the search drives.
pub mod analysis;
pub mod board;
pub mod error;
pub mod game_state;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod piece;
pub mod position;

// Re-export main types for convenience
pub use analysis::{analyze, Analysis, Check, Pin};
pub use board::{Board, CastlingRights};
pub use error::{ChessError, ChessResult};
pub use game_state::{GameState, Terminal};
pub use moves::{Move, MoveType};
pub use perft::{perft, perft_divide};
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
