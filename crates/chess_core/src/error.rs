use thiserror::Error;

/// Errors raised at the edges of the rules engine: parsing text input and
/// applying a move that is not in the legal-move list. The rules operations
/// themselves never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid board diagram at row {row}: {reason}")]
    InvalidDiagram { row: usize, reason: String },
}

pub type ChessResult<T> = Result<T, ChessError>;
