use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{piece::PieceType, Board, ChessError, ChessResult, Piece, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveType {
    Normal,
    EnPassant,
    Castle,
}

/// One ply. Identity is the endpoint pair only (see [`Move::move_id`]), so a
/// move built from two clicked squares matches the generated legal move with
/// the same endpoints whatever its flags are.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub start: Position,
    pub end: Position,
    pub piece_moved: Option<Piece>,
    pub piece_captured: Option<Piece>,
    pub move_type: MoveType,
    pub is_pawn_promotion: bool,
    /// What a promoting pawn turns into. Not part of the move's identity.
    pub promotion: PieceType,
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.move_id() == other.move_id()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.move_id().hash(state);
    }
}

impl Move {
    pub fn new(start: Position, end: Position, board: &Board) -> Self {
        Self::build(start, end, board, MoveType::Normal)
    }

    pub fn en_passant(start: Position, end: Position, board: &Board) -> Self {
        Self::build(start, end, board, MoveType::EnPassant)
    }

    pub fn castle(start: Position, end: Position, board: &Board) -> Self {
        Self::build(start, end, board, MoveType::Castle)
    }

    fn build(start: Position, end: Position, board: &Board, move_type: MoveType) -> Self {
        let piece_moved = board.get_piece(start);
        let piece_captured = match move_type {
            MoveType::EnPassant => board.get_piece(Position {
                row: start.row,
                col: end.col,
            }),
            _ => board.get_piece(end),
        };
        let is_pawn_promotion = piece_moved
            .map(|p| p.piece_type == PieceType::Pawn && end.row == p.color.promotion_row())
            .unwrap_or(false);

        Self {
            start,
            end,
            piece_moved,
            piece_captured,
            move_type,
            is_pawn_promotion,
            promotion: PieceType::Queen,
        }
    }

    pub fn with_promotion(mut self, promotion: PieceType) -> Self {
        self.promotion = promotion;
        self
    }

    /// `startRow*1000 + startCol*100 + endRow*10 + endCol`.
    pub fn move_id(&self) -> u16 {
        self.start.row as u16 * 1000
            + self.start.col as u16 * 100
            + self.end.row as u16 * 10
            + self.end.col as u16
    }

    pub fn is_en_passant(&self) -> bool {
        self.move_type == MoveType::EnPassant
    }

    pub fn is_castle(&self) -> bool {
        self.move_type == MoveType::Castle
    }

    pub fn is_capture(&self) -> bool {
        self.piece_captured.is_some()
    }

    /// Square of the piece this move removes; differs from `end` only for
    /// en passant.
    pub fn capture_square(&self) -> Position {
        match self.move_type {
            MoveType::EnPassant => Position {
                row: self.start.row,
                col: self.end.col,
            },
            _ => self.end,
        }
    }

    /// Long coordinate form: `e2e4`, `e7e8q`.
    pub fn to_coordinate(&self) -> String {
        let mut text = format!("{}{}", self.start, self.end);
        if self.is_pawn_promotion {
            text.push(self.promotion.symbol().to_ascii_lowercase());
        }
        text
    }

    /// Parses `e2e4` or `e7e8n` against `board`. The result carries no
    /// legality guarantee; match it against the legal-move list.
    pub fn parse_coordinate(text: &str, board: &Board) -> ChessResult<Self> {
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(ChessError::InvalidMoveText(text.to_string()));
        }

        let start = Position::from_algebraic(&text[0..2])
            .ok_or_else(|| ChessError::InvalidSquare(text[0..2].to_string()))?;
        let end = Position::from_algebraic(&text[2..4])
            .ok_or_else(|| ChessError::InvalidSquare(text[2..4].to_string()))?;

        let mut mv = Move::new(start, end, board);
        if let Some(symbol) = text[4..].chars().next() {
            match PieceType::from_symbol(symbol) {
                Some(
                    kind @ (PieceType::Queen
                    | PieceType::Rook
                    | PieceType::Bishop
                    | PieceType::Knight),
                ) => {
                    mv = mv.with_promotion(kind);
                }
                _ => return Err(ChessError::InvalidMoveText(text.to_string())),
            }
        }
        Ok(mv)
    }
}

impl fmt::Display for Move {
    /// Simple algebraic form without check suffixes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_castle() {
            return if self.end.col == 6 {
                write!(f, "O-O")
            } else {
                write!(f, "O-O-O")
            };
        }

        let Some(piece) = self.piece_moved else {
            return write!(f, "{}{}", self.start, self.end);
        };

        match piece.piece_type {
            PieceType::Pawn => {
                if self.is_capture() {
                    write!(f, "{}x{}", self.start.file_char(), self.end)?;
                } else {
                    write!(f, "{}", self.end)?;
                }
                if self.is_pawn_promotion {
                    write!(f, "={}", self.promotion.symbol())?;
                }
                Ok(())
            }
            kind => {
                let capture = if self.is_capture() { "x" } else { "" };
                write!(f, "{}{}{}", kind.symbol(), capture, self.end)
            }
        }
    }
}
