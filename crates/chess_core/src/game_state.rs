use log::{debug, trace};

use crate::{
    analysis::{self, Analysis},
    board::CastlingRights,
    movegen,
    piece::{Color, PieceType},
    Board, ChessError, ChessResult, Move, Piece, Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Ongoing,
    Checkmate,
    Stalemate,
}

/// The single mutable source of truth for one game.
///
/// All changes go through [`GameState::make_move`] and
/// [`GameState::undo_move`]. The castling-rights and en-passant logs hold one
/// entry per half-move plus the starting entry, so undo can restore them
/// exactly.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    white_to_move: bool,
    white_king: Position,
    black_king: Position,
    move_log: Vec<Move>,
    castling_rights: CastlingRights,
    castling_log: Vec<CastlingRights>,
    en_passant: Option<Position>,
    en_passant_log: Vec<Option<Position>>,
    checkmate: bool,
    stalemate: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::with_parts(
            Board::new(),
            true,
            Position { row: 7, col: 4 },
            Position { row: 0, col: 4 },
            CastlingRights::default(),
            None,
        )
    }

    /// Sets up an arbitrary position. Each side needs exactly one king;
    /// castling rights are taken as given and only used while the king and
    /// rook still stand on their home squares.
    pub fn from_board(
        board: Board,
        white_to_move: bool,
        castling_rights: CastlingRights,
        en_passant: Option<Position>,
    ) -> ChessResult<Self> {
        let white_king = single_king(&board, Color::White)?;
        let black_king = single_king(&board, Color::Black)?;
        Ok(Self::with_parts(
            board,
            white_to_move,
            white_king,
            black_king,
            castling_rights,
            en_passant,
        ))
    }

    fn with_parts(
        board: Board,
        white_to_move: bool,
        white_king: Position,
        black_king: Position,
        castling_rights: CastlingRights,
        en_passant: Option<Position>,
    ) -> Self {
        Self {
            board,
            white_to_move,
            white_king,
            black_king,
            move_log: Vec::new(),
            castling_rights,
            castling_log: vec![castling_rights],
            en_passant,
            en_passant_log: vec![en_passant],
            checkmate: false,
            stalemate: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn king_location(&self, color: Color) -> Position {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<Position> {
        self.en_passant
    }

    pub fn move_log(&self) -> &[Move] {
        &self.move_log
    }

    pub fn checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn stalemate(&self) -> bool {
        self.stalemate
    }

    /// Terminal status as of the last [`GameState::get_valid_moves`] call.
    pub fn terminal(&self) -> Terminal {
        if self.checkmate {
            Terminal::Checkmate
        } else if self.stalemate {
            Terminal::Stalemate
        } else {
            Terminal::Ongoing
        }
    }

    /// Check/pin picture for the side to move.
    pub fn analysis(&self) -> Analysis {
        let color = self.side_to_move();
        debug_assert_eq!(
            self.board.get_piece(self.king_location(color)),
            Some(Piece::new(PieceType::King, color)),
            "king location out of sync with the board"
        );
        analysis::analyze(&self.board, color, self.king_location(color))
    }

    pub fn in_check(&self) -> bool {
        self.analysis().in_check
    }

    pub fn has_insufficient_material(&self) -> bool {
        self.board.has_insufficient_material()
    }

    pub fn make_move(&mut self, mv: Move) {
        let placed = match mv.piece_moved {
            Some(piece) if mv.is_pawn_promotion => Some(Piece::new(mv.promotion, piece.color)),
            other => other,
        };
        self.board.set_piece(mv.start, None);
        self.board.set_piece(mv.end, placed);
        self.move_log.push(mv);
        self.white_to_move = !self.white_to_move;

        if let Some(piece) = mv.piece_moved {
            if piece.piece_type == PieceType::King {
                match piece.color {
                    Color::White => self.white_king = mv.end,
                    Color::Black => self.black_king = mv.end,
                }
            }
        }

        if mv.is_en_passant() {
            self.board.set_piece(mv.capture_square(), None);
        }

        let is_pawn = matches!(mv.piece_moved, Some(p) if p.piece_type == PieceType::Pawn);
        self.en_passant = if is_pawn && mv.start.row.abs_diff(mv.end.row) == 2 {
            Some(Position {
                row: (mv.start.row + mv.end.row) / 2,
                col: mv.start.col,
            })
        } else {
            None
        };
        self.en_passant_log.push(self.en_passant);

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook_squares(&mv);
            let rook = self.board.take_piece(rook_from);
            self.board.set_piece(rook_to, rook);
        }

        self.update_castling_rights(&mv);
        self.castling_log.push(self.castling_rights);

        trace!("make {} ({} plies)", mv, self.move_log.len());
    }

    fn update_castling_rights(&mut self, mv: &Move) {
        if let Some(piece) = mv.piece_moved {
            match piece.piece_type {
                PieceType::King => self.castling_rights.clear_color(piece.color),
                PieceType::Rook => self.castling_rights.clear_rook_corner(piece.color, mv.start),
                _ => {}
            }
        }
        // A rook taken on its corner takes the right with it.
        if let Some(captured) = mv.piece_captured {
            if captured.piece_type == PieceType::Rook {
                self.castling_rights
                    .clear_rook_corner(captured.color, mv.capture_square());
            }
        }
    }

    /// Reverts the last move. Does nothing on an empty log.
    pub fn undo_move(&mut self) {
        let Some(mv) = self.move_log.pop() else {
            debug!("undo requested with an empty move log");
            return;
        };

        self.board.set_piece(mv.start, mv.piece_moved);
        self.board.set_piece(mv.end, mv.piece_captured);
        self.white_to_move = !self.white_to_move;

        if let Some(piece) = mv.piece_moved {
            if piece.piece_type == PieceType::King {
                match piece.color {
                    Color::White => self.white_king = mv.start,
                    Color::Black => self.black_king = mv.start,
                }
            }
        }

        if mv.is_en_passant() {
            self.board.set_piece(mv.end, None);
            self.board.set_piece(mv.capture_square(), mv.piece_captured);
        }

        self.en_passant_log.pop();
        self.en_passant = self.en_passant_log.last().copied().flatten();

        self.castling_log.pop();
        self.castling_rights = self.castling_log.last().copied().unwrap_or_default();

        if mv.is_castle() {
            let (rook_home, rook_castled) = castle_rook_squares(&mv);
            let rook = self.board.take_piece(rook_castled);
            self.board.set_piece(rook_home, rook);
        }

        self.checkmate = false;
        self.stalemate = false;

        trace!("undo {} ({} plies)", mv, self.move_log.len());
    }

    /// Legal moves for the side to move. Also refreshes the checkmate and
    /// stalemate flags: exactly one is set when the list is empty.
    pub fn get_valid_moves(&mut self) -> Vec<Move> {
        let generation = movegen::legal_moves(self);

        if generation.moves.is_empty() {
            self.checkmate = generation.analysis.in_check;
            self.stalemate = !generation.analysis.in_check;
        } else {
            self.checkmate = false;
            self.stalemate = false;
        }

        generation.moves
    }

    /// Applies `candidate` only if a legal move with the same endpoints
    /// exists. The legal move (with its castle / en-passant flags) is what
    /// gets played, carrying the candidate's promotion choice.
    pub fn play(&mut self, candidate: Move) -> ChessResult<Move> {
        let legal = self
            .get_valid_moves()
            .into_iter()
            .find(|mv| *mv == candidate)
            .ok_or_else(|| ChessError::IllegalMove(candidate.to_coordinate()))?;

        let chosen = legal.with_promotion(candidate.promotion);
        self.make_move(chosen);
        Ok(chosen)
    }
}

/// (home square, castled square) of the rook for a castle move.
fn castle_rook_squares(mv: &Move) -> (Position, Position) {
    let row = mv.end.row;
    if mv.end.col > mv.start.col {
        (
            Position { row, col: mv.end.col + 1 },
            Position { row, col: mv.end.col - 1 },
        )
    } else {
        (
            Position { row, col: mv.end.col - 2 },
            Position { row, col: mv.end.col + 1 },
        )
    }
}

fn single_king(board: &Board, color: Color) -> ChessResult<Position> {
    let mut kings = board
        .pieces()
        .filter(|(_, piece)| piece.is(PieceType::King, color))
        .map(|(pos, _)| pos);
    match (kings.next(), kings.next()) {
        (Some(pos), None) => Ok(pos),
        (None, _) => Err(ChessError::InvalidPosition(format!("no {color:?} king"))),
        (Some(_), Some(_)) => Err(ChessError::InvalidPosition(format!(
            "more than one {color:?} king"
        ))),
    }
}
