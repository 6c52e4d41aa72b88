// Pseudo-legal generation per piece, then filtering against checks.

use crate::{
    analysis::{self, Analysis, DIRECTIONS, KNIGHT_OFFSETS},
    board::CastlingRights,
    piece::{Color, PieceType},
    Board, GameState, Move, Position,
};

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, -1), (-1, 1), (1, -1)];

/// Legal moves together with the analysis they were filtered against.
#[derive(Debug, Clone)]
pub struct MoveGeneration {
    pub moves: Vec<Move>,
    pub analysis: Analysis,
}

struct Generator<'a> {
    board: &'a Board,
    color: Color,
    king: Position,
    analysis: &'a Analysis,
    en_passant: Option<Position>,
    castling_rights: CastlingRights,
    moves: Vec<Move>,
}

pub fn pseudo_legal_moves(state: &GameState, analysis: &Analysis) -> Vec<Move> {
    let color = state.side_to_move();
    let mut generator = Generator {
        board: state.board(),
        color,
        king: state.king_location(color),
        analysis,
        en_passant: state.en_passant_target(),
        castling_rights: state.castling_rights(),
        moves: Vec::with_capacity(48),
    };

    for (square, piece) in state.board().pieces() {
        if piece.color != color {
            continue;
        }
        match piece.piece_type {
            PieceType::Pawn => generator.pawn_moves(square),
            PieceType::Rook => generator.slider_moves(square, &ROOK_DIRECTIONS),
            PieceType::Bishop => generator.slider_moves(square, &BISHOP_DIRECTIONS),
            PieceType::Queen => {
                generator.slider_moves(square, &ROOK_DIRECTIONS);
                generator.slider_moves(square, &BISHOP_DIRECTIONS);
            }
            PieceType::Knight => generator.knight_moves(square),
            PieceType::King => {
                generator.king_moves(square);
                generator.castle_moves(square);
            }
        }
    }

    generator.moves
}

pub fn legal_moves(state: &GameState) -> MoveGeneration {
    let analysis = state.analysis();
    let mut moves = pseudo_legal_moves(state, &analysis);
    let king = state.king_location(state.side_to_move());

    let is_king_move =
        |mv: &Move| matches!(mv.piece_moved, Some(p) if p.piece_type == PieceType::King);

    match analysis.checks.as_slice() {
        [] => {}
        [check] => {
            let targets = check.blocking_squares(king);
            moves.retain(|mv| {
                is_king_move(mv)
                    || targets.contains(&mv.end)
                    || (mv.is_en_passant() && mv.capture_square() == check.attacker)
            });
        }
        _ => moves.retain(is_king_move),
    }

    MoveGeneration { moves, analysis }
}

impl<'a> Generator<'a> {
    fn allowed(&self, square: Position, delta: (i8, i8)) -> bool {
        self.analysis
            .pin_for(square)
            .map_or(true, |pin| pin.allows(delta))
    }

    fn is_enemy(&self, square: Position) -> bool {
        matches!(self.board.get_piece(square), Some(p) if p.color != self.color)
    }

    fn pawn_moves(&mut self, from: Position) {
        let dir = self.color.pawn_direction();

        if let Some(one) = from.offset(dir, 0) {
            if self.board.is_empty(one) && self.allowed(from, (dir, 0)) {
                self.moves.push(Move::new(from, one, self.board));
                if from.row == self.color.pawn_start_row() {
                    if let Some(two) = from.offset(2 * dir, 0) {
                        if self.board.is_empty(two) {
                            self.moves.push(Move::new(from, two, self.board));
                        }
                    }
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(target) = from.offset(dir, d_col) else {
                continue;
            };
            if !self.allowed(from, (dir, d_col)) {
                continue;
            }
            if self.is_enemy(target) {
                self.moves.push(Move::new(from, target, self.board));
            } else if Some(target) == self.en_passant {
                let mv = Move::en_passant(from, target, self.board);
                if !self.en_passant_exposes_king(&mv) {
                    self.moves.push(mv);
                }
            }
        }
    }

    /// Removing both pawns at once can open the king's rank to a rook or
    /// queen even though neither pawn is pinned on its own.
    fn en_passant_exposes_king(&self, mv: &Move) -> bool {
        let mut board = *self.board;
        board.set_piece(mv.capture_square(), None);
        board.set_piece(mv.start, None);
        board.set_piece(mv.end, mv.piece_moved);
        analysis::square_attacked(&board, self.color, self.king)
    }

    fn slider_moves(&mut self, from: Position, directions: &[(i8, i8)]) {
        for &(dr, dc) in directions {
            if !self.allowed(from, (dr, dc)) {
                continue;
            }
            let mut current = from;
            while let Some(next) = current.offset(dr, dc) {
                match self.board.get_piece(next) {
                    None => self.moves.push(Move::new(from, next, self.board)),
                    Some(piece) => {
                        if piece.color != self.color {
                            self.moves.push(Move::new(from, next, self.board));
                        }
                        break;
                    }
                }
                current = next;
            }
        }
    }

    fn knight_moves(&mut self, from: Position) {
        // A pinned knight can never stay on its pin line.
        if self.analysis.pin_for(from).is_some() {
            return;
        }
        for &(dr, dc) in KNIGHT_OFFSETS.iter() {
            if let Some(target) = from.offset(dr, dc) {
                if !matches!(self.board.get_piece(target), Some(p) if p.color == self.color) {
                    self.moves.push(Move::new(from, target, self.board));
                }
            }
        }
    }

    fn king_moves(&mut self, from: Position) {
        for &(dr, dc) in DIRECTIONS.iter() {
            let Some(target) = from.offset(dr, dc) else {
                continue;
            };
            if matches!(self.board.get_piece(target), Some(p) if p.color == self.color) {
                continue;
            }
            if !analysis::square_attacked(self.board, self.color, target) {
                self.moves.push(Move::new(from, target, self.board));
            }
        }
    }

    fn castle_moves(&mut self, from: Position) {
        if self.analysis.in_check
            || from != (Position { row: self.color.home_row(), col: 4 })
        {
            return;
        }
        if self.castling_rights.kingside(self.color) && self.rook_on(from.row, 7) {
            self.try_castle(from, &[5, 6], &[5, 6], 6);
        }
        if self.castling_rights.queenside(self.color) && self.rook_on(from.row, 0) {
            // b-file only needs to be empty
            self.try_castle(from, &[3, 2, 1], &[3, 2], 2);
        }
    }

    fn rook_on(&self, row: u8, col: u8) -> bool {
        matches!(
            self.board.get_piece(Position { row, col }),
            Some(p) if p.is(PieceType::Rook, self.color)
        )
    }

    fn try_castle(&mut self, from: Position, empty: &[u8], safe: &[u8], king_col: u8) {
        let row = from.row;
        let clear = empty
            .iter()
            .all(|&col| self.board.is_empty(Position { row, col }));
        let unattacked = clear
            && safe.iter().all(|&col| {
                !analysis::square_attacked(self.board, self.color, Position { row, col })
            });
        if unattacked {
            self.moves.push(Move::castle(
                from,
                Position { row, col: king_col },
                self.board,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_moves_from_the_start() {
        let state = GameState::new();
        let generation = legal_moves(&state);
        assert_eq!(generation.moves.len(), 20);
        assert!(!generation.analysis.in_check);
    }

    #[test]
    fn pseudo_legal_includes_pinned_line_moves_only() {
        let board = Board::from_diagram(&[
            "-- -- -- -- bK -- -- --",
            "-- -- -- -- bR -- -- --",
            "-- -- -- -- -- -- -- --",
            "-- -- -- -- -- -- -- --",
            "-- -- -- -- -- -- -- --",
            "-- -- -- -- -- -- -- --",
            "-- -- -- -- wR -- -- --",
            "-- -- -- -- wK -- -- --",
        ])
        .unwrap();
        let state =
            GameState::from_board(board, true, CastlingRights::none(), None).unwrap();
        let moves = pseudo_legal_moves(&state, &state.analysis());
        let rook_moves: Vec<_> = moves
            .iter()
            .filter(|mv| mv.start == Position::from_algebraic("e2").unwrap())
            .collect();
        // e3..e6 plus the capture on e7
        assert_eq!(rook_moves.len(), 5);
        assert!(rook_moves.iter().all(|mv| mv.end.col == 4));
    }
}
