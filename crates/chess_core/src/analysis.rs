// Checks and pins seen from a king square. The analysed side's own king
// does not block rays, so candidate king squares can be probed in place.

use crate::{
    piece::{Color, PieceType},
    Board, Position,
};

/// Orthogonals first, diagonals after. Index < 4 means rook-like.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// An own piece that may only move along `direction` (king to piece, or its
/// reverse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub square: Position,
    pub direction: (i8, i8),
}

/// An enemy piece giving check. `direction` is the unit step from the king
/// towards the attacker, or the raw jump for a knight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub attacker: Position,
    pub direction: (i8, i8),
}

impl Check {
    pub fn is_knight(&self) -> bool {
        self.direction.0.abs() + self.direction.1.abs() == 3
    }

    /// Squares a non-king move may land on to answer this check: the path
    /// from the king up to and including the attacker. A knight can only be
    /// captured.
    pub fn blocking_squares(&self, king: Position) -> Vec<Position> {
        if self.is_knight() {
            return vec![self.attacker];
        }
        let mut squares = Vec::with_capacity(7);
        let mut current = king;
        while let Some(next) = current.offset(self.direction.0, self.direction.1) {
            squares.push(next);
            if next == self.attacker {
                break;
            }
            current = next;
        }
        squares
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub in_check: bool,
    pub pins: Vec<Pin>,
    pub checks: Vec<Check>,
}

impl Analysis {
    pub fn pin_for(&self, square: Position) -> Option<Pin> {
        self.pins.iter().copied().find(|pin| pin.square == square)
    }

    pub fn is_double_check(&self) -> bool {
        self.checks.len() > 1
    }
}

impl Pin {
    /// True when stepping by `delta` keeps the piece on the pin line.
    pub fn allows(&self, delta: (i8, i8)) -> bool {
        let (dr, dc) = self.direction;
        delta == (dr, dc) || delta == (-dr, -dc)
    }
}

/// Does an enemy `piece` found `distance` squares along `DIRECTIONS[index]`
/// from the king attack back down that ray?
fn attacks_along(piece_type: PieceType, attacker: Color, index: usize, distance: u8) -> bool {
    match piece_type {
        PieceType::Queen => true,
        PieceType::Rook => index < 4,
        PieceType::Bishop => index >= 4,
        PieceType::King => distance == 1,
        PieceType::Pawn => {
            if distance != 1 {
                return false;
            }
            let (dr, _) = DIRECTIONS[index];
            // A pawn attacks the king from one row behind its own advance.
            index >= 4 && dr == -attacker.pawn_direction()
        }
        PieceType::Knight => false,
    }
}

pub fn analyze(board: &Board, king_color: Color, king_square: Position) -> Analysis {
    let mut analysis = Analysis::default();

    for (index, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
        let mut possible_pin: Option<Pin> = None;
        let mut current = king_square;
        let mut distance = 0u8;

        while let Some(next) = current.offset(dr, dc) {
            current = next;
            distance += 1;

            let Some(piece) = board.get_piece(next) else {
                continue;
            };

            if piece.color == king_color {
                if piece.piece_type == PieceType::King {
                    continue;
                }
                if possible_pin.is_some() {
                    break;
                }
                possible_pin = Some(Pin {
                    square: next,
                    direction: (dr, dc),
                });
                continue;
            }

            if attacks_along(piece.piece_type, piece.color, index, distance) {
                match possible_pin {
                    Some(pin) => analysis.pins.push(pin),
                    None => {
                        analysis.in_check = true;
                        analysis.checks.push(Check {
                            attacker: next,
                            direction: (dr, dc),
                        });
                    }
                }
            }
            break;
        }
    }

    for &(dr, dc) in KNIGHT_OFFSETS.iter() {
        if let Some(target) = king_square.offset(dr, dc) {
            if let Some(piece) = board.get_piece(target) {
                if piece.is(PieceType::Knight, king_color.opponent()) {
                    analysis.in_check = true;
                    analysis.checks.push(Check {
                        attacker: target,
                        direction: (dr, dc),
                    });
                }
            }
        }
    }

    analysis
}

/// Would a `color` king standing on `square` be attacked?
pub fn square_attacked(board: &Board, color: Color, square: Position) -> bool {
    analyze(board, color, square).in_check
}
