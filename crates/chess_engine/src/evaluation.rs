use chess_core::{Board, Color, GameState, PieceType, Position, Terminal};
use once_cell::sync::Lazy;

// Scores are in tenths of a pawn. Positive favours White.
pub const CHECKMATE: i32 = 10_000;
pub const STALEMATE: i32 = 0;

const PAWN_VALUE: i32 = 10;
const KNIGHT_VALUE: i32 = 30;
const BISHOP_VALUE: i32 = 30;
const ROOK_VALUE: i32 = 50;
const QUEEN_VALUE: i32 = 90;

// Piece-square tables, row 0 = rank 8. Each entry is worth a tenth of a
// pawn, so the biggest positional swing (8) is still less than a pawn.
// Knight, bishop, rook and queen tables are rank-symmetric and serve both
// colours.

// Knights want the centre and lose value on the rim.
const KNIGHT_SCORES: [[i32; 8]; 8] = [
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
];

// Long diagonals.
const BISHOP_SCORES: [[i32; 8]; 8] = [
    [4, 3, 2, 1, 1, 2, 3, 4],
    [3, 4, 3, 2, 2, 3, 4, 3],
    [2, 3, 4, 3, 3, 4, 3, 2],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [2, 3, 4, 3, 3, 4, 3, 2],
    [3, 4, 3, 2, 2, 3, 4, 3],
    [4, 3, 2, 1, 1, 2, 3, 4],
];

const QUEEN_SCORES: [[i32; 8]; 8] = [
    [1, 1, 1, 3, 1, 1, 1, 1],
    [1, 2, 3, 3, 3, 1, 1, 1],
    [1, 4, 3, 3, 3, 4, 2, 1],
    [1, 2, 3, 3, 3, 2, 2, 1],
    [1, 2, 3, 3, 3, 2, 2, 1],
    [1, 4, 3, 3, 3, 4, 2, 1],
    [1, 2, 3, 3, 3, 1, 1, 1],
    [1, 1, 1, 3, 1, 1, 1, 1],
];

// Back ranks and the seventh are where rooks belong.
const ROOK_SCORES: [[i32; 8]; 8] = [
    [4, 3, 4, 4, 4, 4, 3, 4],
    [4, 4, 4, 4, 4, 4, 4, 4],
    [1, 1, 2, 3, 3, 2, 1, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 1, 2, 3, 3, 2, 1, 1],
    [4, 4, 4, 4, 4, 4, 4, 4],
    [4, 3, 4, 4, 4, 4, 3, 4],
];

// Pawns gain value as they near promotion.
const WHITE_PAWN_SCORES: [[i32; 8]; 8] = [
    [8, 8, 8, 8, 8, 8, 8, 8],
    [8, 8, 8, 8, 8, 8, 8, 8],
    [5, 6, 6, 7, 7, 6, 6, 5],
    [2, 3, 3, 5, 5, 3, 3, 2],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 1, 2, 3, 3, 2, 1, 1],
    [1, 1, 1, 0, 0, 1, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

static BLACK_PAWN_SCORES: Lazy<[[i32; 8]; 8]> = Lazy::new(|| {
    let mut mirrored = WHITE_PAWN_SCORES;
    mirrored.reverse();
    mirrored
});

/// Scores a position from White's point of view.
///
/// `terminal` is the status of `state` as established by move generation;
/// passing it in keeps this function free of side effects. A mated side to
/// move scores `-CHECKMATE` from its own colour's side (so `+CHECKMATE` when
/// Black is mated) and stalemate is dead level.
pub fn evaluate_position(state: &GameState, terminal: Terminal) -> i32 {
    match terminal {
        Terminal::Checkmate => {
            if state.white_to_move() {
                -CHECKMATE
            } else {
                CHECKMATE
            }
        }
        Terminal::Stalemate => STALEMATE,
        Terminal::Ongoing => score_board(state.board()),
    }
}

/// Material plus piece-square bonus, White minus Black.
pub fn score_board(board: &Board) -> i32 {
    board
        .pieces()
        .map(|(pos, piece)| {
            let value = get_piece_value(piece.piece_type)
                + get_position_bonus(piece.piece_type, pos, piece.color);
            match piece.color {
                Color::White => value,
                Color::Black => -value,
            }
        })
        .sum()
}

pub fn get_piece_value(piece_type: PieceType) -> i32 {
    match piece_type {
        PieceType::Pawn => PAWN_VALUE,
        PieceType::Knight => KNIGHT_VALUE,
        PieceType::Bishop => BISHOP_VALUE,
        PieceType::Rook => ROOK_VALUE,
        PieceType::Queen => QUEEN_VALUE,
        PieceType::King => 0,
    }
}

fn get_position_bonus(piece_type: PieceType, pos: Position, color: Color) -> i32 {
    let (row, col) = (pos.row as usize, pos.col as usize);
    match piece_type {
        PieceType::Pawn => match color {
            Color::White => WHITE_PAWN_SCORES[row][col],
            Color::Black => BLACK_PAWN_SCORES[row][col],
        },
        PieceType::Knight => KNIGHT_SCORES[row][col],
        PieceType::Bishop => BISHOP_SCORES[row][col],
        PieceType::Rook => ROOK_SCORES[row][col],
        PieceType::Queen => QUEEN_SCORES[row][col],
        PieceType::King => 0,
    }
}
