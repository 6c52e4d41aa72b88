use std::io::{self, Write};

use chess_core::{Board, Color, Move, Position};

/// Upper case for White, lower case for Black, `.` for an empty square.
fn square_char(board: &Board, pos: Position) -> char {
    match board.get_piece(pos) {
        Some(piece) => {
            let symbol = piece.piece_type.symbol().to_ascii_uppercase();
            match piece.color {
                Color::White => symbol,
                Color::Black => symbol.to_ascii_lowercase(),
            }
        }
        None => '.',
    }
}

pub fn render_board<W: Write>(out: &mut W, board: &Board) -> io::Result<()> {
    for row in 0..8u8 {
        write!(out, "{}  ", 8 - row)?;
        for col in 0..8u8 {
            let ch = square_char(board, Position { row, col });
            if col < 7 {
                write!(out, "{ch} ")?;
            } else {
                writeln!(out, "{ch}")?;
            }
        }
    }
    writeln!(out, "   a b c d e f g h")
}

pub fn render_moves<W: Write>(out: &mut W, moves: &[Move]) -> io::Result<()> {
    let mut texts: Vec<String> = moves.iter().map(Move::to_coordinate).collect();
    texts.sort();
    writeln!(out, "{} legal: {}", texts.len(), texts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_start_position() {
        let mut out = Vec::new();
        render_board(&mut out, &Board::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[4], "4  . . . . . . . .");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }
}
