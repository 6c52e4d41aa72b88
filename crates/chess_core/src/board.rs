use crate::{
    piece::{Color, PieceType},
    ChessError, ChessResult, Piece, Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

impl CastlingRights {
    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn clear_color(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Clears the single right tied to a rook home corner, if `pos` is one.
    pub fn clear_rook_corner(&mut self, color: Color, pos: Position) {
        if pos.row != color.home_row() {
            return;
        }
        match (color, pos.col) {
            (Color::White, 0) => self.white_queenside = false,
            (Color::White, 7) => self.white_kingside = false,
            (Color::Black, 0) => self.black_queenside = false,
            (Color::Black, 7) => self.black_kingside = false,
            _ => {}
        }
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// The 8x8 grid. `squares[row][col]`, row 0 is rank 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    pub fn setup_initial_position(&mut self) {
        self.squares = [[None; 8]; 8];

        for col in 0..8 {
            self.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            self.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::White));
        }

        for (col, &piece_type) in BACK_RANK.iter().enumerate() {
            self.squares[0][col] = Some(Piece::new(piece_type, Color::Black));
            self.squares[7][col] = Some(Piece::new(piece_type, Color::White));
        }
    }

    /// Builds a board from eight rows of two-character cells separated by
    /// whitespace, row 0 (rank 8) first: `"bR bN -- -- bK -- -- bR"`.
    pub fn from_diagram(rows: &[&str; 8]) -> ChessResult<Self> {
        let mut board = Self::empty();
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<&str> = line.split_whitespace().collect();
            if cells.len() != 8 {
                return Err(ChessError::InvalidDiagram {
                    row,
                    reason: format!("expected 8 cells, found {}", cells.len()),
                });
            }
            for (col, cell) in cells.iter().enumerate() {
                board.squares[row][col] = parse_cell(cell).map_err(|reason| {
                    ChessError::InvalidDiagram { row, reason }
                })?;
            }
        }
        Ok(board)
    }

    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row as usize][pos.col as usize]
    }

    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.row as usize][pos.col as usize] = piece;
    }

    pub fn take_piece(&mut self, pos: Position) -> Option<Piece> {
        self.squares[pos.row as usize][pos.col as usize].take()
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.get_piece(pos).is_none()
    }

    /// Every occupied square, row-major from a8.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.map(|piece| {
                    (
                        Position {
                            row: row as u8,
                            col: col as u8,
                        },
                        piece,
                    )
                })
            })
        })
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, piece)| piece.is(PieceType::King, color))
            .map(|(pos, _)| pos)
    }

    /// All 64 cells concatenated, `--` for empty. Two boards share a
    /// fingerprint exactly when every square matches.
    pub fn fingerprint(&self) -> String {
        let mut key = String::with_capacity(128);
        for cells in &self.squares {
            for cell in cells {
                match cell {
                    Some(piece) => key.push_str(&piece.code()),
                    None => key.push_str("--"),
                }
            }
        }
        key
    }

    pub fn has_insufficient_material(&self) -> bool {
        let mut white_pieces = Vec::new();
        let mut black_pieces = Vec::new();

        for (pos, piece) in self.pieces() {
            match piece.color {
                Color::White => white_pieces.push((pos, piece)),
                Color::Black => black_pieces.push((pos, piece)),
            }
        }

        // King vs King
        if white_pieces.len() == 1 && black_pieces.len() == 1 {
            return true;
        }

        // King and Bishop/Knight vs King
        if (white_pieces.len() == 2 && black_pieces.len() == 1)
            || (white_pieces.len() == 1 && black_pieces.len() == 2)
        {
            let larger_side = if white_pieces.len() > black_pieces.len() {
                &white_pieces
            } else {
                &black_pieces
            };
            return larger_side.iter().any(|(_, p)| {
                matches!(p.piece_type, PieceType::Bishop | PieceType::Knight)
            });
        }

        // King and Bishop vs King and Bishop (same color bishops)
        if white_pieces.len() == 2 && black_pieces.len() == 2 {
            let bishop_square = |side: &[(Position, Piece)]| {
                side.iter()
                    .find(|(_, p)| p.piece_type == PieceType::Bishop)
                    .map(|(pos, _)| *pos)
            };
            let white_bishop = bishop_square(&white_pieces);
            let black_bishop = bishop_square(&black_pieces);
            if let (Some(wb), Some(bb)) = (white_bishop, black_bishop) {
                return wb.is_light() == bb.is_light();
            }
        }

        false
    }
}

fn parse_cell(cell: &str) -> Result<Option<Piece>, String> {
    if cell == "--" {
        return Ok(None);
    }
    let mut chars = cell.chars();
    let (Some(color), Some(kind), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(format!("bad cell `{cell}`"));
    };
    let color = match color {
        'w' => Color::White,
        'b' => Color::Black,
        _ => return Err(format!("bad color in `{cell}`")),
    };
    let piece_type = PieceType::from_symbol(kind).ok_or_else(|| format!("bad piece in `{cell}`"))?;
    Ok(Some(Piece::new(piece_type, color)))
}
