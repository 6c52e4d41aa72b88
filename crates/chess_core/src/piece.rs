#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta a pawn of this color advances by. Row 0 is rank 8.
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceType {
    /// Upper-case letter for every piece; pawns use a lower-case `p` so a
    /// board cell reads `wp` / `bp`.
    pub fn symbol(self) -> char {
        match self {
            PieceType::King => 'K',
            PieceType::Queen => 'Q',
            PieceType::Rook => 'R',
            PieceType::Bishop => 'B',
            PieceType::Knight => 'N',
            PieceType::Pawn => 'p',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'K' | 'k' => Some(PieceType::King),
            'Q' | 'q' => Some(PieceType::Queen),
            'R' | 'r' => Some(PieceType::Rook),
            'B' | 'b' => Some(PieceType::Bishop),
            'N' | 'n' => Some(PieceType::Knight),
            'P' | 'p' => Some(PieceType::Pawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Self {
        Self { piece_type, color }
    }

    pub fn is(&self, piece_type: PieceType, color: Color) -> bool {
        self.piece_type == piece_type && self.color == color
    }

    /// Two-character cell text, e.g. `wK` or `bp`.
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(2);
        code.push(self.color.symbol());
        code.push(self.piece_type.symbol());
        code
    }
}
