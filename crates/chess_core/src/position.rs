use std::fmt;

/// A board square. Row 0 is rank 8 and col 0 is file a.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Step by a signed delta, returning `None` once it leaves the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = u8::try_from(self.row as i8 + d_row).ok()?;
        let col = u8::try_from(self.col as i8 + d_col).ok()?;
        Self::new(row, col)
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        Some(Self {
            row: b'8' - rank as u8,
            col: file as u8 - b'a',
        })
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(self) -> char {
        (b'8' - self.row) as char
    }

    pub fn to_algebraic(self) -> String {
        let mut text = String::with_capacity(2);
        text.push(self.file_char());
        text.push(self.rank_char());
        text
    }

    /// Light squares are the ones where row + col is even (a8, h1).
    pub fn is_light(self) -> bool {
        (self.row + self.col) % 2 == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_maps_rank_eight_to_row_zero() {
        let a8 = Position::from_algebraic("a8").unwrap();
        assert_eq!(a8, Position { row: 0, col: 0 });
        let e1 = Position::from_algebraic("e1").unwrap();
        assert_eq!(e1, Position { row: 7, col: 4 });
        assert_eq!(e1.to_algebraic(), "e1");
    }

    #[test]
    fn rejects_bad_notation() {
        assert!(Position::from_algebraic("i1").is_none());
        assert!(Position::from_algebraic("a9").is_none());
        assert!(Position::from_algebraic("e").is_none());
        assert!(Position::from_algebraic("e44").is_none());
    }

    #[test]
    fn new_checks_bounds() {
        assert_eq!(Position::new(7, 7), Position::from_algebraic("h1"));
        assert!(Position::new(8, 0).is_none());
        assert!(Position::new(0, 8).is_none());
    }

    #[test]
    fn offset_stops_at_edges() {
        let h1 = Position::from_algebraic("h1").unwrap();
        assert!(h1.offset(0, 1).is_none());
        assert!(h1.offset(1, 0).is_none());
        assert_eq!(h1.offset(-1, -1), Position::from_algebraic("g2"));
    }
}
