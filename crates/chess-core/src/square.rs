//! Board coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

const ASCII_LOWER_A: u8 = b'a';
const ASCII_1: u8 = b'1';

/// A board coordinate.
///
/// `rank` runs top-to-bottom from White's point of view: rank 0 is chess
/// rank 8 (Black's back rank) and rank 7 is chess rank 1. `file` 0 is the
/// "a" file.
///
/// ```
/// use chess_core::Square;
///
/// let sq: Square = "e4".parse().unwrap();
/// assert_eq!((sq.rank(), sq.file()), (4, 4));
/// assert_eq!(sq.to_string(), "e4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Returns `None` when either coordinate is outside 0..=7.
    pub const fn new(rank: u8, file: u8) -> Option<Self> {
        if rank > 7 || file > 7 {
            return None;
        }
        Some(Square { rank, file })
    }

    // Callers guarantee both coordinates are in range.
    pub(crate) const fn at(rank: u8, file: u8) -> Self {
        Square { rank, file }
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file(self) -> u8 {
        self.file
    }

    /// Builds a square from a file letter (`a`..`h`) and a rank digit (`1`..`8`).
    pub fn from_chars(file: char, rank: char) -> Option<Self> {
        let file = file_index(file)?;
        let rank = rank_index(rank)?;
        Square::new(rank, file)
    }

    /// Square shifted by the given rank/file deltas, if still on the board.
    pub fn offset(self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = self.rank as i8 + d_rank;
        let file = self.file as i8 + d_file;
        if !(0..8).contains(&rank) || !(0..8).contains(&file) {
            return None;
        }
        Square::new(rank as u8, file as u8)
    }

    pub fn file_char(self) -> char {
        (ASCII_LOWER_A + self.file) as char
    }

    /// Chess rank digit, `'8'` for rank index 0.
    pub fn rank_char(self) -> char {
        (ASCII_1 + (7 - self.rank)) as char
    }

    /// All 64 squares, rank 0 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square::at(rank, file)))
    }
}

/// File letter to file index.
pub fn file_index(c: char) -> Option<u8> {
    match c {
        'a'..='h' => Some(c as u8 - ASCII_LOWER_A),
        _ => None,
    }
}

/// Rank digit to rank index (`'8'` -> 0).
pub fn rank_index(c: char) -> Option<u8> {
    match c {
        '1'..='8' => Some(7 - (c as u8 - ASCII_1)),
        _ => None,
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Square::from_chars(file, rank)
                .ok_or_else(|| ParseError::InvalidSquare(s.to_string())),
            _ => Err(ParseError::InvalidSquare(s.to_string())),
        }
    }
}

impl TryFrom<String> for Square {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algebraic_mapping() {
        let a8: Square = "a8".parse().unwrap();
        assert_eq!((a8.rank(), a8.file()), (0, 0));
        let h1: Square = "h1".parse().unwrap();
        assert_eq!((h1.rank(), h1.file()), (7, 7));
        assert_eq!(Square::new(6, 4).unwrap().to_string(), "e2");
    }

    #[test]
    fn test_rejects_off_board() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
        assert_eq!(Square::new(8, 0), None);
    }

    #[test]
    fn test_offset_stays_on_board() {
        let a1: Square = "a1".parse().unwrap();
        assert_eq!(a1.offset(-1, 1).map(|s| s.to_string()), Some("b2".to_string()));
        assert_eq!(a1.offset(1, 0), None);
        assert_eq!(a1.offset(0, -1), None);
    }

    #[test]
    fn test_all_covers_board() {
        assert_eq!(Square::all().count(), 64);
        assert_eq!(Square::all().next().unwrap().to_string(), "a8");
    }
}
