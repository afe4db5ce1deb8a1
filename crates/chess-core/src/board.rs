//! 8x8 occupancy grid.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::piece::{Color, Piece, Role};
use crate::resolve::ResolvedMove;
use crate::square::Square;

/// FEN piece-placement field of the standard starting position.
pub const INITIAL_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_ROW: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// Piece occupancy indexed `[rank][file]`, rank 0 being chess rank 8.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; 8]; 8],
        }
    }

    /// The standard starting position.
    pub fn initial() -> Self {
        let mut board = Board::empty();
        for (file, role) in BACK_ROW.iter().enumerate() {
            board.cells[0][file] = Some(Piece::new(Color::Black, *role));
            board.cells[1][file] = Some(Piece::new(Color::Black, Role::Pawn));
            board.cells[6][file] = Some(Piece::new(Color::White, Role::Pawn));
            board.cells[7][file] = Some(Piece::new(Color::White, *role));
        }
        board
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.rank() as usize][sq.file() as usize]
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.rank() as usize][sq.file() as usize] = piece;
    }

    /// Builder-style `set`, handy for constructing positions.
    pub fn with(mut self, sq: Square, piece: Option<Piece>) -> Self {
        self.set(sq, piece);
        self
    }

    /// Occupied squares in scan order (a8..h8, a7..h7, ...).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Returns a copy of the board with `mv` applied. Castling moves the rook
    /// as well; every other move vacates `from` and places the mover on `to`.
    pub fn apply(&self, mv: &ResolvedMove) -> Board {
        let mut next = self.clone();
        next.set(mv.from, None);
        next.set(mv.to, Some(mv.piece));
        if let Some(side) = mv.castle {
            let (rook_from, rook_to) = side.rook_squares(mv.piece.color);
            let rook = next.piece_at(rook_from);
            next.set(rook_from, None);
            next.set(rook_to, rook);
        }
        next
    }

    /// Number of squares whose contents differ from the starting position.
    pub fn diff_from_initial(&self) -> usize {
        let initial = Board::initial();
        Square::all()
            .filter(|sq| self.piece_at(*sq) != initial.piece_at(*sq))
            .count()
    }

    /// Even/odd heuristic: an even number of squares differing from the
    /// starting position means White is to move. Only sound for positions
    /// reached by quiet single-piece moves; captures and castling break it.
    pub fn inferred_side_to_move(&self) -> Color {
        if self.diff_from_initial() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// FEN piece-placement field.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (rank, row) in self.cells.iter().enumerate() {
            let mut empty = 0;
            for cell in row {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank < 7 {
                out.push('/');
            }
        }
        out
    }

    /// Parses a FEN piece-placement field. Any trailing FEN fields after a
    /// space are ignored.
    pub fn from_placement(fen: &str) -> Result<Board, ParseError> {
        let placement = fen.split_whitespace().next().unwrap_or_default();
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(ParseError::InvalidPlacement(format!(
                "expected 8 ranks, found {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (rank, row) in rows.iter().enumerate() {
            let mut file = 0u8;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file = file
                        .checked_add(skip as u8)
                        .filter(|f| *f <= 8)
                        .ok_or_else(|| {
                            ParseError::InvalidPlacement(format!("rank {} is too long", 8 - rank))
                        })?;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or_else(|| {
                    ParseError::InvalidPlacement(format!("unexpected character {c:?}"))
                })?;
                let sq = Square::new(rank as u8, file).ok_or_else(|| {
                    ParseError::InvalidPlacement(format!("rank {} is too long", 8 - rank))
                })?;
                board.set(sq, Some(piece));
                file += 1;
            }
            if file != 8 {
                return Err(ParseError::InvalidPlacement(format!(
                    "rank {} has {} files",
                    8 - rank,
                    file
                )));
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::initial()
    }
}

impl FromStr for Board {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_placement(s)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.placement())
    }
}

/// Plain ASCII diagram, White at the bottom.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, row) in self.cells.iter().enumerate() {
            write!(f, "{} ", 8 - rank)?;
            for cell in row {
                let c = cell.map(Piece::fen_char).unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.placement())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Board::from_placement(&s).map_err(serde::de::Error::custom)
    }
}
