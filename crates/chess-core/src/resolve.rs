//! Short algebraic notation -> concrete move, against a specific board.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::board::Board;
use crate::error::ResolveError;
use crate::movement;
use crate::piece::{Color, Piece, Role};
use crate::square::{file_index, rank_index, Square};

static PAWN_PUSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-h])([1-8])$").expect("valid pawn push pattern"));

static PAWN_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-h])x([a-h])([1-8])$").expect("valid pawn capture pattern")
});

static PIECE_MOVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([KQRBN])([a-h]?[1-8]?)(x?)([a-h])([1-8])$").expect("valid piece move pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    /// Castling literal after annotation stripping.
    fn from_literal(s: &str) -> Option<CastleSide> {
        match s {
            "O-O" | "0-0" => Some(CastleSide::King),
            "O-O-O" | "0-0-0" => Some(CastleSide::Queen),
            _ => None,
        }
    }

    pub fn king_squares(self, color: Color) -> (Square, Square) {
        let rank = color.back_rank();
        match self {
            CastleSide::King => (Square::at(rank, 4), Square::at(rank, 6)),
            CastleSide::Queen => (Square::at(rank, 4), Square::at(rank, 2)),
        }
    }

    pub fn rook_squares(self, color: Color) -> (Square, Square) {
        let rank = color.back_rank();
        match self {
            CastleSide::King => (Square::at(rank, 7), Square::at(rank, 5)),
            CastleSide::Queen => (Square::at(rank, 0), Square::at(rank, 3)),
        }
    }
}

/// A token bound to concrete squares on one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// Set for castling; `from`/`to` are then the king's squares.
    pub castle: Option<CastleSide>,
}

/// Removes check, mate and annotation marks (`+ # ! ?`).
pub fn strip_annotations(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| !matches!(c, '+' | '#' | '!' | '?'))
        .collect()
}

/// Resolve `token` for `side` on `board`.
///
/// Recognized forms, first match wins: castling (`O-O`, `O-O-O`, or with
/// zeros), pawn advance (`e4`), pawn capture (`exd5`) and piece moves with
/// optional disambiguation and capture mark (`Nf3`, `Nbd7`, `R1e2`, `Qxd8`).
/// Promotion and en passant are not supported.
pub fn resolve(token: &str, board: &Board, side: Color) -> Result<ResolvedMove, ResolveError> {
    let clean = strip_annotations(token);

    let resolved = if let Some(castle) = CastleSide::from_literal(&clean) {
        resolve_castle(token, board, side, castle)?
    } else if let Some(caps) = PAWN_PUSH.captures(&clean) {
        let to = square_from(&caps[1], &caps[2]);
        resolve_pawn_push(token, board, side, to)?
    } else if let Some(caps) = PAWN_CAPTURE.captures(&clean) {
        let from_file = file_index(first_char(&caps[1])).unwrap_or_default();
        let to = square_from(&caps[2], &caps[3]);
        resolve_pawn_capture(token, board, side, from_file, to)?
    } else if let Some(caps) = PIECE_MOVE.captures(&clean) {
        let role = Role::from_letter(first_char(&caps[1]))
            .ok_or_else(|| ResolveError::Unrecognized(token.to_string()))?;
        let to = square_from(&caps[4], &caps[5]);
        resolve_piece_move(token, board, side, role, &caps[2], to)?
    } else {
        return Err(ResolveError::Unrecognized(token.to_string()));
    };

    if let Some(occupant) = board.piece_at(resolved.to) {
        if occupant.color == side && resolved.castle.is_none() {
            return Err(ResolveError::OwnPieceOnDestination {
                token: token.to_string(),
                square: resolved.to,
            });
        }
    }
    Ok(resolved)
}

/// Resolve with the side to move inferred from the board alone
/// (see [`Board::inferred_side_to_move`]).
pub fn resolve_inferred(token: &str, board: &Board) -> Result<ResolvedMove, ResolveError> {
    resolve(token, board, board.inferred_side_to_move())
}

fn resolve_castle(
    token: &str,
    board: &Board,
    side: Color,
    castle: CastleSide,
) -> Result<ResolvedMove, ResolveError> {
    let king = Piece::new(side, Role::King);
    let rook = Piece::new(side, Role::Rook);
    let (king_from, king_to) = castle.king_squares(side);
    let (rook_from, _) = castle.rook_squares(side);

    if board.piece_at(king_from) != Some(king) || board.piece_at(rook_from) != Some(rook) {
        return Err(ResolveError::CastlingUnavailable {
            token: token.to_string(),
            color: side,
        });
    }

    Ok(ResolvedMove {
        from: king_from,
        to: king_to,
        piece: king,
        captured: None,
        castle: Some(castle),
    })
}

fn resolve_pawn_push(
    token: &str,
    board: &Board,
    side: Color,
    to: Square,
) -> Result<ResolvedMove, ResolveError> {
    let pawn = Piece::new(side, Role::Pawn);
    let back = -side.forward();
    let no_candidate = || ResolveError::NoCandidate {
        token: token.to_string(),
        color: side,
    };

    if !board.is_empty(to) {
        return Err(no_candidate());
    }

    let one_behind = to.offset(back, 0).ok_or_else(no_candidate)?;
    if board.piece_at(one_behind) == Some(pawn) {
        return Ok(pawn_move(pawn, one_behind, to, None));
    }

    if to.rank() == side.double_step_rank() && board.is_empty(one_behind) {
        if let Some(two_behind) = one_behind.offset(back, 0) {
            if board.piece_at(two_behind) == Some(pawn) {
                return Ok(pawn_move(pawn, two_behind, to, None));
            }
        }
    }

    Err(no_candidate())
}

fn resolve_pawn_capture(
    token: &str,
    board: &Board,
    side: Color,
    from_file: u8,
    to: Square,
) -> Result<ResolvedMove, ResolveError> {
    let pawn = Piece::new(side, Role::Pawn);
    let no_candidate = || ResolveError::NoCandidate {
        token: token.to_string(),
        color: side,
    };

    if (from_file as i8 - to.file() as i8).abs() != 1 {
        return Err(no_candidate());
    }
    let from = to
        .offset(-side.forward(), 0)
        .and_then(|sq| Square::new(sq.rank(), from_file))
        .ok_or_else(no_candidate)?;
    if board.piece_at(from) != Some(pawn) {
        return Err(no_candidate());
    }

    // The destination is taken as-is; an empty square is not rejected.
    Ok(pawn_move(pawn, from, to, board.piece_at(to)))
}

fn resolve_piece_move(
    token: &str,
    board: &Board,
    side: Color,
    role: Role,
    disambiguation: &str,
    to: Square,
) -> Result<ResolvedMove, ResolveError> {
    let piece = Piece::new(side, role);
    let candidates: Vec<Square> = board
        .pieces()
        .filter(|(from, p)| *p == piece && movement::can_reach(board, *from, to))
        .map(|(from, _)| from)
        .collect();

    let from = match candidates.as_slice() {
        [] => {
            return Err(ResolveError::NoCandidate {
                token: token.to_string(),
                color: side,
            })
        }
        [only] => *only,
        several if disambiguation.is_empty() => {
            return Err(ResolveError::Ambiguous {
                token: token.to_string(),
                candidates: several.len(),
            })
        }
        several => {
            let filtered: Vec<Square> = several
                .iter()
                .copied()
                .filter(|sq| matches_disambiguation(*sq, disambiguation))
                .collect();
            match filtered.as_slice() {
                [only] => *only,
                _ => {
                    return Err(ResolveError::Ambiguous {
                        token: token.to_string(),
                        candidates: filtered.len(),
                    })
                }
            }
        }
    };

    Ok(ResolvedMove {
        from,
        to,
        piece,
        captured: board.piece_at(to),
        castle: None,
    })
}

/// A fragment like `b`, `1` or `b1` restricts the origin's file and/or rank.
fn matches_disambiguation(sq: Square, fragment: &str) -> bool {
    fragment.chars().all(|c| match (file_index(c), rank_index(c)) {
        (Some(file), _) => sq.file() == file,
        (_, Some(rank)) => sq.rank() == rank,
        _ => false,
    })
}

fn pawn_move(pawn: Piece, from: Square, to: Square, captured: Option<Piece>) -> ResolvedMove {
    ResolvedMove {
        from,
        to,
        piece: pawn,
        captured,
        castle: None,
    }
}

fn first_char(s: &str) -> char {
    s.chars().next().unwrap_or_default()
}

// Only called on regex captures of `[a-h]` and `[1-8]`.
fn square_from(file: &str, rank: &str) -> Square {
    let file = file_index(first_char(file)).unwrap_or_default();
    let rank = rank_index(first_char(rank)).unwrap_or_default();
    Square::at(rank, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement).unwrap()
    }

    #[test]
    fn test_pawn_single_and_double_step() {
        let b = Board::initial();
        let mv = resolve("e4", &b, Color::White).unwrap();
        assert_eq!((mv.from, mv.to), (sq("e2"), sq("e4")));
        let mv = resolve("e3", &b, Color::White).unwrap();
        assert_eq!(mv.from, sq("e2"));
        let mv = resolve("c5", &b, Color::Black).unwrap();
        assert_eq!((mv.from, mv.to), (sq("c7"), sq("c5")));
        assert!(resolve("e5", &b, Color::White).is_err());
    }

    #[test]
    fn test_pawn_push_onto_occupied_square_fails() {
        let b = board("8/8/8/8/4p3/4P3/8/8");
        assert!(matches!(
            resolve("e4", &b, Color::White),
            Err(ResolveError::NoCandidate { .. })
        ));
    }

    #[test]
    fn test_pawn_capture_records_captured_piece() {
        let b = board("8/8/8/3p4/4P3/8/8/8");
        let mv = resolve("exd5", &b, Color::White).unwrap();
        assert_eq!((mv.from, mv.to), (sq("e4"), sq("d5")));
        assert_eq!(mv.captured, Some(Piece::new(Color::Black, Role::Pawn)));
        let mv = resolve("dxe4", &b, Color::Black).unwrap();
        assert_eq!(mv.from, sq("d5"));
    }

    #[test]
    fn test_pawn_capture_onto_empty_square_is_allowed() {
        let b = board("8/8/8/8/4P3/8/8/8");
        let mv = resolve("exf5", &b, Color::White).unwrap();
        assert_eq!(mv.captured, None);
        assert!(resolve("exh5", &b, Color::White).is_err());
    }

    #[test]
    fn test_annotations_are_stripped() {
        let b = Board::initial();
        let mv = resolve("Nf3!?", &b, Color::White).unwrap();
        assert_eq!(mv.from, sq("g1"));
        assert_eq!(strip_annotations(" Qh8# "), "Qh8");
    }

    #[test]
    fn test_piece_move_picks_only_candidate() {
        let b = Board::initial();
        let mv = resolve("Nc6", &b, Color::Black).unwrap();
        assert_eq!(mv.from, sq("b8"));
        assert_eq!(mv.piece, Piece::new(Color::Black, Role::Knight));
    }

    #[test]
    fn test_ambiguous_rooks_need_disambiguation() {
        let b = board("4k3/8/8/8/8/8/8/R3K2R").with(sq("e1"), None);
        assert_eq!(
            resolve("Rd1", &b, Color::White),
            Err(ResolveError::Ambiguous {
                token: "Rd1".to_string(),
                candidates: 2
            })
        );
        assert_eq!(resolve("Rad1", &b, Color::White).unwrap().from, sq("a1"));
        assert_eq!(resolve("Rhd1", &b, Color::White).unwrap().from, sq("h1"));
    }

    #[test]
    fn test_rank_disambiguation() {
        let b = board("4k3/8/8/R7/8/8/8/R3K3");
        assert!(resolve("Ra3", &b, Color::White).is_err());
        assert_eq!(resolve("R1a3", &b, Color::White).unwrap().from, sq("a1"));
        assert_eq!(resolve("R5a3", &b, Color::White).unwrap().from, sq("a5"));
        assert!(resolve("R7a3", &b, Color::White).is_err());
    }

    #[test]
    fn test_full_square_disambiguation() {
        // Queens on a4, h4 and a1 all reach d4.
        let b = board("4k3/8/8/8/Q6Q/8/7K/Q7");
        assert_eq!(
            resolve("Qd4", &b, Color::White),
            Err(ResolveError::Ambiguous {
                token: "Qd4".to_string(),
                candidates: 3
            })
        );
        assert!(resolve("Qad4", &b, Color::White).is_err());
        assert!(resolve("Q4d4", &b, Color::White).is_err());
        assert_eq!(resolve("Qa4d4", &b, Color::White).unwrap().from, sq("a4"));
        assert_eq!(resolve("Qa1xd4", &b, Color::White).unwrap().from, sq("a1"));
    }

    #[test]
    fn test_blocked_slider_is_not_a_candidate() {
        // Both rooks pattern-match d1, but the knight on c1 blocks a1.
        let b = board("4k3/8/8/8/8/8/8/R1n4R");
        let mv = resolve("Rd1", &b, Color::White).unwrap();
        assert_eq!(mv.from, sq("h1"));
    }

    #[test]
    fn test_own_piece_on_destination_is_rejected() {
        let b = board("4k3/8/8/8/8/8/8/R2B3K");
        assert!(matches!(
            resolve("Rd1", &b, Color::White),
            Err(ResolveError::OwnPieceOnDestination { .. })
        ));
    }

    #[test]
    fn test_castling_needs_king_and_rook_at_home() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R");
        let mv = resolve("O-O", &b, Color::White).unwrap();
        assert_eq!((mv.from, mv.to), (sq("e1"), sq("g1")));
        assert_eq!(mv.castle, Some(CastleSide::King));
        let mv = resolve("0-0-0", &b, Color::Black).unwrap();
        assert_eq!((mv.from, mv.to), (sq("e8"), sq("c8")));
        let mv = resolve("O-O+", &b, Color::Black).unwrap();
        assert_eq!(mv.to, sq("g8"));

        let no_rook = b.with(sq("h1"), None);
        assert!(matches!(
            resolve("O-O", &no_rook, Color::White),
            Err(ResolveError::CastlingUnavailable { .. })
        ));
    }

    #[test]
    fn test_unrecognized_tokens() {
        let b = Board::initial();
        for token in ["", "e9", "Pe4", "e8=Q", "N f3", "Zf3", "exd"] {
            assert!(
                matches!(resolve(token, &b, Color::White), Err(ResolveError::Unrecognized(_))),
                "{token:?} should be unrecognized"
            );
        }
    }

    #[test]
    fn test_inferred_side_from_board() {
        let b = Board::initial();
        assert_eq!(resolve_inferred("e4", &b).unwrap().piece.color, Color::White);
        let after = b.apply(&resolve("e4", &b, Color::White).unwrap());
        // Two squares differ after one quiet move: the heuristic still says White.
        assert_eq!(after.inferred_side_to_move(), Color::White);
        assert!(resolve_inferred("e5", &after).is_ok());
        assert_eq!(resolve_inferred("e5", &after).unwrap().piece.color, Color::White);
    }
}
