//! Rebuild a board by folding the resolver over a token list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::board::Board;
use crate::error::ReplayError;
use crate::piece::Color;
use crate::resolve::{resolve, ResolvedMove};

/// What to do with a token that does not resolve on the current board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedPolicy {
    /// Log and continue; the token leaves the board unchanged.
    #[default]
    Skip,
    /// Stop at the first unresolved token.
    FailFast,
}

/// How the side to move is determined for each token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnTracking {
    /// White on even plies, Black on odd plies, regardless of skipped tokens.
    #[default]
    PlyParity,
    /// Re-derive from the board with [`Board::inferred_side_to_move`].
    BoardDiff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplayOptions {
    pub on_unresolved: UnresolvedPolicy,
    pub turns: TurnTracking,
}

impl ReplayOptions {
    pub fn fail_fast() -> Self {
        Self {
            on_unresolved: UnresolvedPolicy::FailFast,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replay {
    pub board: Board,
    pub last_move: Option<ResolvedMove>,
    pub side_to_move: Color,
    /// Number of tokens that changed the board.
    pub applied: usize,
    /// Ply indices of tokens that did not resolve.
    pub skipped: Vec<usize>,
}

impl Replay {
    pub fn initial() -> Self {
        Self {
            board: Board::initial(),
            last_move: None,
            side_to_move: Color::White,
            applied: 0,
            skipped: Vec::new(),
        }
    }
}

/// Replay every token from the starting position.
pub fn replay<S: AsRef<str>>(tokens: &[S], options: ReplayOptions) -> Result<Replay, ReplayError> {
    let mut state = Replay::initial();

    for (ply, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        let side = side_for(&state.board, ply, options.turns);

        match resolve(token, &state.board, side) {
            Ok(mv) => {
                state.board = state.board.apply(&mv);
                state.last_move = Some(mv);
                state.applied += 1;
            }
            Err(source) => match options.on_unresolved {
                UnresolvedPolicy::Skip => {
                    tracing::warn!(ply, token, error = %source, "Skipping unresolved move");
                    state.skipped.push(ply);
                }
                UnresolvedPolicy::FailFast => {
                    return Err(ReplayError::Unresolved {
                        ply,
                        token: token.to_string(),
                        source,
                    });
                }
            },
        }
    }

    state.side_to_move = side_for(&state.board, tokens.len(), options.turns);
    Ok(state)
}

/// Replay `tokens[0..=ply]`, clamped to the list length.
pub fn replay_through<S: AsRef<str>>(
    tokens: &[S],
    ply: usize,
    options: ReplayOptions,
) -> Result<Replay, ReplayError> {
    let end = ply.saturating_add(1).min(tokens.len());
    replay(&tokens[..end], options)
}

fn side_for(board: &Board, ply: usize, turns: TurnTracking) -> Color {
    match turns {
        TurnTracking::PlyParity => Color::on_ply(ply),
        TurnTracking::BoardDiff => board.inferred_side_to_move(),
    }
}

impl fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnresolvedPolicy::Skip => "skip",
            UnresolvedPolicy::FailFast => "fail-fast",
        })
    }
}

impl FromStr for UnresolvedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(UnresolvedPolicy::Skip),
            "fail-fast" | "fail_fast" | "strict" => Ok(UnresolvedPolicy::FailFast),
            other => Err(format!("unknown unresolved-move policy {other:?}")),
        }
    }
}

impl fmt::Display for TurnTracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TurnTracking::PlyParity => "ply-parity",
            TurnTracking::BoardDiff => "board-diff",
        })
    }
}

impl FromStr for TurnTracking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ply-parity" | "ply_parity" | "parity" => Ok(TurnTracking::PlyParity),
            "board-diff" | "board_diff" | "diff" => Ok(TurnTracking::BoardDiff),
            other => Err(format!("unknown turn tracking {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, Role};
    use crate::square::Square;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_replay_is_initial_position() {
        let r = replay::<&str>(&[], ReplayOptions::default()).unwrap();
        assert_eq!(r, Replay::initial());
    }

    #[test]
    fn test_skip_policy_records_ply() {
        let r = replay(&["e4", "Qxz9", "e5"], ReplayOptions::default()).unwrap();
        assert_eq!(r.skipped, vec![1]);
        assert_eq!(r.applied, 2);
        // Ply 2 is still White's under ply parity, so the e4 pawn plays e5.
        assert_eq!(r.board.piece_at(sq("e5")), Some(Piece::new(Color::White, Role::Pawn)));
        assert_eq!(r.side_to_move, Color::Black);
    }

    #[test]
    fn test_fail_fast_policy_reports_ply() {
        let err = replay(&["e4", "e5", "Ke3"], ReplayOptions::fail_fast()).unwrap_err();
        let ReplayError::Unresolved { ply, token, .. } = err;
        assert_eq!(ply, 2);
        assert_eq!(token, "Ke3");
    }

    #[test]
    fn test_replay_through_clamps() {
        let tokens = ["e4", "e5", "Nf3"];
        let r = replay_through(&tokens, 0, ReplayOptions::default()).unwrap();
        assert_eq!(r.applied, 1);
        assert_eq!(r.side_to_move, Color::Black);
        let r = replay_through(&tokens, 99, ReplayOptions::default()).unwrap();
        assert_eq!(r.applied, 3);
        assert_eq!(r.last_move.unwrap().to, sq("f3"));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fail-fast".parse::<UnresolvedPolicy>(), Ok(UnresolvedPolicy::FailFast));
        assert_eq!("SKIP".parse::<UnresolvedPolicy>(), Ok(UnresolvedPolicy::Skip));
        assert!("sometimes".parse::<UnresolvedPolicy>().is_err());
        assert_eq!("board-diff".parse::<TurnTracking>(), Ok(TurnTracking::BoardDiff));
        assert_eq!(TurnTracking::PlyParity.to_string(), "ply-parity");
    }
}
