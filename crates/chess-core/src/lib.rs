//! Board model, short-algebraic move resolution and replay for pre-authored
//! opening lines.
//!
//! This is not a chess engine: there is no check detection, en passant or
//! promotion. A line of tokens is replayed from the starting position and each
//! token is bound to concrete squares on the board it is played on.

pub mod board;
pub mod error;
pub mod movement;
pub mod pgn;
pub mod piece;
pub mod replay;
pub mod resolve;
pub mod square;

pub use board::{Board, INITIAL_PLACEMENT};
pub use error::{ParseError, ReplayError, ResolveError};
pub use piece::{Color, Piece, Role};
pub use replay::{replay, replay_through, Replay, ReplayOptions, TurnTracking, UnresolvedPolicy};
pub use resolve::{resolve, resolve_inferred, CastleSide, ResolvedMove};
pub use square::Square;
