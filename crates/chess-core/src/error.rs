//! Error types for notation resolution and replay.

use thiserror::Error;

use crate::piece::Color;
use crate::square::Square;

/// Malformed squares or board placements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("Invalid board placement: {0}")]
    InvalidPlacement(String),
}

/// Reasons a token cannot be turned into a concrete move on a given board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unrecognized move notation: {0:?}")]
    Unrecognized(String),

    #[error("No {color} piece can play {token:?}")]
    NoCandidate { token: String, color: Color },

    #[error("Ambiguous move {token:?}: {candidates} candidates")]
    Ambiguous { token: String, candidates: usize },

    #[error("{color} cannot castle with {token:?}: king or rook not on its home square")]
    CastlingUnavailable { token: String, color: Color },

    #[error("Move {token:?} lands on {square}, occupied by the mover's own piece")]
    OwnPieceOnDestination { token: String, square: Square },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("Ply {ply} ({token:?}) failed to resolve: {source}")]
    Unresolved {
        ply: usize,
        token: String,
        #[source]
        source: ResolveError,
    },
}
