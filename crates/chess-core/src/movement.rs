//! Per-piece movement patterns.
//!
//! These only decide whether a piece *could* travel from one square to
//! another on the current board. There is no notion of check, pins,
//! en passant or promotion.

use crate::board::Board;
use crate::piece::{Piece, Role};
use crate::square::Square;

/// Whether the piece standing on `from` can reach `to`. Returns false for an
/// empty origin or `from == to`.
pub fn can_reach(board: &Board, from: Square, to: Square) -> bool {
    match board.piece_at(from) {
        Some(piece) if from != to => piece_can_reach(board, piece, from, to),
        _ => false,
    }
}

/// Movement pattern of `piece` as if it stood on `from`.
pub fn piece_can_reach(board: &Board, piece: Piece, from: Square, to: Square) -> bool {
    let d_rank = to.rank() as i8 - from.rank() as i8;
    let d_file = to.file() as i8 - from.file() as i8;
    let (abs_rank, abs_file) = (d_rank.abs(), d_file.abs());

    match piece.role {
        Role::Pawn => {
            let forward = piece.color.forward();
            if d_file == 0 && board.is_empty(to) {
                if d_rank == forward {
                    return true;
                }
                if from.rank() == piece.color.pawn_rank() && d_rank == 2 * forward {
                    return path_clear(board, from, to);
                }
            }
            abs_file == 1 && d_rank == forward && !board.is_empty(to)
        }
        Role::Rook => (d_rank == 0 || d_file == 0) && path_clear(board, from, to),
        Role::Knight => (abs_rank == 2 && abs_file == 1) || (abs_rank == 1 && abs_file == 2),
        Role::Bishop => abs_rank == abs_file && path_clear(board, from, to),
        Role::Queen => {
            (d_rank == 0 || d_file == 0 || abs_rank == abs_file) && path_clear(board, from, to)
        }
        Role::King => abs_rank <= 1 && abs_file <= 1,
    }
}

/// Steps one square at a time from `from` toward `to` along a rank, file or
/// diagonal; any occupied square strictly between them blocks. Squares that
/// are not on a common line are never clear.
pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let d_rank = to.rank() as i8 - from.rank() as i8;
    let d_file = to.file() as i8 - from.file() as i8;
    if d_rank != 0 && d_file != 0 && d_rank.abs() != d_file.abs() {
        return false;
    }

    let step = (d_rank.signum(), d_file.signum());
    let mut current = from.offset(step.0, step.1);
    while let Some(sq) = current {
        if sq == to {
            return true;
        }
        if !board.is_empty(sq) {
            return false;
        }
        current = sq.offset(step.0, step.1);
    }
    false
}
