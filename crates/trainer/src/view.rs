//! Read-only projection of a session for display.

use serde::Serialize;
use std::fmt::Write;
use tracing::warn;

use chess_core::{Board, Color, ReplayError, Square};

use crate::config::OutputFormat;
use crate::content::MoveToken;
use crate::session::{PlaybackMode, Session};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlights {
    /// Origin and destination of the last applied move.
    pub last_move: Option<[Square; 2]>,
    /// Origin and destination of the expected move, while the hint is shown.
    pub hint: Option<[Square; 2]>,
    pub selected: Option<Square>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub opening_id: String,
    pub title: String,
    pub mode: PlaybackMode,
    pub interactive: bool,
    pub ply: usize,
    pub total_plies: usize,
    pub board: Board,
    pub side_to_move: Color,
    pub current: Option<MoveToken>,
    pub explanation_visible: bool,
    pub hint_visible: bool,
    pub pending_reply: bool,
    pub victory: bool,
    pub autoplay: bool,
    pub awaiting_input: bool,
    pub highlights: Highlights,
    /// Plies skipped while building the board.
    pub skipped: Vec<usize>,
}

impl Snapshot {
    pub fn capture(session: &Session) -> Result<Self, ReplayError> {
        let replay = session.replay()?;
        let hint = if session.hint_visible() {
            session.expected_move().map(|m| [m.from, m.to])
        } else {
            None
        };

        Ok(Self {
            opening_id: session.opening().id.clone(),
            title: session.opening().title.clone(),
            mode: session.mode(),
            interactive: session.is_interactive(),
            ply: session.ply(),
            total_plies: session.line().len(),
            side_to_move: replay.side_to_move,
            current: session.current().cloned(),
            explanation_visible: session.explanation_visible(),
            hint_visible: session.hint_visible(),
            pending_reply: session.pending_reply(),
            victory: session.victory(),
            autoplay: session.autoplay(),
            awaiting_input: session.accepts_input(),
            highlights: Highlights {
                last_move: replay.last_move.map(|m| [m.from, m.to]),
                hint,
                selected: session.selected(),
            },
            skipped: replay.skipped,
            board: replay.board,
        })
    }

    fn is_highlighted(&self, sq: Square) -> bool {
        let h = &self.highlights;
        h.last_move.is_some_and(|m| m.contains(&sq)) || h.hint.is_some_and(|m| m.contains(&sq))
    }
}

/// Plain-text rendering: a status header, the board (highlighted squares in
/// brackets, the selected square in angle brackets) and the current text.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} [{}] ply {}/{}",
        snapshot.title,
        snapshot.mode,
        snapshot.ply + 1,
        snapshot.total_plies
    );

    for rank in 0..8u8 {
        let _ = write!(out, "{} ", 8 - rank);
        for file in 0..8u8 {
            let Some(sq) = Square::new(rank, file) else {
                continue;
            };
            let glyph = snapshot
                .board
                .piece_at(sq)
                .map(|p| p.glyph())
                .unwrap_or('.');
            if snapshot.highlights.selected == Some(sq) {
                let _ = write!(out, "<{glyph}>");
            } else if snapshot.is_highlighted(sq) {
                let _ = write!(out, "[{glyph}]");
            } else {
                let _ = write!(out, " {glyph} ");
            }
        }
        out.push('\n');
    }
    out.push_str("   a  b  c  d  e  f  g  h\n");

    if let Some(current) = &snapshot.current {
        let shown_move = !snapshot.interactive || snapshot.explanation_visible;
        if shown_move {
            let label = if current.notation.is_empty() {
                current.token.as_str()
            } else {
                current.notation.as_str()
            };
            let _ = writeln!(out, "{label}");
            if !current.explanation.is_empty() {
                let _ = writeln!(out, "  {}", current.explanation);
            }
            if let Some(evaluation) = &current.evaluation {
                let _ = writeln!(out, "  Evaluation: {evaluation}");
            }
            if !current.alternatives.is_empty() && !snapshot.interactive {
                let _ = writeln!(out, "  Alternatives: {}", current.alternatives.join(", "));
            }
        }
        if snapshot.hint_visible {
            let _ = writeln!(out, "Hint: {}", current.token);
        }
    }

    if snapshot.victory {
        out.push_str("Line complete!\n");
    } else if snapshot.pending_reply {
        out.push_str("Opponent is thinking...\n");
    } else if snapshot.awaiting_input {
        let _ = writeln!(out, "Your move ({}):", snapshot.side_to_move);
    } else if snapshot.autoplay {
        out.push_str("Autoplay on\n");
    }
    out
}

/// Output for one session update in the configured format. A board that
/// cannot be rebuilt (fail-fast replay past an unresolved token) becomes a
/// notice instead of an error, so the session stays usable.
pub fn present(session: &Session, format: OutputFormat) -> String {
    match Snapshot::capture(session) {
        Ok(snapshot) => match format {
            OutputFormat::Text => render(&snapshot),
            OutputFormat::Json => match serde_json::to_string(&snapshot) {
                Ok(json) => json,
                Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
            },
        },
        Err(e) => {
            warn!(
                opening = %session.opening().id,
                ply = session.ply(),
                error = %e,
                "Board cannot be shown"
            );
            match format {
                OutputFormat::Text => format!("Cannot show the board: {e}\n"),
                OutputFormat::Json => serde_json::json!({
                    "error": e.to_string(),
                    "opening_id": session.opening().id,
                    "ply": session.ply(),
                })
                .to_string(),
            }
        }
    }
}
