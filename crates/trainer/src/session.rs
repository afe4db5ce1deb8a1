//! Teaching session: main-line playback and interactive move matching.
//!
//! The session never sleeps. Transitions that happen after a delay are
//! returned as [`Scheduled`] tickets inside an [`Update`]; the caller fires
//! them back through [`Session::fire`] when the delay has elapsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use chess_core::{resolve, Color, Replay, ReplayError, ReplayOptions, ResolvedMove, Square};

use crate::content::{MoveToken, Opening};
use crate::schedule::{Scheduled, TaskKind, Ticket, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Step through the curated main line.
    #[default]
    MainLine,
    /// Find your own moves in the complete game.
    CompleteGame,
}

impl PlaybackMode {
    pub fn toggled(self) -> Self {
        match self {
            PlaybackMode::MainLine => PlaybackMode::CompleteGame,
            PlaybackMode::CompleteGame => PlaybackMode::MainLine,
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaybackMode::MainLine => "main line",
            PlaybackMode::CompleteGame => "complete game",
        })
    }
}

/// Which plies belong to the learner in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HumanSide {
    #[default]
    White,
    Black,
    /// Turns follow ply parity with the learner as White, but a board click
    /// is only taken when the first token and the current token share their
    /// leading character on an even ply, or differ on an odd one.
    LeadingCharacter,
}

impl FromStr for HumanSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(HumanSide::White),
            "black" | "b" => Ok(HumanSide::Black),
            "leading-char" | "leading-character" => Ok(HumanSide::LeadingCharacter),
            other => Err(format!("unknown human side {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub timing: Timing,
    pub replay: ReplayOptions,
    pub human: HumanSide,
}

/// What an event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The event does not apply in the current state.
    Ignored,
    /// A ticket from an earlier generation, ply or state.
    Stale,
    Selected(Square),
    Deselected,
    Accepted { ply: usize },
    Mismatch { ply: usize },
    /// The ply index changed (navigation, autoplay, or after a move).
    Moved { ply: usize },
    Victory,
    Reset,
    ModeChanged(PlaybackMode),
    Autoplay(bool),
}

impl Outcome {
    /// Outcomes after which every ticket issued earlier is stale.
    pub fn is_restart(self) -> bool {
        matches!(self, Outcome::Reset | Outcome::ModeChanged(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub outcome: Outcome,
    pub schedule: Option<Scheduled>,
}

impl Update {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            schedule: None,
        }
    }

    fn with(outcome: Outcome, schedule: Option<Scheduled>) -> Self {
        Self { outcome, schedule }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    opening: Opening,
    config: SessionConfig,
    mode: PlaybackMode,
    ply: usize,
    pending_reply: bool,
    hint_visible: bool,
    explanation_visible: bool,
    victory: bool,
    autoplay: bool,
    input: String,
    selected: Option<Square>,
    generation: u64,
}

impl Session {
    /// A new session in main-line mode at ply 0.
    pub fn new(opening: Opening, config: SessionConfig) -> Self {
        Self {
            opening,
            config,
            mode: PlaybackMode::MainLine,
            ply: 0,
            pending_reply: false,
            hint_visible: false,
            explanation_visible: false,
            victory: false,
            autoplay: false,
            input: String::new(),
            selected: None,
            generation: 0,
        }
    }

    pub fn opening(&self) -> &Opening {
        &self.opening
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_reply(&self) -> bool {
        self.pending_reply
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible
    }

    pub fn explanation_visible(&self) -> bool {
        self.explanation_visible
    }

    pub fn victory(&self) -> bool {
        self.victory
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    /// The line being played. Complete-game mode falls back to the main line
    /// when the opening has no complete game.
    pub fn line(&self) -> &[MoveToken] {
        match self.mode {
            PlaybackMode::CompleteGame if self.opening.has_complete_game() => {
                &self.opening.complete_game
            }
            _ => &self.opening.moves,
        }
    }

    pub fn current(&self) -> Option<&MoveToken> {
        self.line().get(self.ply)
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == PlaybackMode::CompleteGame && self.opening.has_complete_game()
    }

    /// Whether the current ply is the learner's. Opponent replies are played
    /// on every other ply.
    pub fn is_human_turn(&self) -> bool {
        let human = match self.config.human {
            HumanSide::White | HumanSide::LeadingCharacter => Color::White,
            HumanSide::Black => Color::Black,
        };
        Color::on_ply(self.ply) == human
    }

    /// Whether a board click may be taken at the current ply. Only differs
    /// from [`Session::is_human_turn`] under [`HumanSide::LeadingCharacter`].
    pub fn is_click_turn(&self) -> bool {
        match self.config.human {
            HumanSide::LeadingCharacter => {
                let line = self.line();
                let lead = |ply: usize| line.get(ply).and_then(|m| m.token.chars().next());
                let white = if lead(0) == lead(self.ply) {
                    Color::White
                } else {
                    Color::Black
                };
                Color::on_ply(self.ply) == white
            }
            _ => self.is_human_turn(),
        }
    }

    /// Whether a submitted move would be considered right now.
    pub fn accepts_input(&self) -> bool {
        self.is_interactive()
            && !self.victory
            && !self.explanation_visible
            && !self.pending_reply
            && self.ply < self.line().len()
            && self.is_human_turn()
    }

    /// Whether a board click would be considered right now.
    pub fn accepts_click(&self) -> bool {
        self.accepts_input() && self.is_click_turn()
    }

    /// Board shown to the learner: the line through the current ply in
    /// main-line mode, the position *before* the current ply when interactive.
    pub fn replay(&self) -> Result<Replay, ReplayError> {
        let tokens = Opening::tokens(self.line());
        let end = if self.is_interactive() {
            self.ply
        } else {
            self.ply + 1
        };
        chess_core::replay(&tokens[..end.min(tokens.len())], self.config.replay)
    }

    /// The current token resolved on the interactive board, if it resolves.
    pub fn expected_move(&self) -> Option<ResolvedMove> {
        if !self.is_interactive() {
            return None;
        }
        let token = self.current()?;
        let replay = self.replay().ok()?;
        resolve(&token.token, &replay.board, replay.side_to_move).ok()
    }

    // ---------------------------------------------------------------------
    // Restart-type events
    // ---------------------------------------------------------------------

    /// Back to ply 0 with every flag cleared. Outstanding tickets go stale.
    pub fn reset(&mut self) -> Update {
        self.restart(Outcome::Reset)
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) -> Update {
        self.mode = mode;
        self.restart(Outcome::ModeChanged(mode))
    }

    pub fn toggle_mode(&mut self) -> Update {
        self.set_mode(self.mode.toggled())
    }

    pub fn select_opening(&mut self, opening: Opening) -> Update {
        info!(opening = %opening.id, "Opening selected");
        self.opening = opening;
        self.restart(Outcome::Reset)
    }

    fn restart(&mut self, outcome: Outcome) -> Update {
        self.generation += 1;
        self.ply = 0;
        self.pending_reply = false;
        self.hint_visible = false;
        self.explanation_visible = false;
        self.victory = false;
        self.autoplay = false;
        self.input.clear();
        self.selected = None;
        debug!(generation = self.generation, mode = %self.mode, "Session restarted");

        let schedule = self.begin_reply_if_opponent();
        Update::with(outcome, schedule)
    }

    // ---------------------------------------------------------------------
    // Learner input
    // ---------------------------------------------------------------------

    /// Tile click. The first click must hit the expected origin; the second
    /// either completes the expected move or deselects.
    pub fn click(&mut self, square: Square) -> Update {
        if !self.accepts_click() {
            return Update::new(Outcome::Ignored);
        }
        let Some(expected) = self.expected_move() else {
            return Update::new(Outcome::Ignored);
        };

        let selected = self.selected;
        match selected {
            None if square == expected.from => {
                self.selected = Some(square);
                Update::new(Outcome::Selected(square))
            }
            None => Update::new(Outcome::Ignored),
            Some(_) if square == expected.to => self.accept(),
            Some(from) if square == from => {
                self.selected = None;
                Update::new(Outcome::Deselected)
            }
            Some(_) => {
                self.selected = None;
                self.mismatch()
            }
        }
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Compare the text input with the expected token. Only exact equality
    /// (ignoring surrounding whitespace) counts.
    pub fn submit_input(&mut self) -> Update {
        if !self.accepts_input() {
            return Update::new(Outcome::Ignored);
        }
        let matches = match self.current() {
            Some(expected) => self.input.trim() == expected.token,
            None => return Update::new(Outcome::Ignored),
        };
        if matches {
            self.accept()
        } else {
            self.mismatch()
        }
    }

    pub fn submit(&mut self, text: &str) -> Update {
        self.set_input(text);
        self.submit_input()
    }

    fn accept(&mut self) -> Update {
        let ply = self.ply;
        debug!(ply, token = ?self.current().map(|m| &m.token), "Move accepted");
        self.explanation_visible = true;
        self.hint_visible = false;
        self.selected = None;
        let schedule = self.ticket(TaskKind::Advance, self.config.timing.explanation_delay);
        Update::with(Outcome::Accepted { ply }, Some(schedule))
    }

    fn mismatch(&mut self) -> Update {
        debug!(ply = self.ply, input = %self.input, "Move mismatch");
        self.hint_visible = true;
        Update::new(Outcome::Mismatch { ply: self.ply })
    }

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    /// Run a scheduled transition. Tickets that no longer match the session
    /// (generation, ply, or expected state) are no-ops.
    pub fn fire(&mut self, ticket: Ticket) -> Update {
        if ticket.generation != self.generation || ticket.ply != self.ply {
            debug!(?ticket, generation = self.generation, ply = self.ply, "Stale ticket");
            return Update::new(Outcome::Stale);
        }

        match ticket.kind {
            TaskKind::Advance => {
                if !self.explanation_visible || self.pending_reply || self.victory {
                    return Update::new(Outcome::Stale);
                }
                self.explanation_visible = false;
                self.input.clear();
                self.advance_after_move()
            }
            TaskKind::OpponentReply => {
                if !self.pending_reply {
                    return Update::new(Outcome::Stale);
                }
                self.pending_reply = false;
                self.explanation_visible = false;
                debug!(ply = self.ply, "Opponent replied");
                self.advance_after_move()
            }
            TaskKind::AutoplayStep => {
                if !self.autoplay || self.is_interactive() {
                    return Update::new(Outcome::Stale);
                }
                self.ply += 1;
                let schedule = self.next_autoplay_step();
                Update::with(Outcome::Moved { ply: self.ply }, schedule)
            }
        }
    }

    fn advance_after_move(&mut self) -> Update {
        if self.ply + 1 >= self.line().len() {
            self.victory = true;
            info!(opening = %self.opening.id, plies = self.line().len(), "Line completed");
            return Update::new(Outcome::Victory);
        }
        self.ply += 1;
        let schedule = self.begin_reply_if_opponent();
        Update::with(Outcome::Moved { ply: self.ply }, schedule)
    }

    fn begin_reply_if_opponent(&mut self) -> Option<Scheduled> {
        if !self.is_interactive()
            || self.victory
            || self.ply >= self.line().len()
            || self.is_human_turn()
        {
            return None;
        }
        self.pending_reply = true;
        self.explanation_visible = true;
        Some(self.ticket(TaskKind::OpponentReply, self.config.timing.reply_delay))
    }

    fn ticket(&self, kind: TaskKind, delay: std::time::Duration) -> Scheduled {
        Scheduled {
            ticket: Ticket {
                generation: self.generation,
                ply: self.ply,
                kind,
            },
            delay,
        }
    }

    // ---------------------------------------------------------------------
    // Main-line navigation
    // ---------------------------------------------------------------------

    pub fn next(&mut self) -> Update {
        if self.is_interactive() || self.ply + 1 >= self.line().len() {
            return Update::new(Outcome::Ignored);
        }
        self.go_to(self.ply + 1)
    }

    pub fn previous(&mut self) -> Update {
        if self.is_interactive() || self.ply == 0 {
            return Update::new(Outcome::Ignored);
        }
        self.go_to(self.ply - 1)
    }

    /// Jump to a ply index, clamped to the last ply.
    pub fn jump_to(&mut self, ply: usize) -> Update {
        let target = ply.min(self.line().len().saturating_sub(1));
        if self.is_interactive() || target == self.ply {
            return Update::new(Outcome::Ignored);
        }
        self.go_to(target)
    }

    pub fn jump_to_end(&mut self) -> Update {
        self.jump_to(usize::MAX)
    }

    pub fn toggle_autoplay(&mut self) -> Update {
        if self.is_interactive() {
            return Update::new(Outcome::Ignored);
        }
        if self.autoplay {
            self.autoplay = false;
            self.generation += 1;
            return Update::new(Outcome::Autoplay(false));
        }
        if self.ply + 1 >= self.line().len() {
            return Update::new(Outcome::Ignored);
        }
        self.autoplay = true;
        let schedule = self.ticket(TaskKind::AutoplayStep, self.config.timing.autoplay_interval);
        Update::with(Outcome::Autoplay(true), Some(schedule))
    }

    fn go_to(&mut self, ply: usize) -> Update {
        self.ply = ply;
        self.generation += 1;
        let schedule = if self.autoplay {
            self.next_autoplay_step()
        } else {
            None
        };
        Update::with(Outcome::Moved { ply }, schedule)
    }

    fn next_autoplay_step(&mut self) -> Option<Scheduled> {
        if self.ply + 1 >= self.line().len() {
            self.autoplay = false;
            return None;
        }
        Some(self.ticket(TaskKind::AutoplayStep, self.config.timing.autoplay_interval))
    }
}
