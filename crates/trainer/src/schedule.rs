//! Delayed session transitions.
//!
//! A transition that needs to happen later is returned as a [`Scheduled`]
//! value. Whoever owns the clock hands the ticket back to
//! [`Session::fire`](crate::session::Session::fire) once the delay elapses.
//! Tickets carry the session generation and ply they were issued for, so a
//! ticket that outlives a reset or a navigation step is ignored.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Hide the explanation of an accepted move and move on.
    Advance,
    /// Play the opponent's reply.
    OpponentReply,
    /// Step main-line playback forward.
    AutoplayStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u64,
    pub ply: usize,
    pub kind: TaskKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub ticket: Ticket,
    pub delay: Duration,
}

/// Fixed delays pacing the teaching loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub explanation_delay: Duration,
    pub reply_delay: Duration,
    pub autoplay_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            explanation_delay: Duration::from_millis(900),
            reply_delay: Duration::from_millis(1200),
            autoplay_interval: Duration::from_millis(1500),
        }
    }
}
