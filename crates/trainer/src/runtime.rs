//! Tokio timers that deliver scheduled tickets back to the session owner.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::schedule::{Scheduled, Ticket};
use crate::session::{Outcome, Session, Update};

pub struct Timers {
    tx: mpsc::UnboundedSender<Ticket>,
    tasks: Vec<JoinHandle<()>>,
}

impl Timers {
    /// Timers plus the receiver their tickets arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Ticket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                tasks: Vec::new(),
            },
            rx,
        )
    }

    pub fn schedule(&mut self, scheduled: Scheduled) {
        self.tasks.retain(|task| !task.is_finished());
        let tx = self.tx.clone();
        let Scheduled { ticket, delay } = scheduled;
        debug!(?ticket, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        self.tasks.push(tokio::spawn(async move {
            sleep(delay).await;
            // The receiver is gone only when the front end is shutting down.
            let _ = tx.send(ticket);
        }));
    }

    /// Abort every timer that has not fired yet.
    pub fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn has_pending(&mut self) -> bool {
        self.tasks.retain(|task| !task.is_finished());
        !self.tasks.is_empty()
    }

    /// Follow up on a session update: restarts drop outstanding timers, and a
    /// new ticket is scheduled if the update carries one.
    pub fn apply(&mut self, update: &Update) {
        if update.outcome.is_restart() {
            self.cancel_all();
        }
        if let Some(scheduled) = update.schedule {
            self.schedule(scheduled);
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Fire tickets into the session until no timer is left, returning the
/// outcome of each fired ticket.
pub async fn settle(
    session: &mut Session,
    timers: &mut Timers,
    rx: &mut mpsc::UnboundedReceiver<Ticket>,
) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    loop {
        let ticket = match rx.try_recv() {
            Ok(ticket) => ticket,
            Err(_) if timers.has_pending() => match rx.recv().await {
                Some(ticket) => ticket,
                None => break,
            },
            Err(_) => break,
        };
        let update = session.fire(ticket);
        timers.apply(&update);
        outcomes.push(update.outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TaskKind;
    use std::time::Duration;
    use tokio::time::Instant;

    fn scheduled(ply: usize, ms: u64) -> Scheduled {
        Scheduled {
            ticket: Ticket {
                generation: 0,
                ply,
                kind: TaskKind::Advance,
            },
            delay: Duration::from_millis(ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tickets_arrive_after_delay_in_order() {
        let (mut timers, mut rx) = Timers::new();
        let start = Instant::now();
        timers.schedule(scheduled(2, 200));
        timers.schedule(scheduled(1, 100));

        assert_eq!(rx.recv().await.unwrap().ply, 1);
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(rx.recv().await.unwrap().ply, 2);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_drops_pending_tickets() {
        let (mut timers, mut rx) = Timers::new();
        timers.schedule(scheduled(0, 100));
        timers.cancel_all();
        assert!(!timers.has_pending());
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
