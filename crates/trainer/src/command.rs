//! Line-oriented commands for the terminal front end.

use std::str::FromStr;

use chess_core::Square;

use crate::error::TrainerError;
use crate::session::{Session, Update};

pub const HELP: &str = "\
Commands:
  next | n              step forward (main line)
  prev | p              step back (main line)
  jump <move>           jump to a ply, counting from 1
  end                   jump to the last ply
  auto                  toggle autoplay
  mode                  switch between main line and complete game
  reset                 start the line again
  click <square>        select or move a piece, e.g. `click e2`
  move <san> | <san>    submit a move, e.g. `Nf3`
  open <id>             switch opening
  list                  list openings
  show                  print the board again
  help                  this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// Zero-based ply index.
    Jump(usize),
    End,
    ToggleAutoplay,
    ToggleMode,
    Reset,
    Click(Square),
    Submit(String),
    Open(String),
    List,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = TrainerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(Command::Show);
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(TrainerError::Command(format!("too many arguments: {line:?}")));
        }

        let command = match (head.to_ascii_lowercase().as_str(), arg) {
            ("next" | "n", None) => Command::Next,
            ("prev" | "p" | "back", None) => Command::Previous,
            ("end", None) => Command::End,
            ("auto" | "play", None) => Command::ToggleAutoplay,
            ("mode", None) => Command::ToggleMode,
            ("reset" | "r", None) => Command::Reset,
            ("list" | "ls", None) => Command::List,
            ("show", None) => Command::Show,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit" | "q", None) => Command::Quit,
            ("jump" | "goto", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::Jump(n - 1),
                _ => return Err(TrainerError::Command(format!("bad move number {n:?}"))),
            },
            ("click", Some(sq)) => Command::Click(
                sq.parse()
                    .map_err(|_| TrainerError::Command(format!("bad square {sq:?}")))?,
            ),
            ("move" | "submit", Some(san)) => Command::Submit(san.to_string()),
            ("open", Some(id)) => Command::Open(id.to_string()),
            // A lone token is a move attempt.
            (_, None) => Command::Submit(head.to_string()),
            (other, Some(_)) => {
                return Err(TrainerError::Command(format!("unknown command {other:?}")))
            }
        };
        Ok(command)
    }
}

impl Command {
    /// Run a session command. Commands the front end answers itself
    /// (listing, opening switches, help, quitting) return `None`.
    pub fn apply(&self, session: &mut Session) -> Option<Update> {
        let update = match self {
            Command::Next => session.next(),
            Command::Previous => session.previous(),
            Command::Jump(ply) => session.jump_to(*ply),
            Command::End => session.jump_to_end(),
            Command::ToggleAutoplay => session.toggle_autoplay(),
            Command::ToggleMode => session.toggle_mode(),
            Command::Reset => session.reset(),
            Command::Click(sq) => session.click(*sq),
            Command::Submit(san) => session.submit(san),
            Command::Open(_) | Command::List | Command::Show | Command::Help | Command::Quit => {
                return None
            }
        };
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Opening;
    use crate::session::{Outcome, SessionConfig};

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("next"), Command::Next);
        assert_eq!(parse("  P "), Command::Previous);
        assert_eq!(parse("jump 3"), Command::Jump(2));
        assert_eq!(parse("click e2"), Command::Click("e2".parse().unwrap()));
        assert_eq!(parse("move O-O"), Command::Submit("O-O".into()));
        assert_eq!(parse("Nf3"), Command::Submit("Nf3".into()));
        assert_eq!(parse("open ruy-lopez"), Command::Open("ruy-lopez".into()));
        assert_eq!(parse(""), Command::Show);
    }

    #[test]
    fn test_parse_errors() {
        assert!("jump 0".parse::<Command>().is_err());
        assert!("jump x".parse::<Command>().is_err());
        assert!("click z9".parse::<Command>().is_err());
        assert!("fly to e4".parse::<Command>().is_err());
        assert!("frobnicate e4".parse::<Command>().is_err());
    }

    #[test]
    fn test_apply_routes_to_session() {
        let opening = Opening::from_tokens("t", "T", &["e4", "e5", "Nf3"]);
        let mut session = Session::new(opening, SessionConfig::default());
        let update = Command::End.apply(&mut session).unwrap();
        assert_eq!(update.outcome, Outcome::Moved { ply: 2 });
        assert_eq!(Command::List.apply(&mut session), None);
    }
}
