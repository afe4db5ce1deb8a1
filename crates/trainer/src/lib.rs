//! Interactive opening trainer: a catalog of annotated opening lines, a
//! teaching session that steps through them or asks the learner to find each
//! move, and the timers that pace it.

pub mod command;
pub mod config;
pub mod content;
pub mod error;
pub mod runtime;
pub mod schedule;
pub mod session;
pub mod view;

pub use command::{Command, HELP};
pub use config::{OutputFormat, TrainerConfig};
pub use content::{AuditFinding, Catalog, MoveToken, Opening, DEFAULT_OPENING};
pub use error::TrainerError;
pub use runtime::Timers;
pub use schedule::{Scheduled, TaskKind, Ticket, Timing};
pub use session::{HumanSide, Outcome, PlaybackMode, Session, SessionConfig, Update};
pub use view::{present, render, Snapshot};

/// Build the catalog a configuration asks for: the JSON file at
/// `catalog_path` or the built-in openings, plus the PGN at `pgn_path` if
/// set. The PGN opening takes its id from the file stem.
pub fn load_catalog(config: &TrainerConfig) -> Result<Catalog, TrainerError> {
    let mut catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };

    if let Some(path) = &config.pgn_path {
        let text = std::fs::read_to_string(path)?;
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("pgn")
            .to_string();
        catalog.insert(Opening::from_pgn(&id, &text)?)?;
    }

    if catalog.is_empty() {
        return Err(TrainerError::Content("catalog has no openings".into()));
    }
    Ok(catalog)
}
