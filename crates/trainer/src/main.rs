//! Terminal opening trainer
//!
//! Reads commands from stdin, prints the board after every change, and
//! drives the session's delayed transitions with tokio timers.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use trainer::{
    load_catalog, present, Catalog, Command, OutputFormat, Outcome, Session, Timers,
    TrainerConfig, TrainerError, Update, HELP,
};

fn print_snapshot(session: &Session, output: OutputFormat) {
    println!("{}", present(session, output));
}

fn print_catalog(catalog: &Catalog) {
    for opening in catalog.iter() {
        let game = if opening.has_complete_game() {
            format!(", complete game {} plies", opening.complete_game.len())
        } else {
            String::new()
        };
        println!(
            "{:<18} {} ({} plies{game})",
            opening.id,
            opening.title,
            opening.moves.len()
        );
    }
}

fn audit(catalog: &Catalog) {
    for finding in catalog.audit() {
        warn!(
            opening = %finding.opening_id,
            complete_game = finding.complete_game,
            ply = finding.ply,
            token = %finding.token,
            reason = %finding.reason,
            "Line does not replay cleanly"
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = TrainerConfig::from_env()?;
    let catalog = load_catalog(&config)?;
    info!(openings = catalog.len(), "Catalog loaded");
    audit(&catalog);

    let opening = catalog
        .lookup(&config.opening)
        .cloned()
        .ok_or_else(|| TrainerError::UnknownOpening(config.opening.clone()))?;
    if opening.id != config.opening {
        warn!(requested = %config.opening, using = %opening.id, "Unknown opening, falling back");
    }

    let mut session = Session::new(opening, config.session());
    let (mut timers, mut tickets) = Timers::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_snapshot(&session, config.output);

    loop {
        let update: Update = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => {
                        println!("{HELP}");
                        continue;
                    }
                    Ok(Command::List) => {
                        print_catalog(&catalog);
                        continue;
                    }
                    Ok(Command::Show) => {
                        print_snapshot(&session, config.output);
                        continue;
                    }
                    Ok(Command::Open(id)) => match catalog.get(&id) {
                        Some(opening) => session.select_opening(opening.clone()),
                        None => {
                            println!("{}", TrainerError::UnknownOpening(id));
                            continue;
                        }
                    },
                    Ok(command) => match command.apply(&mut session) {
                        Some(update) => update,
                        None => continue,
                    },
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                }
            }
            Some(ticket) = tickets.recv() => session.fire(ticket),
        };

        timers.apply(&update);
        if update.outcome != Outcome::Stale {
            print_snapshot(&session, config.output);
        }
    }

    info!("Bye");
    Ok(())
}
