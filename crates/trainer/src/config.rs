//! Trainer configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chess_core::{ReplayOptions, TurnTracking, UnresolvedPolicy};

use crate::content::DEFAULT_OPENING;
use crate::error::TrainerError;
use crate::schedule::Timing;
use crate::session::{HumanSide, SessionConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON snapshot per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {other:?}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Opening to start with
    pub opening: String,

    /// JSON catalog replacing the built-in openings
    pub catalog_path: Option<PathBuf>,

    /// PGN file added to the catalog as an extra opening
    pub pgn_path: Option<PathBuf>,

    pub timing: Timing,

    pub replay: ReplayOptions,

    pub human: HumanSide,

    pub output: OutputFormat,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            opening: DEFAULT_OPENING.to_string(),
            catalog_path: None,
            pgn_path: None,
            timing: Timing::default(),
            replay: ReplayOptions::default(),
            human: HumanSide::default(),
            output: OutputFormat::default(),
        }
    }
}

impl TrainerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, TrainerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Unset keys take
    /// their defaults; set but malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TrainerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TrainerConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let opening = get("TRAINER_OPENING")
            .map(|v| v.trim().to_string())
            .unwrap_or(defaults.opening);

        let catalog_path = get("TRAINER_CATALOG").map(PathBuf::from);
        let pgn_path = get("TRAINER_PGN").map(PathBuf::from);

        let timing = Timing {
            explanation_delay: millis(
                "TRAINER_EXPLANATION_MS",
                get("TRAINER_EXPLANATION_MS"),
                defaults.timing.explanation_delay,
            )?,
            reply_delay: millis(
                "TRAINER_REPLY_MS",
                get("TRAINER_REPLY_MS"),
                defaults.timing.reply_delay,
            )?,
            autoplay_interval: millis(
                "TRAINER_AUTOPLAY_MS",
                get("TRAINER_AUTOPLAY_MS"),
                defaults.timing.autoplay_interval,
            )?,
        };

        let replay = ReplayOptions {
            on_unresolved: parsed::<UnresolvedPolicy>(
                "TRAINER_UNRESOLVED",
                get("TRAINER_UNRESOLVED"),
            )?
            .unwrap_or_default(),
            turns: parsed::<TurnTracking>("TRAINER_TURNS", get("TRAINER_TURNS"))?
                .unwrap_or_default(),
        };

        let human = parsed::<HumanSide>("TRAINER_HUMAN", get("TRAINER_HUMAN"))?.unwrap_or_default();
        let output =
            parsed::<OutputFormat>("TRAINER_OUTPUT", get("TRAINER_OUTPUT"))?.unwrap_or_default();

        Ok(Self {
            opening,
            catalog_path,
            pgn_path,
            timing,
            replay,
            human,
            output,
        })
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            timing: self.timing,
            replay: self.replay,
            human: self.human,
        }
    }
}

fn parsed<T>(key: &'static str, value: Option<String>) -> Result<Option<T>, TrainerError>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| TrainerError::Config {
                key,
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn millis(
    key: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, TrainerError> {
    Ok(parsed::<u64>(key, value)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}
