//! Static opening content: move tokens with teaching metadata, keyed by id.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use chess_core::{pgn, replay, ReplayError, ReplayOptions};

use crate::error::TrainerError;

/// Opening shown when a requested id is unknown.
pub const DEFAULT_OPENING: &str = "vienna-gambit";

const BUILTIN_CATALOG: &str = include_str!("../data/openings.json");

/// One ply of a line plus what to tell the learner about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveToken {
    #[serde(rename = "move")]
    pub token: String,
    /// Display form, e.g. `"3... exf4"`.
    #[serde(default)]
    pub notation: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

impl MoveToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            notation: String::new(),
            explanation: String::new(),
            evaluation: None,
            alternatives: Vec::new(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub eco: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_result: Option<String>,
    /// Main line for guided playback.
    pub moves: Vec<MoveToken>,
    /// Full game for interactive move matching; may be empty.
    #[serde(default)]
    pub complete_game: Vec<MoveToken>,
}

impl Opening {
    /// Build an opening from the bare token list of a main line.
    pub fn from_tokens(id: &str, title: &str, tokens: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            difficulty: None,
            category: String::new(),
            eco: String::new(),
            game_result: None,
            moves: tokens.iter().map(|t| MoveToken::new(*t)).collect(),
            complete_game: Vec::new(),
        }
    }

    /// Build an opening from PGN text. The movetext becomes both the main line
    /// and the complete game; `Opening`/`Event` and `ECO` headers fill in the
    /// title and ECO code.
    pub fn from_pgn(id: &str, pgn_text: &str) -> Result<Self, TrainerError> {
        let moves: Vec<MoveToken> = pgn::extract_moves(pgn_text)
            .into_iter()
            .enumerate()
            .map(|(ply, token)| {
                let mut mv = MoveToken::new(token.clone());
                mv.notation = notation_for(ply, &token);
                mv
            })
            .collect();

        if moves.is_empty() {
            return Err(TrainerError::Content(format!("PGN for {id:?} has no moves")));
        }

        let title = pgn::extract_header(pgn_text, "Opening")
            .or_else(|| pgn::extract_header(pgn_text, "Event"))
            .unwrap_or_else(|| id.to_string());

        Ok(Self {
            id: id.to_string(),
            title,
            description: String::new(),
            difficulty: None,
            category: String::new(),
            eco: pgn::extract_header(pgn_text, "ECO").unwrap_or_default(),
            game_result: pgn::extract_header(pgn_text, "Result"),
            complete_game: moves.clone(),
            moves,
        })
    }

    pub fn has_complete_game(&self) -> bool {
        !self.complete_game.is_empty()
    }

    pub fn tokens(line: &[MoveToken]) -> Vec<&str> {
        line.iter().map(|m| m.token.as_str()).collect()
    }
}

/// `"1. e4"` / `"1... e5"` style display notation.
pub fn notation_for(ply: usize, token: &str) -> String {
    let number = ply / 2 + 1;
    if ply % 2 == 0 {
        format!("{number}. {token}")
    } else {
        format!("{number}... {token}")
    }
}

/// A token that fails to resolve when its line is replayed strictly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub opening_id: String,
    pub complete_game: bool,
    pub ply: usize,
    pub token: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    openings: Vec<Opening>,
}

impl Catalog {
    /// The openings compiled into the binary.
    pub fn builtin() -> Result<Self, TrainerError> {
        Catalog::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, TrainerError> {
        let openings: Vec<Opening> = serde_json::from_str(json)?;
        let mut catalog = Catalog::default();
        for opening in openings {
            catalog.insert(opening)?;
        }
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let json = fs::read_to_string(path)?;
        Catalog::from_json(&json)
    }

    /// Adds an opening; ids must be non-empty and unique, and the main line
    /// must contain at least one move.
    pub fn insert(&mut self, opening: Opening) -> Result<(), TrainerError> {
        if opening.id.trim().is_empty() {
            return Err(TrainerError::Content("opening id is empty".into()));
        }
        if opening.moves.is_empty() {
            return Err(TrainerError::Content(format!(
                "opening {:?} has no main line",
                opening.id
            )));
        }
        if self.get(&opening.id).is_some() {
            return Err(TrainerError::Content(format!(
                "duplicate opening id {:?}",
                opening.id
            )));
        }
        self.openings.push(opening);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.id == id)
    }

    /// `id` if present, else [`DEFAULT_OPENING`], else the first opening.
    pub fn lookup(&self, id: &str) -> Option<&Opening> {
        self.get(id)
            .or_else(|| self.get(DEFAULT_OPENING))
            .or_else(|| self.openings.first())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.openings.iter().map(|o| o.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opening> {
        self.openings.iter()
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    /// Replays every line fail-fast and reports the first unresolved token of
    /// each line.
    pub fn audit(&self) -> Vec<AuditFinding> {
        let mut findings = Vec::new();
        for opening in &self.openings {
            for (complete_game, line) in [(false, &opening.moves), (true, &opening.complete_game)] {
                if line.is_empty() {
                    continue;
                }
                if let Err(ReplayError::Unresolved { ply, token, source }) =
                    replay(&Opening::tokens(line), ReplayOptions::fail_fast())
                {
                    findings.push(AuditFinding {
                        opening_id: opening.id.clone(),
                        complete_game,
                        ply,
                        token,
                        reason: source.to_string(),
                    });
                }
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 6);
        let vienna = catalog.get("vienna-gambit").unwrap();
        assert_eq!(vienna.eco, "C29");
        assert_eq!(vienna.moves[0].token, "e4");
        assert_eq!(vienna.moves[0].alternatives, vec!["d4", "Nf3", "c4"]);
        assert!(vienna.has_complete_game());
        assert_eq!(vienna.difficulty, Some(Difficulty::Intermediate));
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.lookup("no-such-opening").unwrap().id, DEFAULT_OPENING);
        assert_eq!(catalog.lookup("caro-kann").unwrap().id, "caro-kann");
    }

    #[test]
    fn test_main_lines_pass_audit() {
        let catalog = Catalog::builtin().unwrap();
        let findings = catalog.audit();
        assert!(
            findings.iter().all(|f| f.complete_game),
            "main lines should replay cleanly: {findings:?}"
        );
    }

    #[test]
    fn test_audit_reports_first_bad_token_of_complete_game() {
        let catalog = Catalog::builtin().unwrap();
        let finding = catalog
            .audit()
            .into_iter()
            .find(|f| f.opening_id == "vienna-gambit")
            .unwrap();
        assert!(finding.complete_game);
        assert_eq!((finding.ply, finding.token.as_str()), (28, "c3"));
    }

    #[test]
    fn test_insert_rejects_duplicates_and_empty_lines() {
        let mut catalog = Catalog::default();
        catalog.insert(Opening::from_tokens("a", "A", &["e4"])).unwrap();
        assert!(catalog.insert(Opening::from_tokens("a", "A again", &["d4"])).is_err());
        assert!(catalog.insert(Opening::from_tokens("b", "B", &[])).is_err());
        assert!(catalog.insert(Opening::from_tokens(" ", "blank", &["e4"])).is_err());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_from_json_minimal_fields() {
        let json = r#"[{"id": "x", "title": "X", "moves": [{"move": "d4"}]}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let x = catalog.get("x").unwrap();
        assert_eq!(x.moves, vec![MoveToken::new("d4")]);
        assert!(!x.has_complete_game());
        assert!(Catalog::from_json("{not json").is_err());
    }

    #[test]
    fn test_from_pgn_uses_headers() {
        let pgn = r#"[Event "Casual"]
[Opening "Italian Game"]
[ECO "C50"]
[Result "*"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 *"#;
        let opening = Opening::from_pgn("italian", pgn).unwrap();
        assert_eq!(opening.title, "Italian Game");
        assert_eq!(opening.eco, "C50");
        assert_eq!(opening.moves.len(), 5);
        assert_eq!(opening.moves[1].notation, "1... e5");
        assert_eq!(opening.moves[4].notation, "3. Bc4");
        assert_eq!(opening.complete_game, opening.moves);
        assert!(Opening::from_pgn("empty", "[Event \"x\"]").is_err());
    }
}
