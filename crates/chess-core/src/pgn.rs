//! PGN movetext utilities: lightweight regex-based extraction.

use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid header pattern"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|;[^\n]*").expect("valid comment pattern"));

static VARIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("valid variation pattern"));

static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.+").expect("valid move number pattern"));

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:O-O-O|O-O|0-0-0|0-0|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?)[+#]?[!?]*$",
    )
    .expect("valid move pattern")
});

/// Extract SAN move tokens from PGN text (after removing headers, comments,
/// variations, move numbers and results).
///
/// `0-0` castling is only recognized when it is not part of a result such as
/// `1-0`.
pub fn extract_moves(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_RE.replace_all(pgn, " ");
    let no_comments = COMMENT_RE.replace_all(&no_headers, " ");

    // Nested variations are removed innermost first.
    let mut text = no_comments.into_owned();
    loop {
        let next = VARIATION_RE.replace_all(&text, " ").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    text.split_whitespace()
        .filter(|word| !is_result(word))
        .map(|word| MOVE_NUMBER_RE.replace(word, ""))
        .filter(|word| MOVE_RE.is_match(word))
        .map(|word| word.into_owned())
        .collect()
}

fn is_result(word: &str) -> bool {
    matches!(word, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Extract a string value from a PGN header (e.g. `Opening`, `ECO`).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().to_string();
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_moves_basic() {
        let pgn = r#"[White "Player1"]
[Black "Player2"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0"#;

        let moves = extract_moves(pgn);
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
    }

    #[test]
    fn test_extract_moves_skips_comments_and_variations() {
        let pgn = "1.e4 {best by test} e5 (1...c5 2.Nf3 (2.c3 d5)) 2.Nf3 ; a comment\n2...Nc6 3.O-O-O?! 0-1";
        assert_eq!(extract_moves(pgn), vec!["e4", "e5", "Nf3", "Nc6", "O-O-O?!"]);
    }

    #[test]
    fn test_results_are_not_castling() {
        assert_eq!(extract_moves("1. d4 d5 0-1"), vec!["d4", "d5"]);
        assert_eq!(extract_moves("1. e4 e5 2. 0-0 1/2-1/2"), vec!["e4", "e5", "0-0"]);
    }

    #[test]
    fn test_extract_header() {
        let pgn = r#"[Opening "Vienna Gambit"]
[ECO "C29"]
[Site ""]"#;

        assert_eq!(extract_header(pgn, "Opening"), Some("Vienna Gambit".to_string()));
        assert_eq!(extract_header(pgn, "ECO"), Some("C29".to_string()));
        assert_eq!(extract_header(pgn, "Site"), None);
        assert_eq!(extract_header(pgn, "Missing"), None);
    }
}
