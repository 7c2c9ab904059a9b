//! 公開用の SGF 匿名化
//!
//! ランク（BR / WR）とコメント（C）を落とし、対局者名を `Victim` / `Adversary`
//! に置き換える。抽出と同じ `TAG[value]` 記法を扱うが、こちらは書き換え専用。

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use sgf_game_info::{Color, GameInfo};

use super::io::{open_reader, open_writer};

pub const VICTIM_LABEL: &str = "Victim";
pub const ADVERSARY_LABEL: &str = "Adversary";

static STRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:BR|WR|C)\[[^\]]*\]").expect("invalid STRIP_RE pattern")
});
static BLACK_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PB\[[^\]]*\]").expect("invalid BLACK_NAME_RE pattern"));
static WHITE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PW\[[^\]]*\]").expect("invalid WHITE_NAME_RE pattern"));

/// Redaction errors
#[derive(thiserror::Error, Debug)]
pub enum RedactError {
    /// victim 色が未確定のレコードは名前を置き換えられない
    #[error("cannot redact {path}:{line_number}: victim color is unknown")]
    MissingVictim { path: String, line_number: usize },

    #[error("failed to rewrite {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 対応するレコードが無い行（解析に失敗してスキップされた行など）の対局者名
pub const UNKNOWN_LABEL: &str = "Unknown";

fn label(color: Color, victim_color: Color) -> &'static str {
    if color == victim_color {
        VICTIM_LABEL
    } else {
        ADVERSARY_LABEL
    }
}

fn redact_with_labels(text: &str, black_label: &str, white_label: &str) -> String {
    let stripped = STRIP_RE.replace_all(text, "");
    let black = format!("PB[{black_label}]");
    let white = format!("PW[{white_label}]");
    let named = BLACK_NAME_RE.replace_all(&stripped, NoExpand(&black));
    WHITE_NAME_RE.replace_all(&named, NoExpand(&white)).into_owned()
}

/// 1 棋譜分のテキストを匿名化する。
pub fn redact_sgf(text: &str, victim_color: Color) -> String {
    redact_with_labels(
        text,
        label(Color::Black, victim_color),
        label(Color::White, victim_color),
    )
}

/// victim 色が分からない棋譜の匿名化。ランクとコメントを落とし、両者とも
/// [`UNKNOWN_LABEL`] にする。
pub fn redact_sgf_unlabeled(text: &str) -> String {
    redact_with_labels(text, UNKNOWN_LABEL, UNKNOWN_LABEL)
}

/// 行末の改行（`\r\n` / `\n` / なし）を本文から切り離す
fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// ファイルをその場で匿名化する。
///
/// `games` はこのファイルから抽出したレコードで、各行は `sgf_line` が一致する
/// レコードの victim 色で書き換える。対応するレコードが無い空でない行は
/// [`redact_sgf_unlabeled`] で書き換える。改行コードと末尾改行の有無は保つ。
pub fn redact_file(path: &Path, games: &[GameInfo]) -> Result<(), RedactError> {
    let path_str = path.to_string_lossy().into_owned();
    let io_err = |source: std::io::Error| RedactError::Io {
        path: path_str.clone(),
        source,
    };

    let mut text = String::new();
    open_reader(path).map_err(io_err)?.read_to_string(&mut text).map_err(io_err)?;

    let by_line: HashMap<usize, &GameInfo> = games.iter().map(|g| (g.sgf_line, g)).collect();
    let mut rewritten = String::with_capacity(text.len());
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_number = idx + 1;
        let (body, ending) = split_line_ending(line);
        match by_line.get(&line_number) {
            Some(game) => {
                let victim = game.victim_color.ok_or_else(|| RedactError::MissingVictim {
                    path: path_str.clone(),
                    line_number,
                })?;
                rewritten.push_str(&redact_sgf(body, victim));
            }
            None if body.trim().is_empty() => rewritten.push_str(body),
            None => {
                log::warn!("{path_str}:{line_number} has no parsed record; redacting names as {UNKNOWN_LABEL}");
                rewritten.push_str(&redact_sgf_unlabeled(body));
            }
        }
        rewritten.push_str(ending);
    }

    let mut out = open_writer(path).map_err(io_err)?;
    out.write_all(rewritten.as_bytes()).map_err(io_err)?;
    out.close().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgf_game_info::{ParseOptions, parse_game_str};

    const GAME: &str = "(;GM[1]SZ[19]PB[adv-s100-d50]PW[victim-b40]BR[v600]WR[v1600, algo=MCTS]\
C[startTurnIdx=0]RE[W+3.5];B[dd]C[note];W[pp])";

    #[test]
    fn test_redact_sgf() {
        let out = redact_sgf(GAME, Color::White);
        assert_eq!(out, "(;GM[1]SZ[19]PB[Adversary]PW[Victim]RE[W+3.5];B[dd];W[pp])");

        let out = redact_sgf(GAME, Color::Black);
        assert!(out.contains("PB[Victim]PW[Adversary]"));
    }

    #[test]
    fn test_redact_file_uses_each_lines_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.sgfs");
        let swapped = "(;GM[1]SZ[19]PB[victim]PW[adv]RE[B+1.5];B[dd])";
        std::fs::write(&path, format!("{GAME}\n{swapped}\n")).unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let games: Vec<_> = [GAME, swapped]
            .iter()
            .enumerate()
            .map(|(i, l)| parse_game_str(&path_str, i + 1, l, &ParseOptions::default()).unwrap())
            .collect();
        redact_file(&path, &games).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].contains("PB[Adversary]PW[Victim]"));
        assert!(lines[1].contains("PB[Victim]PW[Adversary]"));
        assert!(!text.contains("BR["));
        assert!(!text.contains("C["));
    }

    #[test]
    fn test_unparsed_lines_are_still_redacted() {
        use crate::common::batch::{BatchOptions, read_and_parse_all_files};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.sgfs");
        let labelled = "(;GM[1]PB[adv]PW[victim]C[secret];B[dd])";
        let unlabelled = "(;GM[1]PB[alice-real]PW[carol-real]BR[v600]C[secret];B[dd])";
        std::fs::write(&path, format!("{labelled}\n{unlabelled}\n")).unwrap();

        let opts = BatchOptions {
            lenient: true,
            ..BatchOptions::default()
        };
        let games = read_and_parse_all_files(std::slice::from_ref(&path), &opts).unwrap();
        assert_eq!(games.len(), 1);
        redact_file(&path, &games).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "(;GM[1]PB[Adversary]PW[Victim];B[dd])\n(;GM[1]PB[Unknown]PW[Unknown];B[dd])\n"
        );
        for leaked in ["alice-real", "carol-real", "secret", "BR["] {
            assert!(!text.contains(leaked), "{leaked} left in {text}");
        }
    }

    #[test]
    fn test_redact_file_keeps_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.sgf");
        let line = "(;GM[1]PB[adv]PW[victim]C[x];B[dd])";
        std::fs::write(&path, format!("{line}\r\n\r\n{line}")).unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let games: Vec<_> = [1, 3]
            .iter()
            .map(|&n| parse_game_str(&path_str, n, line, &ParseOptions::default()).unwrap())
            .collect();
        redact_file(&path, &games).unwrap();

        let redacted = "(;GM[1]PB[Adversary]PW[Victim];B[dd])";
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("{redacted}\r\n\r\n{redacted}")
        );
    }

    #[test]
    fn test_redact_file_requires_victim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.sgf");
        let line = "(;GM[1]PB[alice]PW[carol];B[dd])";
        std::fs::write(&path, format!("{line}\n")).unwrap();
        let opts = ParseOptions {
            no_victim_okay: true,
            ..ParseOptions::default()
        };
        let game = parse_game_str("g.sgf", 1, line, &opts).unwrap();
        let err = redact_file(&path, &[game]).unwrap_err();
        assert!(matches!(err, RedactError::MissingVictim { line_number: 1, .. }));
        // 失敗時はファイルを書き換えない
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{line}\n"));
    }
}
