//! prepare_viewer_data の dry-run と、取得済みディレクトリに対する抽出 + 匿名化

use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

use sgf_game_info::{GameRecord, ParseOptions};
use tools::common::batch::{BatchOptions, read_and_parse_all_files};
use tools::common::csv_sink::write_csv_file;
use tools::common::discover::{DEFAULT_MAX_SCAN_LENGTH, find_sgf_files};
use tools::common::redact::redact_file;

const CONTENT: &str = r#"{
  "/cyclic": {
    "content": [
      {
        "server": "viewer-host.invalid",
        "title": "Cyclic adversary",
        "max_games": 2,
        "dir_name": "cyclic",
        "paths": ["/games/a.sgf", "/games/b.sgf", "/games/c.sgf"]
      }
    ]
  }
}"#;

#[test]
fn dry_run_touches_nothing() {
    let td = tempdir().unwrap();
    let content = td.path().join("content.json");
    fs::write(&content, CONTENT).unwrap();
    let public = td.path().join("public/sgfs");
    fs::create_dir_all(&public).unwrap();
    fs::write(public.join("keep.txt"), "x").unwrap();

    let mut cmd = Command::cargo_bin("prepare_viewer_data").unwrap();
    cmd.arg("--content").arg(&content).arg("--public-dir").arg(&public).arg("--dry-run");
    cmd.assert().success();

    assert!(public.join("keep.txt").exists());
    assert!(!public.join("cyclic").exists());
}

#[test]
fn missing_content_config_fails() {
    let td = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("prepare_viewer_data").unwrap();
    cmd.arg("--content").arg(td.path().join("nope.json")).arg("--dry-run");
    cmd.assert().failure();
}

#[test]
fn staged_section_is_summarized_and_redacted() {
    let td = tempdir().unwrap();
    let section = td.path().join("cyclic");
    fs::create_dir_all(section.join("run1")).unwrap();
    fs::write(
        section.join("run1/games.sgfs"),
        "(;GM[1]SZ[19]PB[adv-s9-d1]PW[victim]BR[v600]C[x];B[dd])\n\
         (;GM[1]SZ[19]PB[bot-b40]PW[adv-s9-d1]WR[v600];B[dd])\n",
    )
    .unwrap();

    let paths = find_sgf_files(&section, DEFAULT_MAX_SCAN_LENGTH);
    let opts = BatchOptions {
        parse: ParseOptions {
            fast_parse: true,
            ..ParseOptions::default()
        },
        ..BatchOptions::default()
    };
    let games = read_and_parse_all_files(&paths, &opts).unwrap();
    let records: Vec<GameRecord> = games.iter().map(GameRecord::from).collect();
    write_csv_file(&section.join("game_infos.csv"), &records).unwrap();
    redact_file(&paths[0], &games).unwrap();

    let csv_text = fs::read_to_string(section.join("game_infos.csv")).unwrap();
    assert_eq!(csv_text.lines().count(), 3);
    assert!(!csv_text.lines().next().unwrap().contains("num_b_pass"));

    let redacted = fs::read_to_string(&paths[0]).unwrap();
    let lines: Vec<_> = redacted.lines().collect();
    assert_eq!(lines[0], "(;GM[1]SZ[19]PB[Adversary]PW[Victim];B[dd])");
    assert_eq!(lines[1], "(;GM[1]SZ[19]PB[Victim]PW[Adversary];B[dd])");
}

#[test]
fn file_without_parsed_games_is_still_redacted() {
    let td = tempdir().unwrap();
    let path = td.path().join("unlabelled.sgf");
    fs::write(&path, "(;GM[1]PB[alice]PW[carol]WR[v900]C[private];B[dd])\n").unwrap();

    let opts = BatchOptions {
        lenient: true,
        ..BatchOptions::default()
    };
    let games = read_and_parse_all_files(std::slice::from_ref(&path), &opts).unwrap();
    assert!(games.is_empty());
    redact_file(&path, &games).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "(;GM[1]PB[Unknown]PW[Unknown];B[dd])\n"
    );
}
