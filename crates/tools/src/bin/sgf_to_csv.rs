//! SGF 棋譜から対局情報を一括抽出して CSV / JSONL に書き出す
//!
//! # 使用例
//!
//! ```bash
//! # ディレクトリ以下の .sgf / .sgfs をまとめて CSV に
//! cargo run -p tools --bin sgf_to_csv -- runs/attack-vs-kata --out game_infos.csv
//!
//! # 特定ファイルだけを JSON lines で標準出力へ
//! cargo run -p tools --bin sgf_to_csv -- runs/a/game.sgfs --jsonl --out -
//! ```

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sgf_game_info::{Color, GameRecord, ParseOptions};
use tools::common::batch::{BatchOptions, read_and_parse_all_files_with_progress};
use tools::common::csv_sink::{write_csv_file, write_jsonl_file};
use tools::common::discover::{DEFAULT_MAX_SCAN_LENGTH, find_sgf_files};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract victim/adversary game info from SGF files into CSV")]
struct Cli {
    /// 探索するディレクトリ、または SGF ファイル
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// 出力先（`-` で標準出力、`.gz` で圧縮）
    #[arg(long, default_value = "game_infos.csv")]
    out: PathBuf,

    /// CSV の代わりに 1 行 1 JSON で出力
    #[arg(long)]
    jsonl: bool,

    /// パス回数の集計を省略する
    #[arg(long)]
    fast_parse: bool,

    /// victim 色を明示する（b / w）
    #[arg(long)]
    victim_color: Option<Color>,

    /// victim 色が決まらない棋譜もエラーにしない
    #[arg(long)]
    no_victim_okay: bool,

    /// adversary 判定用の部分文字列（カンマ区切り）
    #[arg(long, value_delimiter = ',')]
    adversary_substrings: Option<Vec<String>>,

    /// victim 判定用の部分文字列（カンマ区切り）
    #[arg(long, value_delimiter = ',')]
    victim_substrings: Option<Vec<String>>,

    /// 並列数（0 / 省略で min(128, ファイル数 / 2)）
    #[arg(long)]
    workers: Option<usize>,

    /// 解析できない行を警告してスキップ
    #[arg(long)]
    lenient: bool,

    /// 走査するディレクトリ数の上限
    #[arg(long, default_value_t = DEFAULT_MAX_SCAN_LENGTH)]
    max_scan_length: usize,

    /// 進捗バーを表示しない
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn batch_options(&self) -> BatchOptions {
        let mut parse = ParseOptions {
            fast_parse: self.fast_parse,
            victim_color: self.victim_color,
            no_victim_okay: self.no_victim_okay,
            ..ParseOptions::default()
        };
        if let Some(subs) = &self.adversary_substrings {
            parse.adversary_substrings = subs.clone();
        }
        if let Some(subs) = &self.victim_substrings {
            parse.victim_substrings = subs.clone();
        }
        BatchOptions {
            parse,
            workers: self.workers,
            lenient: self.lenient,
        }
    }

    fn collect_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                let found = find_sgf_files(input, self.max_scan_length);
                log::info!("found {} SGF files under {}", found.len(), input.display());
                paths.extend(found);
            } else {
                paths.push(input.clone());
            }
        }
        paths
    }
}

fn progress_bar(len: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files")
            .expect("valid template"),
    );
    pb
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let paths = cli.collect_paths();
    if paths.is_empty() {
        bail!("no SGF files found");
    }

    let opts = cli.batch_options();
    let pb = progress_bar(paths.len(), cli.no_progress);
    let games = read_and_parse_all_files_with_progress(&paths, &opts, &pb)?;
    pb.finish_and_clear();

    if games.is_empty() {
        bail!("no games parsed from {} files", paths.len());
    }
    let records: Vec<GameRecord> = games.iter().map(GameRecord::from).collect();
    if cli.jsonl {
        write_jsonl_file(&cli.out, &records)?;
    } else {
        write_csv_file(&cli.out, &records)?;
    }

    eprintln!("Files: {}", paths.len());
    eprintln!("Games: {}", records.len());
    if cli.out.as_os_str() != "-" {
        eprintln!("Wrote {}", cli.out.display());
    }
    Ok(())
}
