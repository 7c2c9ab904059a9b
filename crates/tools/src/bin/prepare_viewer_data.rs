//! SGF ビューア公開用データの準備
//!
//! コンテンツ設定の各セクションについて、リモートから棋譜を取得し、
//! `game_infos.csv` を書き出してから棋譜を匿名化する。
//!
//! `~/.ssh/config` で各サーバにパスワード無しで `ssh` できる必要がある。
//!
//! ```bash
//! cargo run -p tools --bin prepare_viewer_data -- --content src/content.ts --public-dir public/sgfs
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sgf_game_info::{GameInfo, GameRecord, ParseOptions};
use tools::common::batch::{BatchOptions, read_and_parse_all_files};
use tools::common::content::{Section, load_content_config};
use tools::common::csv_sink::write_csv_file;
use tools::common::discover::{DEFAULT_MAX_SCAN_LENGTH, find_sgf_files};
use tools::common::redact::redact_file;
use tools::common::staging::{CommandRunner, stage_section};

const GAME_INFOS_FILE: &str = "game_infos.csv";

#[derive(Parser, Debug)]
#[command(author, version, about = "Stage, summarize and redact SGF files for the viewer")]
struct Cli {
    /// ページ / セクション定義（.json / .toml / .yaml / .ts）
    #[arg(long, default_value = "src/content.ts")]
    content: PathBuf,

    /// 出力先（実行のたびに作り直す）
    #[arg(long, default_value = "public/sgfs")]
    public_dir: PathBuf,

    /// コマンドを表示するだけで実行しない
    #[arg(long)]
    dry_run: bool,

    /// victim 色が決まらない行はスキップする
    #[arg(long)]
    lenient: bool,

    /// 並列数
    #[arg(long)]
    workers: Option<usize>,
}

fn reset_dir(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}

fn process_section(section: &Section, section_path: &Path, cli: &Cli, runner: &CommandRunner) -> Result<()> {
    let staged = stage_section(section, section_path, runner)
        .with_context(|| format!("failed to stage section '{}'", section.title))?;
    log::info!("section '{}': staged {staged} entries", section.title);
    if cli.dry_run {
        return Ok(());
    }

    let sgf_paths = find_sgf_files(section_path, DEFAULT_MAX_SCAN_LENGTH);
    let opts = BatchOptions {
        parse: ParseOptions {
            fast_parse: true,
            ..ParseOptions::default()
        },
        workers: cli.workers,
        lenient: cli.lenient,
    };
    let games = read_and_parse_all_files(&sgf_paths, &opts)?;
    if games.is_empty() {
        eprintln!("section '{}': no games found", section.title);
    } else {
        let records: Vec<GameRecord> = games.iter().map(GameRecord::from).collect();
        write_csv_file(&section_path.join(GAME_INFOS_FILE), &records)?;
    }

    let mut by_path: HashMap<&str, Vec<GameInfo>> = HashMap::new();
    for game in &games {
        by_path.entry(game.sgf_path.as_str()).or_default().push(game.clone());
    }
    for path in &sgf_paths {
        // 1 局も解析できなかったファイルも名前とコメントは落とす
        let key = path.to_string_lossy();
        let file_games = by_path.get(&*key).map(Vec::as_slice).unwrap_or_default();
        redact_file(path, file_games)?;
    }
    eprintln!(
        "section '{}': {} games from {} files",
        section.title,
        games.len(),
        sgf_paths.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let pages = load_content_config(&cli.content)?;
    let runner = CommandRunner::new(cli.dry_run);

    if cli.dry_run {
        log::info!("Would recreate {}", cli.public_dir.display());
    } else if cli.public_dir.exists() {
        fs::remove_dir_all(&cli.public_dir)
            .with_context(|| format!("failed to remove {}", cli.public_dir.display()))?;
    }

    for (page_path, page) in &pages {
        log::info!("page {page_path}: {} sections", page.content.len());
        for section in &page.content {
            let section_path = cli.public_dir.join(&section.dir_name);
            if !cli.dry_run {
                reset_dir(&section_path)?;
            }
            process_section(section, &section_path, &cli, &runner)?;
        }
    }
    Ok(())
}
