//! 複数 SGF ファイルの並列解析
//!
//! ファイル単位で rayon のスレッドプールに割り当て、結果は入力ファイル順・
//! ファイル内の行順で連結する。

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use sgf_game_info::{GameInfo, ParseOptions, parse_game_str};

use super::io::{open_reader, read_line_at};

/// 並列数の上限
pub const MAX_WORKERS: usize = 128;

/// バッチ解析の設定
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    pub parse: ParseOptions,
    /// ワーカー数（`None` / 0 なら `min(128, ファイル数 / 2)`）
    pub workers: Option<usize>,
    /// 解析できない行をスキップして続行する（既定は最初の失敗で中断）
    pub lenient: bool,
}

/// 実際に使うワーカー数（最低 1）
pub fn resolve_workers(requested: Option<usize>, n_inputs: usize) -> usize {
    match requested {
        Some(n) if n > 0 => n,
        _ => MAX_WORKERS.min(n_inputs / 2),
    }
    .max(1)
}

/// 1 ファイルの全行を解析する（1 行 1 棋譜、空行は飛ばす）。
///
/// 行番号は物理行の 1 始まり。`lenient` でなければ最初の失敗をそのまま返す。
pub fn read_and_parse_file(path: &Path, opts: &BatchOptions) -> Result<Vec<GameInfo>> {
    let reader = open_reader(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_lines(&path.to_string_lossy(), reader, opts)
}

/// `path` の `line_number` 行目（1 始まり）の棋譜文字列。無ければエラー。
pub fn get_game_str(path: &Path, line_number: usize) -> Result<String> {
    read_line_at(path, line_number)
        .with_context(|| format!("failed to read {}", path.display()))?
        .with_context(|| format!("could not find game at {}:{line_number}", path.display()))
}

fn parse_lines<R: BufRead>(path: &str, reader: R, opts: &BatchOptions) -> Result<Vec<GameInfo>> {
    let mut games = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {path}"))?;
        let sgf = line.trim();
        if sgf.is_empty() {
            continue;
        }
        match parse_game_str(path, idx + 1, sgf, &opts.parse) {
            Ok(info) => games.push(info),
            Err(e) if opts.lenient => {
                log::warn!("skip {path}:{}: {e}", idx + 1);
            }
            Err(e) => return Err(e).with_context(|| format!("failed to parse {path}:{}", idx + 1)),
        }
    }
    Ok(games)
}

/// 全ファイルを並列に解析して連結する。
pub fn read_and_parse_all_files(paths: &[PathBuf], opts: &BatchOptions) -> Result<Vec<GameInfo>> {
    read_and_parse_all_files_with_progress(paths, opts, &ProgressBar::hidden())
}

/// [`read_and_parse_all_files`] の進捗表示付き版（1 ファイルごとに `progress` を進める）。
pub fn read_and_parse_all_files_with_progress(
    paths: &[PathBuf],
    opts: &BatchOptions,
    progress: &ProgressBar,
) -> Result<Vec<GameInfo>> {
    let workers = resolve_workers(opts.workers, paths.len());
    log::debug!("parsing {} files with {workers} workers", paths.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("failed to build rayon thread pool")?;

    let per_file: Vec<Vec<GameInfo>> = pool.install(|| {
        paths
            .par_iter()
            .map(|p| {
                let games = read_and_parse_file(p, opts);
                progress.inc(1);
                games
            })
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(per_file.into_iter().flatten().collect())
}
