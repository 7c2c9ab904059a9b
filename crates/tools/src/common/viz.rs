//! SGF ビューアへのリンク生成

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use url::Url;

use super::batch::get_game_str;

pub const VIEWER_BASE: &str = "https://humancompatibleai.github.io/sgf-viewer/";

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"C\[.*?\]").expect("invalid COMMENT_RE pattern"));

/// コメント `C[...]` を取り除く（最初の `]` まで）
pub fn minimize_game_str(game: &str) -> String {
    COMMENT_RE.replace_all(game, "").into_owned()
}

/// 棋譜文字列をビューア URL の `#sgf=` フラグメントに埋め込む
pub fn viewer_url(game: &str) -> Result<Url> {
    let mut url = Url::parse(VIEWER_BASE).context("invalid viewer base URL")?;
    url.set_fragment(Some(&format!("sgf={game}")));
    Ok(url)
}

/// `path:line_number` の棋譜を開くビューアのリンク
pub fn viz_link(path: &Path, line_number: usize, minimize: bool) -> Result<String> {
    let game = get_game_str(path, line_number)?;
    let game = if minimize { minimize_game_str(&game) } else { game };
    Ok(viewer_url(&game)?.into())
}
