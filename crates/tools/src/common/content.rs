//! ビューア用コンテンツ設定
//!
//! ページ名 → セクション一覧。各セクションはどのサーバのどのパスから何局まで
//! 取ってくるかを持つ。拡張子で JSON / TOML / YAML を切り替え、`.ts` は
//! 先頭の `{` から末尾の `}` までを JSON として読む。

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// 1 セクション分の取得設定
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Section {
    /// ssh / scp の接続先
    pub server: String,
    pub title: String,
    pub max_games: usize,
    /// 出力先のサブディレクトリ名
    pub dir_name: String,
    /// `.sgf` を含むものはファイル、それ以外はディレクトリとして扱う
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Page {
    #[serde(default)]
    pub content: Vec<Section>,
}

pub type ContentConfig = BTreeMap<String, Page>;

fn extract_ts_object(data: &str) -> Option<&str> {
    let start = data.find('{')?;
    let end = data.rfind('}')?;
    (start < end).then(|| &data[start..=end])
}

/// 拡張子に応じて設定を読み込む
pub fn load_content_config<P: AsRef<Path>>(path: P) -> Result<ContentConfig> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_content_config(&data, path)
}

fn parse_content_config(data: &str, path: &Path) -> Result<ContentConfig> {
    let ext = path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase());
    let parsed: ContentConfig = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(data)?,
        Some("toml") => toml::from_str(data)?,
        Some("json") => serde_json::from_str(data)?,
        Some("ts") => {
            let Some(obj) = extract_ts_object(data) else {
                bail!("no object literal found in {}", path.display());
            };
            serde_json::from_str(obj)?
        }
        _ => serde_json::from_str(data).or_else(|_| serde_yaml::from_str(data))?,
    };
    Ok(parsed)
}
